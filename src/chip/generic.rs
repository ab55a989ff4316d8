use core::ptr::NonNull;

use super::MmioRegion;
use crate::{
    controller::{Apertures, Controller, ControllerResources},
    err::*,
    regs::{
        pcie_lut_ldr, INDIRECT_ADDR_BNDRY, PAGE_ADDR_MASK, PCIE_LTSSM_STA, PCIE_LUT_ENTRY_COUNT,
    },
    Resource,
};

/// A controller driven through mapped MMIO.
pub type MmioController<O> = Controller<MmioRegion, O>;

/// Virtual addresses the platform mapped the controller's apertures at.
#[derive(Debug, Clone, Copy)]
pub struct MappedBases {
    pub ccsr: NonNull<u8>,
    pub lut: NonNull<u8>,
    pub pf_ctrl: Option<NonNull<u8>>,
}

impl<O: super::ByteOrder> Controller<MmioRegion, O> {
    /// # Safety
    ///
    /// Every base in `bases` must map the matching range of `resources` for as
    /// long as the controller lives, and no other code may access it.
    pub unsafe fn from_mapped(
        idx: u32,
        resources: ControllerResources,
        bases: MappedBases,
    ) -> Result<Self> {
        let ccsr = unsafe { region(bases.ccsr, &resources.ccsr)? };
        let lut = unsafe { region(bases.lut, &resources.lut)? };
        let pf_ctrl = match (bases.pf_ctrl, resources.pf_ctrl) {
            (Some(base), Some(res)) => Some(unsafe { region(base, &res)? }),
            (None, None) => None,
            _ => return Err(Error::InvalidConfiguration("pf control base and resource disagree")),
        };
        if ccsr.len() <= INDIRECT_ADDR_BNDRY + PAGE_ADDR_MASK {
            return Err(Error::InvalidConfiguration("ccsr aperture smaller than paging window"));
        }
        if lut.len() < pcie_lut_ldr(PCIE_LUT_ENTRY_COUNT - 1) + 4 {
            return Err(Error::InvalidConfiguration("lut aperture smaller than the table"));
        }
        if pf_ctrl.as_ref().is_some_and(|pf| pf.len() < PCIE_LTSSM_STA + 4) {
            return Err(Error::InvalidConfiguration("pf control aperture misses ltssm status"));
        }
        Controller::new(idx, resources, Apertures { ccsr, lut, pf_ctrl })
    }
}

unsafe fn region(base: NonNull<u8>, res: &Resource) -> Result<MmioRegion> {
    let len = usize::try_from(res.size)
        .map_err(|_| Error::InvalidConfiguration("aperture larger than address space"))?;
    Ok(unsafe { MmioRegion::new(base, len) })
}
