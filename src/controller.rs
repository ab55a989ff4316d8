use bit_field::BitField;
use log::{debug, info};

use crate::{
    ccsr::Ccsr,
    chip::{Aperture, ByteOrder, LittleEndian, Mmio},
    err::*,
    regs::*,
    types::{LinkStatus, Mode, Resource},
};

/// Physical layout of one controller, as described by the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerResources {
    /// Paged control and status registers.
    pub ccsr: Resource,
    /// Outbound configuration space, reached through outbound window 0.
    pub cfg: Resource,
    /// Requester ID to stream ID lookup table.
    pub lut: Resource,
    pub pf_ctrl: Option<Resource>,
}

/// Register apertures handed over by whoever mapped the controller.
pub struct Apertures<M> {
    pub ccsr: M,
    pub lut: M,
    pub pf_ctrl: Option<M>,
}

/// One LX PCIe controller.
///
/// `O` is the byte order of the LUT and PF control blocks. It is part of the
/// type, so it can not change after construction. CCSR is always
/// little-endian.
pub struct Controller<M, O = LittleEndian> {
    idx: u32,
    resources: ControllerResources,
    pub(crate) ccsr: Ccsr<M>,
    pub(crate) lut: Aperture<M, O>,
    pub(crate) pf_ctrl: Option<Aperture<M, O>>,
    mode: Mode,
    pub(crate) next_lut_index: usize,
    pub(crate) vfs_enabled: [u16; PCIE_PF_NUM],
}

impl<M: Mmio, O: ByteOrder> Controller<M, O> {
    /// Takes ownership of the apertures and detects whether the controller was
    /// strapped as root complex or endpoint.
    pub fn new(idx: u32, resources: ControllerResources, apertures: Apertures<M>) -> Result<Self> {
        let mut ccsr = Ccsr::new(apertures.ccsr);
        let header_type = ccsr.read(CFG_HEADER_DWORD).get_bits(16..24) as u8;
        let mode = Mode::from_header_type(header_type).ok_or(Error::UnexpectedMode)?;
        info!("pcie{idx}: {mode:?} mode");

        Ok(Self {
            idx,
            resources,
            ccsr,
            lut: Aperture::new(apertures.lut),
            pf_ctrl: apertures.pf_ctrl.map(Aperture::new),
            mode,
            next_lut_index: 0,
            vfs_enabled: [0; PCIE_PF_NUM],
        })
    }

    pub fn idx(&self) -> u32 {
        self.idx
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn resources(&self) -> &ControllerResources {
        &self.resources
    }

    pub fn ccsr(&mut self) -> &mut Ccsr<M> {
        &mut self.ccsr
    }

    /// Total enabled VFs across both physical functions.
    pub fn enabled_vfs(&self) -> u32 {
        self.vfs_enabled.iter().map(|&n| n as u32).sum()
    }

    pub(crate) fn require_mode(&self, mode: Mode) -> Result {
        if self.mode == mode {
            Ok(())
        } else {
            Err(Error::UnexpectedMode)
        }
    }

    /// Snapshot of link speed, width and LTSSM state. Never cached.
    pub fn read_link_status(&mut self) -> LinkStatus {
        let link = self.ccsr.read(PCIE_LINK_CTRL_STA);
        let ltssm = self.pf_ctrl.as_ref().map(|pf| pf.read(PCIE_LTSSM_STA));
        LinkStatus::decode(link, ltssm)
    }

    pub fn is_link_up(&mut self) -> bool {
        self.read_link_status().is_up()
    }

    pub fn require_link_up(&mut self) -> Result<LinkStatus> {
        let status = self.read_link_status();
        if status.is_up() {
            Ok(status)
        } else {
            debug!("pcie{}: link {status}", self.idx);
            Err(Error::LinkDown)
        }
    }
}
