//! Endpoint BAR and SR-IOV programming.
//!
//! The controller exposes 16 BAR slots through `GPEX_BAR_SELECT`:
//!
//! | slots  | owner          |
//! |--------|----------------|
//! | 0..4   | PF0 BAR0..3    |
//! | 4..8   | PF1 BAR0..3    |
//! | 8..12  | VFs of PF0     |
//! | 12..16 | VFs of PF1     |
//!
//! Independently, the inbound BAR map has eight slots per function, PF BARs
//! first and VF BARs after them.

use log::debug;

use crate::{
    chip::{ByteOrder, Mmio},
    err::*,
    regs::*,
    types::{VfCounts, VfOffsetStride},
    Controller,
};

/// Number of slots reachable through `GPEX_BAR_SELECT`.
pub const BAR_SLOTS: u32 = PF1_VF_BAR_OFFSET + BAR_NUM as u32;

/// Smallest memory BAR the endpoint advertises.
pub const BAR_MIN_SIZE: u64 = 128;

fn check_bar(function: usize, bar: usize) -> Result {
    check_index(function, PCIE_PF_NUM)?;
    check_index(bar, BAR_NUM)
}

/// `GPEX_BAR_SELECT` slot of BAR `bar` of physical function `function`.
pub fn pf_bar_offset(function: usize, bar: usize) -> Result<u32> {
    check_bar(function, bar)?;
    Ok(PF1_BAR_OFFSET * function as u32 + bar as u32)
}

/// `GPEX_BAR_SELECT` slot of VF BAR `bar` of physical function `function`.
pub fn vf_bar_offset(function: usize, bar: usize) -> Result<u32> {
    check_bar(function, bar)?;
    let base = match function {
        0 => PF0_VF_BAR_OFFSET,
        _ => PF1_VF_BAR_OFFSET,
    };
    Ok(base + bar as u32)
}

fn check_bar_size(size: u64) -> Result {
    if size.is_power_of_two() && size >= BAR_MIN_SIZE {
        Ok(())
    } else {
        Err(Error::InvalidSize(size))
    }
}

fn align_up(addr: u64, align: u64) -> Result<u64> {
    addr.checked_add(align - 1)
        .map(|a| a & !(align - 1))
        .ok_or(Error::InvalidSize(align))
}

/// BAR sizes requested for one physical function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FunctionBars {
    pub pf: [Option<u64>; BAR_NUM],
    /// Size of each BAR of a single VF.
    pub vf: [Option<u64>; BAR_NUM],
    pub num_vfs: u16,
}

impl FunctionBars {
    /// Every PF and VF BAR set to `size`.
    pub fn uniform(size: u64, num_vfs: u16) -> Self {
        Self {
            pf: [Some(size); BAR_NUM],
            vf: [Some(size); BAR_NUM],
            num_vfs,
        }
    }
}

/// Where one BAR ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarPlacement {
    /// `GPEX_BAR_SELECT` slot.
    pub slot: u32,
    /// Slot in the function's inbound BAR map.
    pub amap_slot: usize,
    /// Size advertised in the BAR.
    pub size: u64,
    /// Local address backing the BAR.
    pub phys: u64,
    /// Local memory consumed, `size` times the VF count for VF BARs.
    pub span: u64,
}

/// BAR layout of one physical function and its VFs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionLayout {
    pub function: usize,
    pub pf: [Option<BarPlacement>; BAR_NUM],
    pub vf: [Option<BarPlacement>; BAR_NUM],
    /// `GPEX_BAR_ENABLE` bits for the slots above.
    pub enable_mask: u32,
    /// First local address after the layout.
    pub end: u64,
}

impl FunctionLayout {
    /// Lays out the BARs of `function` in local memory starting at `base`.
    ///
    /// Every BAR is placed on a boundary of its own size. VF BARs are skipped
    /// when `num_vfs` is zero.
    pub fn compute(function: usize, bars: &FunctionBars, base: u64) -> Result<Self> {
        check_index(function, PCIE_PF_NUM)?;
        let mut layout = Self {
            function,
            pf: [None; BAR_NUM],
            vf: [None; BAR_NUM],
            enable_mask: 0,
            end: base,
        };

        for (bar, size) in bars.pf.iter().enumerate() {
            let Some(size) = *size else { continue };
            let slot = pf_bar_offset(function, bar)?;
            layout.pf[bar] = Some(layout.place(slot, bar, size, 1)?);
        }

        if bars.num_vfs > 0 {
            for (bar, size) in bars.vf.iter().enumerate() {
                let Some(size) = *size else { continue };
                let slot = vf_bar_offset(function, bar)?;
                layout.vf[bar] = Some(layout.place(slot, BAR_NUM + bar, size, bars.num_vfs)?);
            }
        }

        Ok(layout)
    }

    fn place(&mut self, slot: u32, amap_slot: usize, size: u64, count: u16) -> Result<BarPlacement> {
        check_bar_size(size)?;
        let span = size
            .checked_mul(count as u64)
            .ok_or(Error::InvalidSize(size))?;
        let phys = align_up(self.end, size)?;
        self.end = phys.checked_add(span).ok_or(Error::InvalidSize(span))?;
        self.enable_mask |= 1 << slot;
        Ok(BarPlacement {
            slot,
            amap_slot,
            size,
            phys,
            span,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &BarPlacement> {
        self.pf.iter().chain(self.vf.iter()).flatten()
    }
}

impl<M: Mmio, O: ByteOrder> Controller<M, O> {
    /// Packs TotalVFs and InitialVFs for `function`.
    pub fn set_vf_counts(&mut self, function: usize, total: u32, initial: u32) -> Result {
        check_index(function, PCIE_PF_NUM)?;
        let counts = VfCounts::new(total, initial)?;
        self.ccsr
            .write(gpex_sriov_init_vfs_total_vf(function), counts.bits());
        self.vfs_enabled[function] = counts.initial();
        debug!(
            "pcie{}: pf{function} vfs total {total} initial {initial}",
            self.idx()
        );
        Ok(())
    }

    pub fn vf_counts(&mut self, function: usize) -> Result<VfCounts> {
        check_index(function, PCIE_PF_NUM)?;
        Ok(VfCounts::from_bits(
            self.ccsr.read(gpex_sriov_init_vfs_total_vf(function)),
        ))
    }

    /// The stride may only be zero while `function` has no VFs enabled.
    pub fn set_vf_offset_stride(&mut self, function: usize, value: VfOffsetStride) -> Result {
        check_index(function, PCIE_PF_NUM)?;
        if value.stride == 0 && self.vfs_enabled[function] > 0 {
            return Err(Error::InvalidConfiguration("zero vf stride with vfs enabled"));
        }
        self.ccsr
            .write(gpex_sriov_vf_offset_stride(function), value.bits());
        Ok(())
    }

    /// Enables `num_vfs` VFs on `function` and shifts the first VF offset past
    /// the VFs of the functions before it.
    pub fn configure_sriov(&mut self, function: usize, num_vfs: u16) -> Result {
        check_index(function, PCIE_PF_NUM)?;
        let mut os = VfOffsetStride::from_bits(self.ccsr.read(PCIE_SRIOV_VF_OFFSET_STRIDE));
        let shift = (num_vfs as u32 * function as u32).saturating_sub(function as u32);
        os.first_offset = u16::try_from(os.first_offset as u32 + shift)
            .map_err(|_| Error::OutOfRange)?;
        if os.stride == 0 && num_vfs > 0 {
            return Err(Error::InvalidConfiguration("sr-iov capability reports zero vf stride"));
        }

        self.set_vf_counts(function, num_vfs as u32, num_vfs as u32)?;
        self.set_vf_offset_stride(function, os)
    }

    /// Advertised size of BAR slot `slot`.
    pub fn set_bar_size(&mut self, slot: u32, size: u64) -> Result {
        check_index(slot as usize, BAR_SLOTS as usize)?;
        check_bar_size(size)?;
        let mask = !(size - 1);
        self.ccsr.write(GPEX_BAR_SELECT, slot);
        self.ccsr.write(GPEX_BAR_SIZE_LDW, mask as u32);
        self.ccsr.write(GPEX_BAR_SIZE_UDW, (mask >> 32) as u32);
        Ok(())
    }

    pub fn set_bar_enable_mask(&mut self, mask: u32) {
        self.ccsr.write(GPEX_BAR_ENABLE, mask);
    }

    /// Maps inbound BAR slot `amap_slot` of `function` to local address `phys`.
    pub fn set_bar_inbound(&mut self, function: usize, amap_slot: usize, phys: u64) -> Result {
        check_index(function, PCIE_PF_NUM)?;
        check_index(amap_slot, BAR_AMAP_SLOTS)?;
        if phys as u32 & PEX_BAR_AMAP_EN != 0 {
            return Err(Error::InvalidConfiguration("inbound bar address not aligned"));
        }
        self.ccsr
            .write(pab_ext_pex_bar_amap(function, amap_slot), (phys >> 32) as u32);
        self.ccsr.write(
            pab_pex_bar_amap(function, amap_slot),
            phys as u32 | PEX_BAR_AMAP_EN,
        );
        Ok(())
    }

    /// Programs sizes, inbound maps and the enable mask of a computed layout.
    pub fn program_bar_layout(&mut self, layout: &FunctionLayout) -> Result {
        for bar in layout.iter() {
            self.set_bar_size(bar.slot, bar.size)?;
            self.set_bar_inbound(layout.function, bar.amap_slot, bar.phys)?;
            debug!(
                "pcie{}: pf{} bar slot {} size {:#x} @ {:#x}",
                self.idx(),
                layout.function,
                bar.slot,
                bar.size,
                bar.phys
            );
        }
        self.set_bar_enable_mask(layout.enable_mask);
        Ok(())
    }
}
