use log::debug;

use crate::{
    chip::{ByteOrder, Mmio},
    err::*,
    regs::*,
    Controller,
};

/// One decoded slot of the requester ID lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LutEntry {
    pub upper: u32,
    pub lower: u32,
    pub enabled: bool,
}

impl LutEntry {
    pub fn contains(&self, id: u32) -> bool {
        self.enabled && self.lower <= id && id <= self.upper
    }
}

impl<M: Mmio, O: ByteOrder> Controller<M, O> {
    /// Appends a `lower..=upper` route to the lookup table and returns its slot.
    ///
    /// Slots are handed out in order and never reused.
    pub fn add_entry(&mut self, lower: u32, upper: u32) -> Result<usize> {
        let index = self.next_lut_index;
        if index >= PCIE_LUT_ENTRY_COUNT {
            return Err(Error::CapacityExceeded {
                capacity: PCIE_LUT_ENTRY_COUNT,
            });
        }
        if upper & PCIE_LUT_ENABLE != 0 {
            return Err(Error::InvalidConfiguration("lut bound overlaps enable bit"));
        }
        if lower > upper {
            return Err(Error::InvalidConfiguration("lut lower bound above upper"));
        }

        self.lut.write(pcie_lut_ldr(index), lower);
        self.lut.write(pcie_lut_udr(index), upper | PCIE_LUT_ENABLE);
        self.next_lut_index += 1;

        debug!(
            "pcie{}: lut[{index}] {lower:#x}..={upper:#x}",
            self.idx()
        );
        Ok(index)
    }

    pub fn lut_entry(&self, index: usize) -> Result<LutEntry> {
        check_index(index, PCIE_LUT_ENTRY_COUNT)?;
        let udr = self.lut.read(pcie_lut_udr(index));
        let ldr = self.lut.read(pcie_lut_ldr(index));
        Ok(LutEntry {
            upper: udr & !PCIE_LUT_ENABLE,
            lower: ldr,
            enabled: udr & PCIE_LUT_ENABLE != 0,
        })
    }

    /// Slots handed out so far.
    pub fn lut_len(&self) -> usize {
        self.next_lut_index
    }
}
