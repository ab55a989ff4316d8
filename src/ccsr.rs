use log::trace;

use crate::{
    chip::Mmio,
    regs::*,
    types::PabCtrl,
};

/// Paged view of the controller's CCSR space.
///
/// Only the first [`INDIRECT_ADDR_BNDRY`] bytes are directly mapped. The rest of
/// the space is reached through a 1 KiB window at the boundary, whose page is
/// chosen by `PAB_CTRL.PAGE_SEL`. The page select and the access that follows
/// are not atomic, which is why every access needs `&mut self`.
///
/// The CCSR block is always little-endian.
pub struct Ccsr<M> {
    mmio: M,
}

impl<M: Mmio> Ccsr<M> {
    pub fn new(mmio: M) -> Self {
        Self { mmio }
    }

    pub fn read(&mut self, offset: usize) -> u32 {
        let addr = self.select(offset);
        u32::from_le(self.mmio.read(addr))
    }

    pub fn write(&mut self, offset: usize, value: u32) {
        let addr = self.select(offset);
        self.mmio.write(addr, value.to_le())
    }

    pub fn modify<F>(&mut self, offset: usize, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let value = f(self.read(offset));
        self.write(offset, value);
    }

    pub fn pab_ctrl(&self) -> PabCtrl {
        PabCtrl::new(u32::from_le(self.mmio.read(PAB_CTRL)))
    }

    /// Read-modify-write of `PAB_CTRL`, which is below the paging boundary.
    pub fn update_pab_ctrl<F>(&mut self, f: F)
    where
        F: FnOnce(&mut PabCtrl),
    {
        let mut ctrl = self.pab_ctrl();
        f(&mut ctrl);
        self.mmio.write(PAB_CTRL, ctrl.bits().to_le());
    }

    /// Routes GPEX accesses to physical function `func`.
    pub fn select_function(&mut self, func: u16) {
        self.update_pab_ctrl(|ctrl| {
            ctrl.set_function_select(func);
        });
    }

    fn set_page(&mut self, page: u8) {
        trace!("ccsr page {page:#x}");
        self.update_pab_ctrl(|ctrl| {
            ctrl.set_page_select(page);
        });
    }

    /// Returns the aperture offset to use for `offset`, switching page first
    /// when it is past the directly mapped region.
    fn select(&mut self, offset: usize) -> usize {
        debug_assert!(offset < CCSR_SPACE_LEN, "ccsr offset {offset:#x}");
        if offset < INDIRECT_ADDR_BNDRY {
            return offset;
        }
        self.set_page(page_index(offset));
        page_addr(offset)
    }
}

pub(crate) fn page_index(offset: usize) -> u8 {
    ((offset >> PAGE_IDX_SHIFT) & PAGE_SEL_MASK) as u8
}

pub(crate) fn page_addr(offset: usize) -> usize {
    (offset & PAGE_ADDR_MASK) | INDIRECT_ADDR_BNDRY
}
