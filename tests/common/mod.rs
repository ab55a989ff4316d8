#![allow(dead_code)]

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use pcie_lx::{
    err::Result,
    regs::{INDIRECT_ADDR_BNDRY, PAB_CTRL, PAGE_ADDR_MASK, PAGE_IDX_SHIFT},
    Apertures, ByteOrder, Controller, ControllerResources, Mmio, Resource,
};

/// Header dword with header type 1 (PCI-to-PCI bridge).
pub const RC_HEADER: u32 = 0x0001_0000;
pub const EP_HEADER: u32 = 0x0000_0000;

pub const CFG_BASE: u64 = 0x80_0000_0000;
pub const CFG_SIZE: u64 = 0x1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read(usize),
    Write(usize, u32),
}

#[derive(Default)]
struct State {
    regs: HashMap<usize, u32>,
    log: Vec<Access>,
    paged: bool,
}

impl State {
    /// Maps an aperture offset to the register it reaches.
    fn key(&self, offset: usize) -> usize {
        if !self.paged || offset < INDIRECT_ADDR_BNDRY {
            return offset;
        }
        let ctrl = u32::from_le(self.regs.get(&PAB_CTRL).copied().unwrap_or(0));
        let page = ((ctrl >> 13) & 0x3f) as usize;
        page << PAGE_IDX_SHIFT | (offset & PAGE_ADDR_MASK)
    }
}

/// Register file that records every access. Clones share state, so a test can
/// keep one handle while the controller owns another.
#[derive(Clone, Default)]
pub struct FakeMmio(Rc<RefCell<State>>);

impl FakeMmio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Behaves like the CCSR block: accesses past the boundary land on the
    /// page selected in `PAB_CTRL`.
    pub fn paged() -> Self {
        let fake = Self::default();
        fake.0.borrow_mut().paged = true;
        fake
    }

    /// Raw bus value of the register at logical `offset`.
    pub fn reg(&self, offset: usize) -> u32 {
        self.0.borrow().regs.get(&offset).copied().unwrap_or(0)
    }

    pub fn set(&self, offset: usize, raw: u32) {
        self.0.borrow_mut().regs.insert(offset, raw);
    }

    pub fn log(&self) -> Vec<Access> {
        self.0.borrow().log.clone()
    }

    pub fn writes(&self) -> usize {
        self.0
            .borrow()
            .log
            .iter()
            .filter(|a| matches!(a, Access::Write(..)))
            .count()
    }

    pub fn clear_log(&self) {
        self.0.borrow_mut().log.clear();
    }
}

impl Mmio for FakeMmio {
    fn read(&self, offset: usize) -> u32 {
        let mut state = self.0.borrow_mut();
        state.log.push(Access::Read(offset));
        let key = state.key(offset);
        state.regs.get(&key).copied().unwrap_or(0)
    }

    fn write(&mut self, offset: usize, value: u32) {
        let mut state = self.0.borrow_mut();
        state.log.push(Access::Write(offset, value));
        let key = state.key(offset);
        state.regs.insert(key, value);
    }
}

pub struct Rig<O: ByteOrder> {
    pub ctrl: Controller<FakeMmio, O>,
    pub ccsr: FakeMmio,
    pub lut: FakeMmio,
    pub pf_ctrl: FakeMmio,
}

impl<O: ByteOrder> Rig<O> {
    /// Forgets everything logged so far, bring-up reads included.
    pub fn quiet(self) -> Self {
        self.ccsr.clear_log();
        self.lut.clear_log();
        self.pf_ctrl.clear_log();
        self
    }
}

pub fn resources(with_pf_ctrl: bool) -> ControllerResources {
    ControllerResources {
        ccsr: Resource::new(0x340_0000, 0x10_0000),
        cfg: Resource::new(CFG_BASE, CFG_SIZE),
        lut: Resource::new(0x348_0000, 0x1_0000),
        pf_ctrl: with_pf_ctrl.then(|| Resource::new(0x34c_0000, 0x1_0000)),
    }
}

pub fn try_build<O: ByteOrder>(header: u32, with_pf_ctrl: bool) -> Result<Rig<O>> {
    let ccsr = FakeMmio::paged();
    ccsr.set(0x0c, header);
    let lut = FakeMmio::new();
    let pf_ctrl = FakeMmio::new();

    let ctrl = Controller::new(
        1,
        resources(with_pf_ctrl),
        Apertures {
            ccsr: ccsr.clone(),
            lut: lut.clone(),
            pf_ctrl: with_pf_ctrl.then(|| pf_ctrl.clone()),
        },
    )?;

    Ok(Rig {
        ctrl,
        ccsr,
        lut,
        pf_ctrl,
    })
}

pub fn rc<O: ByteOrder>() -> Rig<O> {
    try_build(RC_HEADER, true).unwrap().quiet()
}

pub fn ep<O: ByteOrder>() -> Rig<O> {
    try_build(EP_HEADER, true).unwrap().quiet()
}
