use enum_dispatch::enum_dispatch;
use log::{debug, log_enabled, Level};

use crate::{
    chip::{ByteOrder, Mmio},
    err::*,
    regs::*,
    types::*,
    Controller,
};

/// Register offsets of one window in a bank.
#[enum_dispatch]
pub(crate) trait WindowRegs {
    fn ctrl(&self, idx: usize) -> usize;
    fn ext_size(&self, idx: usize) -> usize;
    fn local_lo(&self, idx: usize) -> usize;
    fn local_hi(&self, idx: usize) -> usize;
    fn remote_lo(&self, idx: usize) -> usize;
    fn remote_hi(&self, idx: usize) -> usize;
}

pub(crate) struct OutboundRegs;

pub(crate) struct InboundRegs;

impl WindowRegs for OutboundRegs {
    fn ctrl(&self, idx: usize) -> usize {
        pab_axi_amap_ctrl(idx)
    }

    fn ext_size(&self, idx: usize) -> usize {
        pab_ext_axi_amap_size(idx)
    }

    fn local_lo(&self, idx: usize) -> usize {
        pab_axi_amap_axi_win(idx)
    }

    fn local_hi(&self, idx: usize) -> usize {
        pab_ext_axi_amap_axi_win(idx)
    }

    fn remote_lo(&self, idx: usize) -> usize {
        pab_axi_amap_pex_win_l(idx)
    }

    fn remote_hi(&self, idx: usize) -> usize {
        pab_axi_amap_pex_win_h(idx)
    }
}

impl WindowRegs for InboundRegs {
    fn ctrl(&self, idx: usize) -> usize {
        pab_pex_amap_ctrl(idx)
    }

    fn ext_size(&self, idx: usize) -> usize {
        pab_ext_pex_amap_size(idx)
    }

    fn local_lo(&self, idx: usize) -> usize {
        pab_pex_amap_axi_win(idx)
    }

    fn local_hi(&self, idx: usize) -> usize {
        pab_ext_pex_amap_axi_win(idx)
    }

    fn remote_lo(&self, idx: usize) -> usize {
        pab_pex_amap_pex_win_l(idx)
    }

    fn remote_hi(&self, idx: usize) -> usize {
        pab_pex_amap_pex_win_h(idx)
    }
}

#[enum_dispatch(WindowRegs)]
pub(crate) enum BankRegs {
    OutboundRegs,
    InboundRegs,
}

impl From<Bank> for BankRegs {
    fn from(bank: Bank) -> Self {
        match bank {
            Bank::Outbound => OutboundRegs.into(),
            Bank::Inbound => InboundRegs.into(),
        }
    }
}

/// A window as currently programmed in hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    pub enabled: bool,
    /// `None` when the type field holds a value the bank does not define.
    pub window_type: Option<WindowType>,
    pub local_base: u64,
    pub remote_base: u64,
    pub size: u64,
}

impl WindowState {
    /// Target of a configuration window.
    pub fn config_target(&self) -> Option<PciAddress> {
        match self.window_type {
            Some(ty) if ty.is_config() => Some(unpack_config_target(0, self.remote_base as u32)),
            _ => None,
        }
    }
}

fn validate(bank: Bank, index: usize, ty: WindowType, local: u64, remote: u64, size: u64) -> Result<WindowSize> {
    check_index(index, PAB_WINS_NUM)?;
    if ty.bank() != bank {
        return Err(Error::InvalidConfiguration("window type does not belong to bank"));
    }
    let encoded = WindowSize::encode(size)?;
    let align = size - 1;
    if local & align != 0 {
        return Err(Error::InvalidConfiguration("local base not aligned to window size"));
    }
    if !ty.is_config() && remote & align != 0 {
        return Err(Error::InvalidConfiguration("remote base not aligned to window size"));
    }
    Ok(encoded)
}

impl<M: Mmio, O: ByteOrder> Controller<M, O> {
    /// Programs and enables window `index` of `bank`.
    ///
    /// `local_base` is the AXI side address, `remote_base` the PCIe side one.
    /// Nothing is written unless every argument is valid. Reprogramming an
    /// enabled window without disabling it first, or overlapping windows, is
    /// left to the caller.
    pub fn configure_window(
        &mut self,
        bank: Bank,
        index: usize,
        ty: WindowType,
        local_base: u64,
        remote_base: u64,
        size: u64,
    ) -> Result {
        let encoded = validate(bank, index, ty, local_base, remote_base, size)?;
        let regs = BankRegs::from(bank);

        self.ccsr.write(regs.ext_size(index), encoded.ext);
        self.ccsr.write(regs.local_lo(index), local_base as u32);
        self.ccsr.write(regs.local_hi(index), (local_base >> 32) as u32);
        self.ccsr.write(regs.remote_lo(index), remote_base as u32);
        self.ccsr.write(regs.remote_hi(index), (remote_base >> 32) as u32);
        // Enable goes last so the window never decodes with stale bases.
        self.ccsr.modify(regs.ctrl(index), |v| {
            let mut ctrl = AmapCtrl::new(v);
            ctrl.set_window_type(ty.raw())
                .set_size_field(encoded.field)
                .set_enabled(true);
            ctrl.bits()
        });

        debug!(
            "pcie{}: {bank} win{index} {ty:?} {local_base:#x} -> {remote_base:#x} size {size:#x}",
            self.idx()
        );
        Ok(())
    }

    /// Outbound configuration window forwarding accesses to `target`.
    pub fn configure_config_window(
        &mut self,
        index: usize,
        local_base: u64,
        size: u64,
        target: PciAddress,
    ) -> Result {
        self.configure_window(
            Bank::Outbound,
            index,
            OutboundType::Config.into(),
            local_base,
            pack_config_target(target) as u64,
            size,
        )
    }

    /// Points an enabled configuration window at another function.
    pub fn retarget_config_window(&mut self, index: usize, target: PciAddress) -> Result {
        check_index(index, PAB_WINS_NUM)?;
        let ctrl = AmapCtrl::new(self.ccsr.read(pab_axi_amap_ctrl(index)));
        if !ctrl.enabled() || ctrl.window_type() != OutboundType::Config as u8 {
            return Err(Error::InvalidConfiguration("not an enabled configuration window"));
        }
        self.ccsr
            .write(pab_axi_amap_pex_win_l(index), pack_config_target(target));
        self.ccsr.write(pab_axi_amap_pex_win_h(index), 0);
        Ok(())
    }

    /// Clears the enable bit, leaving base and size in place.
    pub fn disable_window(&mut self, bank: Bank, index: usize) -> Result {
        check_index(index, PAB_WINS_NUM)?;
        let regs = BankRegs::from(bank);
        self.ccsr.modify(regs.ctrl(index), |v| {
            let mut ctrl = AmapCtrl::new(v);
            ctrl.set_enabled(false);
            ctrl.bits()
        });
        debug!("pcie{}: {bank} win{index} disabled", self.idx());
        Ok(())
    }

    pub fn window(&mut self, bank: Bank, index: usize) -> Result<WindowState> {
        check_index(index, PAB_WINS_NUM)?;
        let regs = BankRegs::from(bank);
        let ctrl = AmapCtrl::new(self.ccsr.read(regs.ctrl(index)));
        let size = WindowSize {
            field: ctrl.size_field(),
            ext: self.ccsr.read(regs.ext_size(index)),
        };
        let local_lo = self.ccsr.read(regs.local_lo(index)) as u64;
        let local_hi = self.ccsr.read(regs.local_hi(index)) as u64;
        let remote_lo = self.ccsr.read(regs.remote_lo(index)) as u64;
        let remote_hi = self.ccsr.read(regs.remote_hi(index)) as u64;

        Ok(WindowState {
            enabled: ctrl.enabled(),
            window_type: WindowType::from_raw(bank, ctrl.window_type()),
            local_base: local_hi << 32 | local_lo,
            remote_base: remote_hi << 32 | remote_lo,
            size: size.decode(),
        })
    }

    /// Logs every enabled window of both banks.
    pub fn dump_windows(&mut self) {
        if !log_enabled!(Level::Debug) {
            return;
        }
        for bank in [Bank::Outbound, Bank::Inbound] {
            for index in 0..PAB_WINS_NUM {
                let Ok(win) = self.window(bank, index) else {
                    continue;
                };
                if win.enabled {
                    debug!(
                        "pcie{}: {bank} win{index}: {:?} {:#x} -> {:#x} size {:#x}",
                        self.idx(),
                        win.window_type,
                        win.local_base,
                        win.remote_base,
                        win.size
                    );
                }
            }
        }
    }
}
