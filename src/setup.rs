use bit_field::BitField;
use log::{info, warn};

use crate::{
    chip::{ByteOrder, Mmio},
    err::*,
    regs::*,
    sriov::{FunctionBars, FunctionLayout},
    types::*,
    Controller,
};

/// One outbound memory or I/O aperture of a root complex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutboundRegion {
    pub ty: OutboundType,
    pub cpu_addr: u64,
    pub bus_addr: u64,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboundRegion {
    pub ty: InboundType,
    pub bus_addr: u64,
    pub cpu_addr: u64,
    pub size: u64,
}

impl Default for InboundRegion {
    /// Identity map of the low 4 GiB of system memory.
    fn default() -> Self {
        Self {
            ty: InboundType::MemoryFetchable,
            bus_addr: 0,
            cpu_addr: 0,
            size: SYS_PCI_MEMORY_SIZE,
        }
    }
}

/// Root complex window plan.
///
/// Outbound window 0 always covers the configuration aperture; `outbound`
/// regions take windows 1 and up, `inbound` takes inbound window 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct RcLayout<'a> {
    pub outbound: &'a [OutboundRegion],
    pub inbound: InboundRegion,
}

/// Endpoint BAR plan for both physical functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpLayout {
    pub functions: [FunctionBars; PCIE_PF_NUM],
    /// Local memory backing the BARs, laid out PF0 first.
    pub inbound_base: u64,
}

impl EpLayout {
    /// Four 8 KiB BARs per PF and per VF, 32 VFs per PF.
    pub fn new(inbound_base: u64) -> Self {
        Self {
            functions: [FunctionBars::uniform(PCIE_BAR_SIZE, PCIE_VF_NUM); PCIE_PF_NUM],
            inbound_base,
        }
    }
}

impl<M: Mmio, O: ByteOrder> Controller<M, O> {
    /// Turns on the AXI and PEX PIO engines and the window types they serve.
    pub fn enable_pio_engines(&mut self) {
        self.ccsr.update_pab_ctrl(|ctrl| {
            ctrl.set_apio_enabled(true)
                .set_ppio_enabled(true)
                .set_max_burst_len(0x3);
        });
        self.ccsr.modify(pab_axi_pio_ctrl(0), |v| {
            (AxiPioCtrl::from_bits_retain(v)
                | AxiPioCtrl::APIO_EN
                | AxiPioCtrl::MEM_WIN_EN
                | AxiPioCtrl::IO_WIN_EN
                | AxiPioCtrl::CFG_WIN_EN)
                .bits()
        });
        self.ccsr.modify(pab_pex_pio_ctrl(0), |v| {
            (PexPioCtrl::from_bits_retain(v) | PexPioCtrl::PPIO_EN).bits()
        });
    }

    /// A root port must report itself as a PCI-to-PCI bridge.
    pub fn fix_class_code(&mut self) -> Result {
        self.require_mode(Mode::RootComplex)?;
        self.ccsr.modify(GPEX_CLASSCODE, |mut v| {
            v.set_bits(16..32, PCI_CLASS_BRIDGE_PCI);
            v
        });
        Ok(())
    }

    /// Lets the host start configuration accesses to the endpoint.
    pub fn set_config_ready(&mut self) {
        self.ccsr.write(GPEX_CFG_READY, PCIE_CONFIG_READY);
    }

    /// Programs a root complex and reports the link state it finds.
    ///
    /// A link that is not up is logged, not treated as an error: the windows
    /// are usable as soon as training completes.
    pub fn setup_root_complex(&mut self, layout: &RcLayout<'_>) -> Result<LinkStatus> {
        self.require_mode(Mode::RootComplex)?;
        let cfg = self.resources().cfg;

        self.fix_class_code()?;
        self.enable_pio_engines();

        self.configure_config_window(0, cfg.start, cfg.size, PciAddress::new(0, 0, 0, 0))?;
        for (i, region) in layout.outbound.iter().enumerate() {
            self.configure_window(
                Bank::Outbound,
                i + 1,
                region.ty.into(),
                region.cpu_addr,
                region.bus_addr,
                region.size,
            )?;
        }
        let inbound = layout.inbound;
        self.configure_window(
            Bank::Inbound,
            0,
            inbound.ty.into(),
            inbound.cpu_addr,
            inbound.bus_addr,
            inbound.size,
        )?;
        self.dump_windows();

        let link = self.read_link_status();
        if link.is_up() {
            info!("pcie{}: link up, {link}", self.idx());
        } else {
            warn!("pcie{}: no link, {link}", self.idx());
        }
        Ok(link)
    }

    /// Programs BARs, inbound BAR maps and SR-IOV for both physical functions,
    /// then marks the endpoint ready for configuration.
    pub fn setup_endpoint(&mut self, layout: &EpLayout) -> Result<[FunctionLayout; PCIE_PF_NUM]> {
        self.require_mode(Mode::Endpoint)?;

        let pf0 = FunctionLayout::compute(0, &layout.functions[0], layout.inbound_base)?;
        let pf1 = FunctionLayout::compute(1, &layout.functions[1], pf0.end)?;
        let layouts = [pf0, pf1];

        for (function, fl) in layouts.iter().enumerate() {
            self.ccsr.select_function(function as u16);
            self.program_bar_layout(fl)?;
            let num_vfs = layout.functions[function].num_vfs;
            if num_vfs > 0 {
                self.configure_sriov(function, num_vfs)?;
            }
        }
        self.ccsr.select_function(0);
        self.set_config_ready();

        info!(
            "pcie{}: endpoint ready, {} vfs, bars end at {:#x}",
            self.idx(),
            self.enabled_vfs(),
            pf1.end
        );
        Ok(layouts)
    }
}
