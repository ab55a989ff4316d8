//! Register map of the LX controller.
//!
//! Offsets are in bytes from the start of the aperture named in each section.
//! CCSR offsets at or above [`INDIRECT_ADDR_BNDRY`] are only reachable through
//! the paged accessor in [`crate::Ccsr`].

// ---- CCSR: controller configuration header ----

/// Header type byte lives in bits 16..23 of this dword.
pub const CFG_HEADER_DWORD: usize = 0x0c;
pub const PCIE_LINK_CTRL_STA: usize = 0x5c;
pub const PCIE_SRIOV_CAPABILITY: usize = 0x2a0;
pub const PCIE_SRIOV_VF_OFFSET_STRIDE: usize = PCIE_SRIOV_CAPABILITY + 0x14;

// ---- CCSR: GPEX ----

pub const GPEX_ACK_REPLAY_TO: usize = 0x438;
pub const GPEX_CLASSCODE: usize = 0x474;
pub const GPEX_CFG_READY: usize = 0x4b0;
pub const PCIE_CONFIG_READY: u32 = 1 << 0;
pub const GPEX_BAR_ENABLE: usize = 0x4d4;
pub const GPEX_BAR_SIZE_LDW: usize = 0x4d8;
pub const GPEX_BAR_SIZE_UDW: usize = 0x4dc;
pub const GPEX_BAR_SELECT: usize = 0x4e0;

pub const fn gpex_sriov_init_vfs_total_vf(func: usize) -> usize {
    0x644 + func * 4
}

pub const fn gpex_sriov_vf_offset_stride(func: usize) -> usize {
    0x704 + func * 4
}

// ---- CCSR: PAB ----

pub const PAB_CTRL: usize = 0x808;
pub const PAB_BR_STAT: usize = 0x80c;
pub const PAB_RST_CTRL: usize = 0x820;

pub const fn pab_axi_pio_ctrl(idx: usize) -> usize {
    0x840 + 0x10 * idx
}

pub const fn pab_pex_pio_ctrl(idx: usize) -> usize {
    0x8c0 + 0x10 * idx
}

// ---- CCSR: paging ----

pub const INDIRECT_ADDR_BNDRY: usize = 0xc00;
pub const PAGE_IDX_SHIFT: usize = 10;
pub const PAGE_ADDR_MASK: usize = 0x3ff;
pub const PAGE_SEL_MASK: usize = 0x3f;
/// Whole indirectly addressable CCSR space.
pub const CCSR_SPACE_LEN: usize = (PAGE_SEL_MASK + 1) << PAGE_IDX_SHIFT;

// ---- CCSR: outbound (AXI -> PEX) address map ----

pub const PAB_WINS_NUM: usize = 256;

pub const fn pab_axi_amap_ctrl(idx: usize) -> usize {
    0xba0 + 0x10 * idx
}

pub const fn pab_ext_axi_amap_size(idx: usize) -> usize {
    0xbaf0 + 0x4 * idx
}

pub const fn pab_axi_amap_axi_win(idx: usize) -> usize {
    0xba4 + 0x10 * idx
}

pub const fn pab_ext_axi_amap_axi_win(idx: usize) -> usize {
    0x80a0 + 0x4 * idx
}

pub const fn pab_axi_amap_pex_win_l(idx: usize) -> usize {
    0xba8 + 0x10 * idx
}

pub const fn pab_axi_amap_pex_win_h(idx: usize) -> usize {
    0xbac + 0x10 * idx
}

// ---- CCSR: inbound (PEX -> AXI) address map, root complex mode ----

pub const fn pab_pex_amap_ctrl(idx: usize) -> usize {
    0x4ba0 + 0x10 * idx
}

pub const fn pab_ext_pex_amap_size(idx: usize) -> usize {
    0xbef0 + 0x4 * idx
}

pub const fn pab_pex_amap_axi_win(idx: usize) -> usize {
    0x4ba4 + 0x10 * idx
}

pub const fn pab_ext_pex_amap_axi_win(idx: usize) -> usize {
    0xb4a0 + 0x4 * idx
}

pub const fn pab_pex_amap_pex_win_l(idx: usize) -> usize {
    0x4ba8 + 0x10 * idx
}

pub const fn pab_pex_amap_pex_win_h(idx: usize) -> usize {
    0x4bac + 0x10 * idx
}

// ---- CCSR: inbound BAR map, endpoint mode ----

pub const fn pab_pex_bar_amap(func: usize, bar: usize) -> usize {
    0x1ba0 + 0x20 * func + 4 * bar
}

pub const fn pab_ext_pex_bar_amap(func: usize, bar: usize) -> usize {
    0x84a0 + 0x20 * func + 4 * bar
}

pub const PEX_BAR_AMAP_EN: u32 = 1 << 0;

// ---- SR-IOV ----

pub const PCIE_PF_NUM: usize = 2;
pub const BAR_NUM: usize = 4;
pub const PF1_BAR_OFFSET: u32 = 4;
pub const PF0_VF_BAR_OFFSET: u32 = 8;
pub const PF1_VF_BAR_OFFSET: u32 = 12;
/// Slots per function in the endpoint inbound BAR map: PF BARs then VF BARs.
pub const BAR_AMAP_SLOTS: usize = 2 * BAR_NUM;

// ---- LUT aperture ----

pub const PCIE_LUT_BASE: usize = 0x800;
pub const PCIE_LUT_ENTRY_STRIDE: usize = 8;
pub const PCIE_LUT_ENTRY_COUNT: usize = 32;
pub const PCIE_LUT_ENABLE: u32 = 1 << 31;

pub const fn pcie_lut_udr(n: usize) -> usize {
    PCIE_LUT_BASE + n * PCIE_LUT_ENTRY_STRIDE
}

pub const fn pcie_lut_ldr(n: usize) -> usize {
    PCIE_LUT_BASE + n * PCIE_LUT_ENTRY_STRIDE + 4
}

// ---- PF control aperture ----

pub const PCIE_LTSSM_STA: usize = 0x7fc;
pub const LTSSM_PCIE_L0: u8 = 0x2d;

// ---- Defaults ----

pub const PCI_CLASS_BRIDGE_PCI: u32 = 0x0604;
pub const SYS_PCI_MEMORY_SIZE: u64 = 4 * 1024 * 1024 * 1024;
pub const PCIE_BAR_SIZE: u64 = 8 * 1024;
pub const PCIE_VF_NUM: u16 = 32;
