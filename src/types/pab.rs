use bit_field::BitField;
use bitflags::bitflags;

/// `PAB_CTRL`: bridge enables, burst length, page and function select.
///
/// ```ignore
///     31        28             19            13         6   4      1      0
///      +---------+--------------+-------------+---------+---+------+------+
///      |  rsvd   |   FUNC_SEL   |  PAGE_SEL   |  rsvd   |BRS| PPIO | APIO |
///      +---------+--------------+-------------+---------+---+------+------+
/// ```
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PabCtrl(u32);

impl PabCtrl {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub fn apio_enabled(&self) -> bool {
        self.0.get_bit(0)
    }

    pub fn set_apio_enabled(&mut self, en: bool) -> &mut Self {
        self.0.set_bit(0, en);
        self
    }

    pub fn ppio_enabled(&self) -> bool {
        self.0.get_bit(1)
    }

    pub fn set_ppio_enabled(&mut self, en: bool) -> &mut Self {
        self.0.set_bit(1, en);
        self
    }

    pub fn max_burst_len(&self) -> u8 {
        self.0.get_bits(4..6) as u8
    }

    pub fn set_max_burst_len(&mut self, len: u8) -> &mut Self {
        self.0.set_bits(4..6, len as u32 & 0x3);
        self
    }

    pub fn page_select(&self) -> u8 {
        self.0.get_bits(13..19) as u8
    }

    /// Only the low six bits of `page` are kept.
    pub fn set_page_select(&mut self, page: u8) -> &mut Self {
        self.0.set_bits(13..19, page as u32 & 0x3f);
        self
    }

    pub fn function_select(&self) -> u16 {
        self.0.get_bits(19..28) as u16
    }

    pub fn set_function_select(&mut self, func: u16) -> &mut Self {
        self.0.set_bits(19..28, func as u32 & 0x1ff);
        self
    }
}

bitflags! {
    /// `PAB_AXI_PIO_CTRL(n)`: outbound PIO engine and the window types it serves.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AxiPioCtrl: u32 {
        const APIO_EN = 1 << 0;
        const MEM_WIN_EN = 1 << 1;
        const IO_WIN_EN = 1 << 2;
        const CFG_WIN_EN = 1 << 3;
        const _ = !0;
    }
}

bitflags! {
    /// `PAB_PEX_PIO_CTRL(n)`.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PexPioCtrl: u32 {
        const PPIO_EN = 1 << 0;
        const _ = !0;
    }
}
