use core::fmt::Display;

use bit_field::BitField;
use pci_types::PciAddress;

use crate::err::*;

/// Smallest window the address decoders resolve.
pub const WINDOW_GRANULE: u64 = 1 << AmapCtrl::SIZE_SHIFT;

/// Which address decoder a window belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bank {
    /// AXI (local) to PCIe.
    Outbound,
    /// PCIe to AXI (local).
    Inbound,
}

impl Display for Bank {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Bank::Outbound => write!(f, "outbound"),
            Bank::Inbound => write!(f, "inbound"),
        }
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutboundType {
    Config = 0x0,
    Io = 0x1,
    Memory = 0x2,
    Atomic = 0x3,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InboundType {
    MemoryFetchable = 0x2,
    MemoryNonFetchable = 0x3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowType {
    Outbound(OutboundType),
    Inbound(InboundType),
}

impl WindowType {
    pub fn bank(&self) -> Bank {
        match self {
            WindowType::Outbound(_) => Bank::Outbound,
            WindowType::Inbound(_) => Bank::Inbound,
        }
    }

    pub fn raw(&self) -> u8 {
        match self {
            WindowType::Outbound(t) => *t as u8,
            WindowType::Inbound(t) => *t as u8,
        }
    }

    pub fn from_raw(bank: Bank, raw: u8) -> Option<Self> {
        let ty = match (bank, raw) {
            (Bank::Outbound, 0x0) => WindowType::Outbound(OutboundType::Config),
            (Bank::Outbound, 0x1) => WindowType::Outbound(OutboundType::Io),
            (Bank::Outbound, 0x2) => WindowType::Outbound(OutboundType::Memory),
            (Bank::Outbound, 0x3) => WindowType::Outbound(OutboundType::Atomic),
            (Bank::Inbound, 0x2) => WindowType::Inbound(InboundType::MemoryFetchable),
            (Bank::Inbound, 0x3) => WindowType::Inbound(InboundType::MemoryNonFetchable),
            _ => return None,
        };
        Some(ty)
    }

    pub fn is_config(&self) -> bool {
        matches!(self, WindowType::Outbound(OutboundType::Config))
    }
}

impl From<OutboundType> for WindowType {
    fn from(value: OutboundType) -> Self {
        WindowType::Outbound(value)
    }
}

impl From<InboundType> for WindowType {
    fn from(value: InboundType) -> Self {
        WindowType::Inbound(value)
    }
}

/// Control register of an outbound or inbound window.
///
/// ```ignore
///     31                                        10 9          3   1    0
///      +-------------------------------------------+----------+---+----+
///      |        SIZE (mask bits 31..10)            |   rsvd   |TYP| EN |
///      +-------------------------------------------+----------+---+----+
/// ```
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AmapCtrl(u32);

impl AmapCtrl {
    pub const SIZE_SHIFT: usize = 10;
    pub const SIZE_MASK: u32 = 0x3f_ffff;

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub fn enabled(&self) -> bool {
        self.0.get_bit(0)
    }

    pub fn set_enabled(&mut self, en: bool) -> &mut Self {
        self.0.set_bit(0, en);
        self
    }

    pub fn window_type(&self) -> u8 {
        self.0.get_bits(1..3) as u8
    }

    pub fn set_window_type(&mut self, ty: u8) -> &mut Self {
        self.0.set_bits(1..3, ty as u32 & 0x3);
        self
    }

    pub fn size_field(&self) -> u32 {
        self.0.get_bits(Self::SIZE_SHIFT..32)
    }

    pub fn set_size_field(&mut self, field: u32) -> &mut Self {
        self.0.set_bits(Self::SIZE_SHIFT..32, field & Self::SIZE_MASK);
        self
    }
}

/// Window size split into the control register size field and the extension
/// size register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSize {
    pub field: u32,
    pub ext: u32,
}

impl WindowSize {
    /// Sizes must be powers of two no smaller than [`WINDOW_GRANULE`].
    pub fn encode(size: u64) -> Result<Self> {
        if !size.is_power_of_two() || size < WINDOW_GRANULE {
            return Err(Error::InvalidSize(size));
        }
        let mask = !(size - 1);
        Ok(Self {
            field: (mask as u32) >> AmapCtrl::SIZE_SHIFT,
            ext: (mask >> 32) as u32,
        })
    }

    pub fn decode(&self) -> u64 {
        let mask = (self.ext as u64) << 32 | (self.field as u64) << AmapCtrl::SIZE_SHIFT;
        (!mask).wrapping_add(1)
    }
}

/// Bus/device/function target of a configuration window, as carried in the
/// PCIe-side low base register.
pub fn pack_config_target(target: PciAddress) -> u32 {
    let mut v = 0u32;
    v.set_bits(24..32, target.bus() as u32);
    v.set_bits(19..24, target.device() as u32 & 0x1f);
    v.set_bits(16..19, target.function() as u32 & 0x7);
    v
}

pub fn unpack_config_target(segment: u16, raw: u32) -> PciAddress {
    PciAddress::new(
        segment,
        raw.get_bits(24..32) as u8,
        raw.get_bits(19..24) as u8,
        raw.get_bits(16..19) as u8,
    )
}
