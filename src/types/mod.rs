mod amap;
mod link;
mod pab;
mod sriov;

pub use amap::*;
pub use link::*;
pub use pab::*;
pub use pci_types::PciAddress;
pub use sriov::*;

/// Physical address range of one controller aperture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resource {
    pub start: u64,
    pub size: u64,
}

impl Resource {
    pub const fn new(start: u64, size: u64) -> Self {
        Self { start, size }
    }
}

/// Role the controller was strapped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    RootComplex,
    Endpoint,
}

impl Mode {
    /// Decodes bits 0..7 of the header type byte of the controller's own
    /// configuration header.
    pub fn from_header_type(header_type: u8) -> Option<Self> {
        match header_type & 0x7f {
            0x00 => Some(Mode::Endpoint),
            0x01 => Some(Mode::RootComplex),
            _ => None,
        }
    }
}
