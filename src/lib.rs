#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod ccsr;
mod chip;
mod controller;
mod lut;
mod registry;
mod setup;
mod types;
mod window;
pub mod err;
pub mod regs;
pub mod sriov;

pub use ccsr::Ccsr;
pub use chip::{
    generic::{MappedBases, MmioController},
    Aperture, BigEndian, ByteOrder, LittleEndian, Mmio, MmioRegion,
};
pub use controller::{Apertures, Controller, ControllerResources};
pub use lut::LutEntry;
pub use registry::ControllerRegistry;
pub use setup::{EpLayout, InboundRegion, OutboundRegion, RcLayout};
pub use types::*;
pub use window::WindowState;
