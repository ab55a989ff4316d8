use core::fmt::Display;

use bit_field::BitField;

use crate::regs::LTSSM_PCIE_L0;

/// `PCIE_LINK_CTRL_STA`: the Link Control/Status dword of the controller's
/// PCIe capability.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkCtrlStatus(u32);

impl LinkCtrlStatus {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Current link speed, `1` for 2.5 GT/s, `2` for 5 GT/s and so on.
    pub fn speed(&self) -> u8 {
        self.0.get_bits(16..20) as u8
    }

    /// Negotiated lane count.
    pub fn width(&self) -> u8 {
        self.0.get_bits(20..26) as u8
    }
}

/// LTSSM state as reported by the PF control block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrainingState {
    L0,
    Training(u8),
    /// The controller has no PF control aperture to read the state from.
    Unavailable,
}

impl TrainingState {
    pub fn from_ltssm(raw: u32) -> Self {
        match raw.get_bits(0..7) as u8 {
            LTSSM_PCIE_L0 => TrainingState::L0,
            s => TrainingState::Training(s),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkStatus {
    pub speed: u8,
    pub width: u8,
    pub training_state: TrainingState,
}

impl LinkStatus {
    pub fn decode(link_ctrl_sta: u32, ltssm: Option<u32>) -> Self {
        let reg = LinkCtrlStatus::new(link_ctrl_sta);
        Self {
            speed: reg.speed(),
            width: reg.width(),
            training_state: ltssm.map_or(TrainingState::Unavailable, TrainingState::from_ltssm),
        }
    }

    pub fn is_up(&self) -> bool {
        self.training_state == TrainingState::L0
    }
}

impl Display for LinkStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.training_state {
            TrainingState::L0 => write!(f, "Gen{} x{}", self.speed, self.width),
            TrainingState::Training(s) => write!(f, "down (ltssm {s:#x})"),
            TrainingState::Unavailable => write!(f, "unknown"),
        }
    }
}
