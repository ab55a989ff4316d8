use bit_field::BitField;

use crate::err::*;

/// `GPEX_SRIOV_INIT_VFS_TOTAL_VF(func)`: TotalVFs in the upper half,
/// InitialVFs in the lower half.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VfCounts(u32);

impl VfCounts {
    pub fn new(total: u32, initial: u32) -> Result<Self> {
        if total > u16::MAX as u32 || initial > u16::MAX as u32 || initial > total {
            return Err(Error::OutOfRange);
        }
        let mut v = 0u32;
        v.set_bits(16..32, total);
        v.set_bits(0..16, initial);
        Ok(Self(v))
    }

    pub const fn from_bits(value: u32) -> Self {
        Self(value)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub fn total(&self) -> u16 {
        self.0.get_bits(16..32) as u16
    }

    pub fn initial(&self) -> u16 {
        self.0.get_bits(0..16) as u16
    }
}

/// First VF offset and VF stride, in routing ID units, as exposed by the SR-IOV
/// capability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VfOffsetStride {
    pub first_offset: u16,
    pub stride: u16,
}

impl VfOffsetStride {
    pub fn from_bits(value: u32) -> Self {
        Self {
            first_offset: value.get_bits(0..16) as u16,
            stride: value.get_bits(16..32) as u16,
        }
    }

    pub fn bits(&self) -> u32 {
        (self.stride as u32) << 16 | self.first_offset as u32
    }
}
