use thiserror::Error;

pub type Result<T = ()> = core::result::Result<T, Error>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("index {index} out of range, capacity is {capacity}")]
    IndexOutOfRange { index: usize, capacity: usize },
    #[error("table full, capacity is {capacity}")]
    CapacityExceeded { capacity: usize },
    #[error("size {0:#x} can not be encoded")]
    InvalidSize(u64),
    #[error("value out of range")]
    OutOfRange,
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("link is not up")]
    LinkDown,
    #[error("operation not available in the current controller mode")]
    UnexpectedMode,
}

pub(crate) fn check_index(index: usize, capacity: usize) -> Result {
    if index < capacity {
        Ok(())
    } else {
        Err(Error::IndexOutOfRange { index, capacity })
    }
}
