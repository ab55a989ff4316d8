use core::{marker::PhantomData, ptr::NonNull};

pub mod generic;

/// Raw 32-bit access to one register aperture.
///
/// Values are passed exactly as they appear on the bus; byte order is applied
/// on top of this by [`Aperture`].
pub trait Mmio {
    /// Reads the dword at byte `offset`.
    fn read(&self, offset: usize) -> u32;

    /// Writes the dword at byte `offset`.
    fn write(&mut self, offset: usize, value: u32);
}

/// Volatile access to a memory-mapped aperture.
pub struct MmioRegion {
    base: NonNull<u8>,
    len: usize,
}

unsafe impl Send for MmioRegion {}

impl MmioRegion {
    /// # Safety
    ///
    /// `base` must point to a mapped device region of at least `len` bytes that
    /// stays mapped for the lifetime of the returned value.
    pub unsafe fn new(base: NonNull<u8>, len: usize) -> Self {
        Self { base, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn reg(&self, offset: usize) -> NonNull<u32> {
        debug_assert!(offset % 4 == 0 && offset + 4 <= self.len);
        unsafe { self.base.add(offset).cast() }
    }
}

impl Mmio for MmioRegion {
    fn read(&self, offset: usize) -> u32 {
        let ptr = self.reg(offset);
        unsafe { ptr.as_ptr().read_volatile() }
    }

    fn write(&mut self, offset: usize, value: u32) {
        let ptr = self.reg(offset);
        unsafe { ptr.as_ptr().write_volatile(value) }
    }
}

/// Byte order of an aperture, fixed for the lifetime of a controller.
pub trait ByteOrder: 'static {
    fn to_cpu(raw: u32) -> u32;

    fn from_cpu(value: u32) -> u32;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LittleEndian;

#[derive(Debug, Clone, Copy, Default)]
pub struct BigEndian;

impl ByteOrder for LittleEndian {
    fn to_cpu(raw: u32) -> u32 {
        u32::from_le(raw)
    }

    fn from_cpu(value: u32) -> u32 {
        value.to_le()
    }
}

impl ByteOrder for BigEndian {
    fn to_cpu(raw: u32) -> u32 {
        u32::from_be(raw)
    }

    fn from_cpu(value: u32) -> u32 {
        value.to_be()
    }
}

/// An [`Mmio`] bound to a byte order.
pub struct Aperture<M, O> {
    mmio: M,
    _order: PhantomData<O>,
}

impl<M: Mmio, O: ByteOrder> Aperture<M, O> {
    pub fn new(mmio: M) -> Self {
        Self {
            mmio,
            _order: PhantomData,
        }
    }

    pub fn read(&self, offset: usize) -> u32 {
        O::to_cpu(self.mmio.read(offset))
    }

    pub fn write(&mut self, offset: usize, value: u32) {
        self.mmio.write(offset, O::from_cpu(value))
    }

    pub fn modify<F>(&mut self, offset: usize, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let value = f(self.read(offset));
        self.write(offset, value);
    }
}
