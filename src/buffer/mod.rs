mod host;
mod native;
pub(crate) mod storage;
mod universal;
mod usm;
mod visitor;

pub use host::HostBuffer;
pub use native::NativeBuffer;
pub use storage::{HostReadView, HostWriteView};
pub use universal::UniversalBuffer;
pub use usm::{UsmBuffer, UsmKind};
pub use visitor::{BufferVisitor, ToNative, ToUsm};

use crate::error::Result;
use crate::types::DataType;

use storage::Region;

/// A typed block of numeric data in one of the supported memory kinds.
///
/// Cloning a buffer or taking a sub-buffer never copies data, the new buffer
/// aliases the same storage.
#[derive(Clone)]
pub enum Buffer<T: DataType> {
    Host(HostBuffer<T>),
    Usm(UsmBuffer<T>),
    Native(NativeBuffer<T>),
}

impl<T: DataType> Buffer<T> {
    pub fn len(&self) -> usize {
        match self {
            Buffer::Host(b) => b.len(),
            Buffer::Usm(b) => b.len(),
            Buffer::Native(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Buffer of the same kind aliasing `[offset, offset + len)`.
    ///
    /// `offset + len` must not exceed `self.len()`.
    pub fn sub_buffer(&self, offset: usize, len: usize) -> Self {
        match self {
            Buffer::Host(b) => Buffer::Host(b.sub_buffer(offset, len)),
            Buffer::Usm(b) => Buffer::Usm(b.sub_buffer(offset, len)),
            Buffer::Native(b) => Buffer::Native(b.sub_buffer(offset, len)),
        }
    }

    pub fn host_read(&self) -> Result<HostReadView<'_, T>> {
        match self {
            Buffer::Host(b) => b.host_read(),
            Buffer::Usm(b) => b.host_read(),
            Buffer::Native(b) => b.host_read(),
        }
    }

    pub fn host_write(&self) -> Result<HostWriteView<'_, T>> {
        match self {
            Buffer::Host(b) => b.host_write(),
            Buffer::Usm(b) => b.host_write(),
            Buffer::Native(b) => b.host_write(),
        }
    }

    pub fn host_read_write(&self) -> Result<HostWriteView<'_, T>> {
        match self {
            Buffer::Host(b) => b.host_read_write(),
            Buffer::Usm(b) => b.host_read_write(),
            Buffer::Native(b) => b.host_read_write(),
        }
    }

    pub fn to_vec(&self) -> Result<Vec<T>> {
        Ok(self.host_read()?.to_vec())
    }

    pub fn apply<V: BufferVisitor<T>>(&self, visitor: &mut V) -> V::Output {
        match self {
            Buffer::Host(b) => visitor.visit_host(b),
            Buffer::Usm(b) => visitor.visit_usm(b),
            Buffer::Native(b) => visitor.visit_native(b),
        }
    }

    pub fn to_native(&self) -> Result<NativeBuffer<T>> {
        self.apply(&mut ToNative)
    }

    pub fn to_usm(&self) -> Result<UsmBuffer<T>> {
        self.apply(&mut ToUsm)
    }

    pub(crate) fn region(&self) -> &Region<T> {
        match self {
            Buffer::Host(b) => b.region(),
            Buffer::Usm(b) => b.region(),
            Buffer::Native(b) => b.region(),
        }
    }
}

impl<T: DataType> From<Vec<T>> for Buffer<T> {
    fn from(data: Vec<T>) -> Self {
        Buffer::Host(HostBuffer::new(data))
    }
}

impl<T: DataType> From<HostBuffer<T>> for Buffer<T> {
    fn from(buffer: HostBuffer<T>) -> Self {
        Buffer::Host(buffer)
    }
}

impl<T: DataType> From<UsmBuffer<T>> for Buffer<T> {
    fn from(buffer: UsmBuffer<T>) -> Self {
        Buffer::Usm(buffer)
    }
}

impl<T: DataType> From<NativeBuffer<T>> for Buffer<T> {
    fn from(buffer: NativeBuffer<T>) -> Self {
        Buffer::Native(buffer)
    }
}
