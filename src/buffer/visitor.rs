use crate::error::{Error, Result};
use crate::types::DataType;

use super::{HostBuffer, NativeBuffer, UsmBuffer, UsmKind};

/// One handler per buffer kind, driven by [`super::Buffer::apply`].
pub trait BufferVisitor<T: DataType> {
    type Output;

    fn visit_host(&mut self, buffer: &HostBuffer<T>) -> Self::Output;
    fn visit_usm(&mut self, buffer: &UsmBuffer<T>) -> Self::Output;
    fn visit_native(&mut self, buffer: &NativeBuffer<T>) -> Self::Output;
}

/// Converts any buffer kind into a backend buffer object over the same
/// memory.
pub struct ToNative;

impl<T: DataType> BufferVisitor<T> for ToNative {
    type Output = Result<NativeBuffer<T>>;

    fn visit_host(&mut self, buffer: &HostBuffer<T>) -> Self::Output {
        Ok(NativeBuffer::from_region(buffer.region().clone(), None))
    }

    fn visit_usm(&mut self, buffer: &UsmBuffer<T>) -> Self::Output {
        if buffer.kind() == UsmKind::Device && !buffer.is_attached() {
            return Err(Error::AccessUsmPointerOnOtherDevice.into());
        }
        Ok(NativeBuffer::from_region(
            buffer.region().clone(),
            buffer.queue_link(),
        ))
    }

    fn visit_native(&mut self, buffer: &NativeBuffer<T>) -> Self::Output {
        Ok(buffer.clone())
    }
}

/// Converts any buffer kind into a USM allocation over the same memory.
/// Host memory becomes shared memory, queue-owned buffer objects become
/// device memory of that queue.
pub struct ToUsm;

impl<T: DataType> BufferVisitor<T> for ToUsm {
    type Output = Result<UsmBuffer<T>>;

    fn visit_host(&mut self, buffer: &HostBuffer<T>) -> Self::Output {
        Ok(UsmBuffer::from_region(
            buffer.region().clone(),
            UsmKind::Shared,
            None,
        ))
    }

    fn visit_usm(&mut self, buffer: &UsmBuffer<T>) -> Self::Output {
        Ok(buffer.clone())
    }

    fn visit_native(&mut self, buffer: &NativeBuffer<T>) -> Self::Output {
        let queue = buffer.queue_link();
        let kind = if queue.is_some() {
            UsmKind::Device
        } else {
            UsmKind::Shared
        };
        Ok(UsmBuffer::from_region(buffer.region().clone(), kind, queue))
    }
}
