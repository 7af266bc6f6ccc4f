use std::sync::{Arc, Weak};

use crate::backend::queue::DeviceQueue;
use crate::error::{Error, Result};
use crate::types::DataType;

use super::storage::{HostReadView, HostWriteView, Region};

/// Where a USM allocation is directly addressable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UsmKind {
    /// Host memory the device can read over the bus.
    Host,
    /// Device memory, never addressable from the host.
    Device,
    /// Memory migrated on demand between host and device.
    Shared,
}

/// A USM allocation. Device allocations stay linked to the queue that made
/// them, host access to such memory goes through that queue.
#[derive(Clone)]
pub struct UsmBuffer<T: DataType> {
    region: Region<T>,
    kind: UsmKind,
    queue: Option<Weak<DeviceQueue>>,
}

impl<T: DataType> UsmBuffer<T> {
    /// Wraps memory that was not allocated through a context of this process.
    pub fn from_vec(data: Vec<T>, kind: UsmKind) -> Self {
        Self {
            region: Region::from_vec(data),
            kind,
            queue: None,
        }
    }

    pub(crate) fn from_region(
        region: Region<T>,
        kind: UsmKind,
        queue: Option<Weak<DeviceQueue>>,
    ) -> Self {
        Self {
            region,
            kind,
            queue,
        }
    }

    pub fn kind(&self) -> UsmKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the allocating queue is still alive.
    pub fn is_attached(&self) -> bool {
        self.queue().is_some()
    }

    pub fn sub_buffer(&self, offset: usize, len: usize) -> Self {
        Self {
            region: self.region.sub(offset, len),
            kind: self.kind,
            queue: self.queue.clone(),
        }
    }

    pub fn host_read(&self) -> Result<HostReadView<'_, T>> {
        match self.kind {
            UsmKind::Host | UsmKind::Shared => Ok(HostReadView::mapped(self.region.read())),
            UsmKind::Device => {
                self.require_attached()?;
                Ok(HostReadView::staged(self.region.to_vec()))
            }
        }
    }

    /// Write-only access: staged device memory starts zeroed and replaces
    /// the whole buffer when the view is dropped.
    pub fn host_write(&self) -> Result<HostWriteView<'_, T>> {
        match self.kind {
            UsmKind::Host | UsmKind::Shared => Ok(HostWriteView::mapped(self.region.write())),
            UsmKind::Device => {
                self.require_attached()?;
                Ok(HostWriteView::staged(vec![T::zeroed(); self.len()], &self.region))
            }
        }
    }

    pub fn host_read_write(&self) -> Result<HostWriteView<'_, T>> {
        match self.kind {
            UsmKind::Host | UsmKind::Shared => Ok(HostWriteView::mapped(self.region.write())),
            UsmKind::Device => {
                self.require_attached()?;
                Ok(HostWriteView::staged(self.region.to_vec(), &self.region))
            }
        }
    }

    pub(crate) fn region(&self) -> &Region<T> {
        &self.region
    }

    pub(crate) fn queue(&self) -> Option<Arc<DeviceQueue>> {
        self.queue.as_ref().and_then(Weak::upgrade)
    }

    pub(crate) fn queue_link(&self) -> Option<Weak<DeviceQueue>> {
        self.queue.clone()
    }

    pub(crate) fn is_owned_by(&self, queue: &DeviceQueue) -> bool {
        self.queue
            .as_ref()
            .is_some_and(|link| std::ptr::eq(link.as_ptr(), queue))
    }

    fn require_attached(&self) -> Result<()> {
        if !self.is_attached() {
            return Err(Error::AccessUsmPointerOnOtherDevice.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_shared_memory_is_passthrough() {
        let buffer = UsmBuffer::from_vec(vec![1u16, 2, 3], UsmKind::Shared);
        buffer.host_write().unwrap()[0] = 7;
        assert_eq!(&*buffer.host_read().unwrap(), &[7, 2, 3]);
    }

    #[test]
    fn test_detached_device_memory_is_not_host_accessible() {
        let buffer = UsmBuffer::from_vec(vec![0.5f32; 4], UsmKind::Device);
        assert!(!buffer.is_attached());

        let status = buffer.host_read().err().unwrap();
        assert_eq!(status.errors(), &[Error::AccessUsmPointerOnOtherDevice]);
        assert!(status.contains(ErrorKind::Access));
        assert!(buffer.host_write().is_err());
        assert!(buffer.host_read_write().is_err());
    }
}
