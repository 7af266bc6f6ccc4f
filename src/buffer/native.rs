use std::sync::Weak;

use crate::backend::queue::DeviceQueue;
use crate::error::Result;
use crate::types::DataType;

use super::storage::{HostReadView, HostWriteView, Region};

/// A backend buffer object. Host access maps the memory through a scoped
/// host accessor.
#[derive(Clone)]
pub struct NativeBuffer<T: DataType> {
    region: Region<T>,
    queue: Option<Weak<DeviceQueue>>,
}

impl<T: DataType> NativeBuffer<T> {
    /// A buffer object that uses `data` as its host memory.
    pub fn from_vec(data: Vec<T>) -> Self {
        Self {
            region: Region::from_vec(data),
            queue: None,
        }
    }

    pub(crate) fn from_region(region: Region<T>, queue: Option<Weak<DeviceQueue>>) -> Self {
        Self { region, queue }
    }

    pub fn len(&self) -> usize {
        self.region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sub_buffer(&self, offset: usize, len: usize) -> Self {
        Self {
            region: self.region.sub(offset, len),
            queue: self.queue.clone(),
        }
    }

    pub fn host_read(&self) -> Result<HostReadView<'_, T>> {
        Ok(HostReadView::mapped(self.region.read()))
    }

    pub fn host_write(&self) -> Result<HostWriteView<'_, T>> {
        Ok(HostWriteView::mapped(self.region.write()))
    }

    pub fn host_read_write(&self) -> Result<HostWriteView<'_, T>> {
        self.host_write()
    }

    pub(crate) fn region(&self) -> &Region<T> {
        &self.region
    }

    pub(crate) fn queue_link(&self) -> Option<Weak<DeviceQueue>> {
        self.queue.clone()
    }
}
