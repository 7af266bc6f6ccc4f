use crate::error::Result;
use crate::types::DataType;

use super::storage::{HostReadView, HostWriteView, Region};

/// Plain host memory shared between every buffer that aliases it.
#[derive(Clone)]
pub struct HostBuffer<T: DataType> {
    region: Region<T>,
}

impl<T: DataType> HostBuffer<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            region: Region::from_vec(data),
        }
    }

    pub fn zeroed(len: usize) -> Result<Self> {
        Ok(Self {
            region: Region::allocate(len, None)?,
        })
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
}
