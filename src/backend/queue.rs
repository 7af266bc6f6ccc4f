use std::any::Any as StdAny;
use std::collections::TryReserveError;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::buffer::storage::Region;
use crate::buffer::{NativeBuffer, UsmBuffer, UsmKind};
use crate::error::{Error, Result};
use crate::types::DataType;

use super::memory_tracker::MemoryTracker;
use super::runtime::{Failure, NativeRuntime};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct QueueLimits {
    pub(crate) max_work_group_size: usize,
    pub(crate) local_memory_size: usize,
}

/// An in-order device queue.
///
/// Submissions run to completion before `submit` returns, and each one
/// reports its own failure, including panics of kernel bodies, to the caller
/// that submitted it.
pub struct DeviceQueue {
    runtime: Arc<NativeRuntime>,
    memory: Arc<MemoryTracker>,
    limits: QueueLimits,
    submissions: AtomicU64,
}

impl DeviceQueue {
    pub(crate) fn new(
        runtime: Arc<NativeRuntime>,
        memory: Arc<MemoryTracker>,
        limits: QueueLimits,
    ) -> Arc<Self> {
        Arc::new(Self {
            runtime,
            memory,
            limits,
            submissions: AtomicU64::new(0),
        })
    }

    pub fn runtime(&self) -> &Arc<NativeRuntime> {
        &self.runtime
    }

    pub fn memory(&self) -> &MemoryTracker {
        &self.memory
    }

    pub fn submissions(&self) -> u64 {
        self.submissions.load(Ordering::Acquire)
    }

    pub(crate) fn limits(&self) -> QueueLimits {
        self.limits
    }

    /// Runs `job` on the queue and returns its outcome once it has completed.
    pub(crate) fn submit<F>(&self, label: &str, job: F) -> Result<()>
    where
        F: FnOnce() -> Result<()>,
    {
        let id = self.submissions.fetch_add(1, Ordering::AcqRel);
        debug!(label, id, "submit");

        let outcome = panic::catch_unwind(AssertUnwindSafe(job))
            .unwrap_or_else(|payload| Err(translate_panic(payload).into()));

        if let Err(status) = &outcome {
            warn!(label, id, %status, "submission failed");
        }
        outcome
    }

    pub(crate) fn allocate_native<T: DataType>(self: &Arc<Self>, len: usize) -> Result<NativeBuffer<T>> {
        let region = self.allocate(len)?;
        Ok(NativeBuffer::from_region(region, Some(Arc::downgrade(self))))
    }

    pub(crate) fn allocate_usm<T: DataType>(
        self: &Arc<Self>,
        len: usize,
        kind: UsmKind,
    ) -> Result<UsmBuffer<T>> {
        let region = self.allocate(len)?;
        Ok(UsmBuffer::from_region(region, kind, Some(Arc::downgrade(self))))
    }

    fn allocate<T: DataType>(&self, len: usize) -> Result<Region<T>> {
        if len == 0 {
            return Err(self.runtime.error(Failure::InvalidBufferSize).into());
        }

        let bytes = (len as u64)
            .checked_mul(std::mem::size_of::<T>() as u64)
            .ok_or_else(|| {
                Error::MemoryAllocationFailed(format!("{} elements of {} overflow", len, T::TYPE_ID))
            })?;

        let reservation = self.memory.reserve(bytes).map_err(|mut status| {
            status |= self.runtime.error(Failure::OutOfDeviceMemory);
            status
        })?;

        debug!(bytes, element = %T::TYPE_ID, "device allocation");
        Region::allocate(len, Some(reservation))
    }
}

fn translate_panic(payload: Box<dyn StdAny + Send>) -> Error {
    if let Some(error) = payload.downcast_ref::<TryReserveError>() {
        return Error::MemoryAllocationFailed(error.to_string());
    }
    if let Some(error) = payload.downcast_ref::<Error>() {
        return error.clone();
    }
    if let Some(message) = payload.downcast_ref::<&str>() {
        return Error::BackendException(message.to_string());
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return Error::BackendException(message.clone());
    }
    Error::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NativeApi;
    use crate::error::ErrorKind;

    fn queue(limit: u64) -> Arc<DeviceQueue> {
        DeviceQueue::new(
            NativeRuntime::new(NativeApi::OpenCl),
            Arc::new(MemoryTracker::new(limit)),
            QueueLimits {
                max_work_group_size: 256,
                local_memory_size: 1024,
            },
        )
    }

    #[test]
    fn test_each_submission_reports_its_own_failure() {
        let queue = queue(1024);
        assert!(queue.submit("ok", || Ok(())).is_ok());

        let status = queue
            .submit("fails", || Err(Error::incorrect_parameter("bad").into()))
            .unwrap_err();
        assert_eq!(status.errors(), &[Error::IncorrectParameter("bad".to_string())]);

        let status = queue.submit("panics", || panic!("kernel fault")).unwrap_err();
        assert_eq!(
            status.errors(),
            &[Error::BackendException("kernel fault".to_string())]
        );

        let status = queue
            .submit("custom", || std::panic::panic_any(42u32))
            .unwrap_err();
        assert_eq!(status.errors(), &[Error::Unknown]);

        assert!(queue.submit("ok", || Ok(())).is_ok());
        assert_eq!(queue.submissions(), 5);
    }

    #[test]
    fn test_failures_stay_with_their_thread() {
        let queue = queue(1024);
        std::thread::scope(|scope| {
            let failing = scope.spawn(|| {
                (0..500)
                    .filter(|_| queue.submit("fails", || Err(Error::Unknown.into())).is_ok())
                    .count()
            });
            let passing = scope.spawn(|| {
                (0..500)
                    .filter(|_| queue.submit("ok", || Ok(())).is_err())
                    .count()
            });
            assert_eq!(failing.join().unwrap(), 0);
            assert_eq!(passing.join().unwrap(), 0);
        });
    }

    #[test]
    fn test_allocations_are_accounted() {
        let queue = queue(64);
        let buffer = queue.allocate_native::<f64>(4).unwrap();
        assert_eq!(queue.memory().current(), 32);

        let status = queue.allocate_usm::<f64>(8, UsmKind::Device).err().unwrap();
        assert!(status.contains(ErrorKind::Allocation));
        assert!(status.errors().iter().any(|e| matches!(e, Error::OpenCl { code: -4, .. })));

        drop(buffer);
        assert_eq!(queue.memory().current(), 0);
    }

    #[test]
    fn test_zero_length_allocation() {
        let status = queue(64).allocate_native::<u8>(0).err().unwrap();
        assert!(matches!(status.errors(), [Error::OpenCl { code: -61, .. }]));
    }

    #[test]
    fn test_device_memory_follows_queue_lifetime() {
        let queue = queue(1024);
        let buffer = queue.allocate_usm::<i32>(3, UsmKind::Device).unwrap();
        buffer.host_write().unwrap().copy_from_slice(&[1, 2, 3]);
        assert_eq!(&*buffer.host_read().unwrap(), &[1, 2, 3]);

        assert!(queue.submit("fails", || Err(Error::Unknown.into())).is_err());
        assert!(buffer.host_read().is_ok());

        drop(queue);
        assert!(!buffer.is_attached());
        assert!(buffer.host_read().is_err());
    }
}
