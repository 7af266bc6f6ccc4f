use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};

/// Device memory accounting. Updates never need a mutable reference.
pub struct MemoryTracker {
    maximum: u64,
    current: AtomicU64,
}

impl MemoryTracker {
    pub fn new(maximum: u64) -> Self {
        Self {
            maximum,
            current: AtomicU64::new(0),
        }
    }

    /// Reserves `size` bytes, failing without side effects when the limit
    /// would be exceeded.
    pub fn reserve(self: &Arc<Self>, size: u64) -> Result<Reservation> {
        let update = self
            .current
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current
                    .checked_add(size)
                    .filter(|&total| total <= self.maximum)
            });

        match update {
            Ok(_) => Ok(Reservation {
                tracker: Arc::clone(self),
                size,
            }),
            Err(current) => Err(Error::MemoryAllocationFailed(format!(
                "tried to allocate {} bytes when {} of {} bytes are used",
                size, current, self.maximum
            ))
            .into()),
        }
    }

    fn release(&self, size: u64) {
        self.current.fetch_sub(size, Ordering::AcqRel);
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }

    pub fn available(&self) -> u64 {
        self.maximum.saturating_sub(self.current())
    }

    pub fn maximum(&self) -> u64 {
        self.maximum
    }
}

/// Bytes held against a [`MemoryTracker`], returned on drop.
pub struct Reservation {
    tracker: Arc<MemoryTracker>,
    size: u64,
}

impl Reservation {
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        self.tracker.release(self.size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_reserve_and_release() {
        let tracker = Arc::new(MemoryTracker::new(100));
        let a = tracker.reserve(60).unwrap();
        assert_eq!(tracker.current(), 60);
        assert_eq!(tracker.available(), 40);

        let status = tracker.reserve(50).err().unwrap();
        assert!(status.contains(ErrorKind::Allocation));
        assert_eq!(tracker.current(), 60);

        drop(a);
        assert_eq!(tracker.current(), 0);
        let b = tracker.reserve(100).unwrap();
        assert_eq!(b.size(), 100);
    }

    #[test]
    fn test_overflow_is_rejected() {
        let tracker = Arc::new(MemoryTracker::new(u64::MAX));
        let _held = tracker.reserve(u64::MAX - 1).unwrap();
        assert!(tracker.reserve(2).is_err());
    }
}
