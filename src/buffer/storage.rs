use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::{MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::backend::memory_tracker::Reservation;
use crate::error::{Error, Result};
use crate::types::{DataType, TypeId};

/// Backing allocation shared by every buffer that aliases it.
pub(crate) struct Block<T> {
    data: Vec<T>,
    _reservation: Option<Reservation>,
}

/// A window `[offset, offset + len)` into a shared [`Block`].
#[derive(Clone)]
pub(crate) struct Region<T> {
    storage: Arc<RwLock<Block<T>>>,
    offset: usize,
    len: usize,
}

impl<T: DataType> Region<T> {
    pub(crate) fn from_vec(data: Vec<T>) -> Self {
        let len = data.len();
        Self {
            storage: Arc::new(RwLock::new(Block {
                data,
                _reservation: None,
            })),
            offset: 0,
            len,
        }
    }

    /// Zero-initialised allocation of `len` elements.
    pub(crate) fn allocate(len: usize, reservation: Option<Reservation>) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|e| {
            Error::MemoryAllocationFailed(format!(
                "cannot allocate {} elements of {}: {}",
                len,
                T::TYPE_ID,
                e
            ))
        })?;
        data.resize(len, T::zeroed());

        Ok(Self {
            storage: Arc::new(RwLock::new(Block {
                data,
                _reservation: reservation,
            })),
            offset: 0,
            len,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn sub(&self, offset: usize, len: usize) -> Self {
        debug_assert!(
            offset.checked_add(len).is_some_and(|end| end <= self.len),
            "sub-buffer [{}, {}+{}) exceeds buffer of {} elements",
            offset,
            offset,
            len,
            self.len
        );
        Self {
            storage: Arc::clone(&self.storage),
            offset: self.offset + offset,
            len,
        }
    }

    pub(crate) fn read(&self) -> MappedRwLockReadGuard<'_, [T]> {
        let (start, end) = (self.offset, self.offset + self.len);
        RwLockReadGuard::map(self.storage.read(), |block| &block.data[start..end])
    }

    pub(crate) fn write(&self) -> MappedRwLockWriteGuard<'_, [T]> {
        let (start, end) = (self.offset, self.offset + self.len);
        RwLockWriteGuard::map(self.storage.write(), |block| &mut block.data[start..end])
    }

    pub(crate) fn to_vec(&self) -> Vec<T> {
        self.read().to_vec()
    }

    pub(crate) fn shares_storage(&self, other: &Region<T>) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }

    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    /// Runs `f` over the whole backing block with this region's offset.
    pub(crate) fn with_block_mut<R>(&self, f: impl FnOnce(&mut [T], usize) -> R) -> R {
        let mut block = self.storage.write();
        f(&mut block.data, self.offset)
    }
}

/// Keeps a lock guard alive without naming its type.
pub(crate) trait Held {}

impl<T: ?Sized> Held for T {}

/// A locked storage block together with its base address.
pub(crate) struct LockedBlock<'a> {
    pub(crate) base: *mut u8,
    _guard: Box<dyn Held + 'a>,
}

/// Element-type erased view of a [`Region`], used by the kernel argument
/// binder.
pub(crate) trait ErasedRegion: Send + Sync {
    fn storage_key(&self) -> usize;
    fn element_type(&self) -> TypeId;
    fn offset(&self) -> usize;
    fn len(&self) -> usize;
    fn lock(&self, write: bool) -> LockedBlock<'_>;
}

impl<T: DataType> ErasedRegion for Region<T> {
    fn storage_key(&self) -> usize {
        Arc::as_ptr(&self.storage) as *const () as usize
    }

    fn element_type(&self) -> TypeId {
        T::TYPE_ID
    }

    fn offset(&self) -> usize {
        self.offset
    }

    fn len(&self) -> usize {
        self.len
    }

    fn lock(&self, write: bool) -> LockedBlock<'_> {
        if write {
            let mut guard = self.storage.write();
            let base = guard.data.as_mut_ptr().cast::<u8>();
            LockedBlock {
                base,
                _guard: Box::new(guard),
            }
        } else {
            let guard = self.storage.read();
            let base = guard.data.as_ptr().cast_mut().cast::<u8>();
            LockedBlock {
                base,
                _guard: Box::new(guard),
            }
        }
    }
}

/// Host-readable view of a buffer.
pub struct HostReadView<'a, T>(ReadView<'a, T>);

enum ReadView<'a, T> {
    /// The buffer memory itself, locked for reading.
    Mapped(MappedRwLockReadGuard<'a, [T]>),
    /// A host copy of device-resident memory.
    Staged(Vec<T>),
}

impl<'a, T> HostReadView<'a, T> {
    pub(crate) fn mapped(guard: MappedRwLockReadGuard<'a, [T]>) -> Self {
        Self(ReadView::Mapped(guard))
    }

    pub(crate) fn staged(data: Vec<T>) -> Self {
        Self(ReadView::Staged(data))
    }
}

impl<T> Deref for HostReadView<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        match &self.0 {
            ReadView::Mapped(guard) => guard,
            ReadView::Staged(data) => data,
        }
    }
}

/// Host-writable view of a buffer. Staged views copy their contents back
/// into the buffer when dropped.
pub struct HostWriteView<'a, T: DataType>(WriteView<'a, T>);

enum WriteView<'a, T: DataType> {
    Mapped(MappedRwLockWriteGuard<'a, [T]>),
    Staged { data: Vec<T>, target: &'a Region<T> },
}

impl<'a, T: DataType> HostWriteView<'a, T> {
    pub(crate) fn mapped(guard: MappedRwLockWriteGuard<'a, [T]>) -> Self {
        Self(WriteView::Mapped(guard))
    }

    pub(crate) fn staged(data: Vec<T>, target: &'a Region<T>) -> Self {
        Self(WriteView::Staged { data, target })
    }
}

impl<T: DataType> Deref for HostWriteView<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        match &self.0 {
            WriteView::Mapped(guard) => guard,
            WriteView::Staged { data, .. } => data,
        }
    }
}

impl<T: DataType> DerefMut for HostWriteView<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        match &mut self.0 {
            WriteView::Mapped(guard) => guard,
            WriteView::Staged { data, .. } => data,
        }
    }
}

impl<T: DataType> Drop for HostWriteView<'_, T> {
    fn drop(&mut self) {
        if let WriteView::Staged { data, target } = &self.0 {
            target.write().copy_from_slice(data);
        }
    }
}
