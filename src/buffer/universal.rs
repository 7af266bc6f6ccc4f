use crate::error::Result;
use crate::types::{Any, DataType, TypeId, TypeOp, dispatch};

use super::Buffer;

/// A [`Buffer`] with its element type erased.
///
/// The [`TypeId`] tag always names the element type of the boxed buffer.
/// Clones share the underlying storage.
#[derive(Clone, Debug, Default)]
pub struct UniversalBuffer {
    type_id: TypeId,
    buffer: Any,
}

impl UniversalBuffer {
    pub fn new<T: DataType>(buffer: Buffer<T>) -> Self {
        Self {
            type_id: T::TYPE_ID,
            buffer: Any::new(buffer),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn set<T: DataType>(&mut self, buffer: Buffer<T>) {
        *self = Self::new(buffer);
    }

    /// The typed buffer. `T` must match [`Self::type_id`].
    pub fn get<T: DataType>(&self) -> &Buffer<T> {
        debug_assert_eq!(
            self.type_id,
            T::TYPE_ID,
            "universal buffer holds {} but {} was requested",
            self.type_id,
            T::TYPE_ID
        );
        self.buffer.get::<Buffer<T>>()
    }

    pub fn try_get<T: DataType>(&self) -> Option<&Buffer<T>> {
        self.buffer.try_get::<Buffer<T>>()
    }

    /// Element count, zero for an empty universal buffer.
    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        dispatch(self.type_id, Len(&self.buffer)).unwrap_or(0)
    }

    pub fn sub_buffer(&self, offset: usize, len: usize) -> Result<Self> {
        dispatch(
            self.type_id,
            SubBuffer {
                buffer: &self.buffer,
                offset,
                len,
            },
        )
    }

    pub(crate) fn boxed(&self) -> &Any {
        &self.buffer
    }
}

impl<T: DataType> From<Buffer<T>> for UniversalBuffer {
    fn from(buffer: Buffer<T>) -> Self {
        Self::new(buffer)
    }
}

struct Len<'a>(&'a Any);

impl TypeOp for Len<'_> {
    type Output = usize;

    fn call<T: DataType>(self) -> usize {
        self.0.get::<Buffer<T>>().len()
    }
}

struct SubBuffer<'a> {
    buffer: &'a Any,
    offset: usize,
    len: usize,
}

impl TypeOp for SubBuffer<'_> {
    type Output = UniversalBuffer;

    fn call<T: DataType>(self) -> UniversalBuffer {
        UniversalBuffer::new(self.buffer.get::<Buffer<T>>().sub_buffer(self.offset, self.len))
    }
}
