use std::ops::{Index, IndexMut};

use crate::buffer::{Buffer, UniversalBuffer};
use crate::types::{Any, DataType, Scalar, TypeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ArgumentCategory {
    /// Global memory visible to every work item.
    PublicBuffer,
    /// A value passed by copy.
    #[default]
    PublicConstant,
    /// Work-group local scratch memory.
    PrivateBuffer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AccessMode {
    #[default]
    Read,
    Write,
    ReadWrite,
}

impl AccessMode {
    pub fn reads(self) -> bool {
        matches!(self, AccessMode::Read | AccessMode::ReadWrite)
    }

    pub fn writes(self) -> bool {
        matches!(self, AccessMode::Write | AccessMode::ReadWrite)
    }
}

/// Size of a work-group local buffer, allocated by the backend per group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocalBuffer {
    type_id: TypeId,
    count: usize,
}

impl LocalBuffer {
    pub fn new<T: DataType>(count: usize) -> Self {
        Self {
            type_id: T::TYPE_ID,
            count,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

/// One positional slot of a kernel invocation.
#[derive(Clone, Debug, Default)]
pub struct KernelArgument {
    type_id: TypeId,
    category: ArgumentCategory,
    access: AccessMode,
    value: Any,
}

impl KernelArgument {
    pub fn set_buffer<T: DataType>(&mut self, buffer: &Buffer<T>, access: AccessMode) {
        self.type_id = T::TYPE_ID;
        self.category = ArgumentCategory::PublicBuffer;
        self.access = access;
        self.value.set(buffer.clone());
    }

    pub fn set_universal(&mut self, buffer: &UniversalBuffer, access: AccessMode) {
        debug_assert!(!buffer.is_empty(), "binding an empty universal buffer");
        self.type_id = buffer.type_id();
        self.category = ArgumentCategory::PublicBuffer;
        self.access = access;
        self.value = buffer.boxed().clone();
    }

    pub fn set_local(&mut self, local: LocalBuffer) {
        self.type_id = local.type_id();
        self.category = ArgumentCategory::PrivateBuffer;
        self.access = AccessMode::ReadWrite;
        self.value.set(local);
    }

    pub fn set_scalar<T: DataType>(&mut self, value: T) {
        self.type_id = T::TYPE_ID;
        self.category = ArgumentCategory::PublicConstant;
        self.access = AccessMode::Read;
        self.value.set(Scalar::from(value));
    }

    pub fn is_set(&self) -> bool {
        !self.value.is_empty()
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn category(&self) -> ArgumentCategory {
        self.category
    }

    pub fn access(&self) -> AccessMode {
        self.access
    }

    pub(crate) fn value(&self) -> &Any {
        &self.value
    }
}

/// Fixed-size argument list. Deliberately not `Clone`.
#[derive(Debug)]
pub struct KernelArguments {
    args: Vec<KernelArgument>,
}

impl KernelArguments {
    pub fn new(count: usize) -> Self {
        Self {
            args: vec![KernelArgument::default(); count],
        }
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KernelArgument> {
        self.args.iter()
    }

    pub fn set_buffer<T: DataType>(&mut self, index: usize, buffer: &Buffer<T>, access: AccessMode) {
        self.args[index].set_buffer(buffer, access);
    }

    pub fn set_universal(&mut self, index: usize, buffer: &UniversalBuffer, access: AccessMode) {
        self.args[index].set_universal(buffer, access);
    }

    pub fn set_local(&mut self, index: usize, local: LocalBuffer) {
        self.args[index].set_local(local);
    }

    pub fn set_scalar<T: DataType>(&mut self, index: usize, value: T) {
        self.args[index].set_scalar(value);
    }
}

impl Index<usize> for KernelArguments {
    type Output = KernelArgument;

    fn index(&self, index: usize) -> &KernelArgument {
        &self.args[index]
    }
}

impl IndexMut<usize> for KernelArguments {
    fn index_mut(&mut self, index: usize) -> &mut KernelArgument {
        &mut self.args[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters_fix_category_and_access() {
        let buffer = Buffer::from(vec![0.0f32; 4]);
        let universal = UniversalBuffer::from(Buffer::from(vec![0u64; 2]));

        let mut args = KernelArguments::new(4);
        assert!(!args[0].is_set());

        args.set_buffer(0, &buffer, AccessMode::Write);
        args.set_universal(1, &universal, AccessMode::ReadWrite);
        args.set_local(2, LocalBuffer::new::<i32>(16));
        args.set_scalar(3, 2.5f64);

        assert_eq!(args[0].category(), ArgumentCategory::PublicBuffer);
        assert_eq!(args[0].access(), AccessMode::Write);
        assert_eq!(args[0].type_id(), TypeId::Float32);

        assert_eq!(args[1].type_id(), TypeId::UInt64);
        assert!(args[1].value().check::<Buffer<u64>>());

        assert_eq!(args[2].category(), ArgumentCategory::PrivateBuffer);
        assert_eq!(args[2].access(), AccessMode::ReadWrite);
        assert_eq!(args[2].value().get::<LocalBuffer>().count(), 16);

        assert_eq!(args[3].category(), ArgumentCategory::PublicConstant);
        assert_eq!(args[3].access(), AccessMode::Read);
        assert_eq!(args[3].value().get::<Scalar>(), &Scalar::Float64(2.5));
    }

    #[test]
    fn test_access_flags() {
        assert!(AccessMode::Read.reads() && !AccessMode::Read.writes());
        assert!(AccessMode::Write.writes() && !AccessMode::Write.reads());
        assert!(AccessMode::ReadWrite.reads() && AccessMode::ReadWrite.writes());
    }
}
