use std::sync::Arc;

use crate::types::{DataType, TypeId};

use super::argument::AccessMode;
use super::binder::BoundArgument;

/// Host implementation of a device kernel, invoked once per work-group.
pub type HostKernelFn = Arc<dyn Fn(&mut WorkGroup<'_>) + Send + Sync>;

/// Ids of one work item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkItem {
    pub global: [usize; 3],
    pub local: [usize; 3],
}

impl WorkItem {
    /// Row-major linear global id over a range of `extents`.
    pub fn linear_global(&self, extents: [usize; 3]) -> usize {
        (self.global[2] * extents[1] + self.global[1]) * extents[0] + self.global[0]
    }
}

/// Iterates the work items of one group, x fastest.
pub struct WorkItems {
    local: [usize; 3],
    group: [usize; 3],
    next: usize,
    total: usize,
}

impl Iterator for WorkItems {
    type Item = WorkItem;

    fn next(&mut self) -> Option<WorkItem> {
        if self.next >= self.total {
            return None;
        }
        let linear = self.next;
        self.next += 1;

        let x = linear % self.local[0];
        let y = (linear / self.local[0]) % self.local[1];
        let z = linear / (self.local[0] * self.local[1]);
        let local = [x, y, z];
        let global = [
            self.group[0] * self.local[0] + x,
            self.group[1] * self.local[1] + y,
            self.group[2] * self.local[2] + z,
        ];
        Some(WorkItem { global, local })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.next;
        (remaining, Some(remaining))
    }
}

struct Scratch {
    type_id: TypeId,
    bytes: Vec<u8>,
}

impl Scratch {
    fn element<T: DataType>(&self, arg: usize, index: usize) -> std::ops::Range<usize> {
        assert_eq!(
            self.type_id,
            T::TYPE_ID,
            "local argument {} holds {} elements",
            arg,
            self.type_id
        );
        let size = std::mem::size_of::<T>();
        let start = index * size;
        assert!(
            start + size <= self.bytes.len(),
            "index {} out of bounds for local argument {}",
            index,
            arg
        );
        start..start + size
    }
}

/// What a kernel body sees of one work-group: its geometry and the bound
/// arguments. Element accesses check type, bounds and access mode and panic
/// on violation, the panic is reported as a backend failure of the launch.
pub struct WorkGroup<'a> {
    args: &'a [BoundArgument],
    dimensions: usize,
    global: [usize; 3],
    local: [usize; 3],
    group: [usize; 3],
    scratch: Vec<Option<Scratch>>,
}

impl<'a> WorkGroup<'a> {
    pub(crate) fn new(
        args: &'a [BoundArgument],
        dimensions: usize,
        global: [usize; 3],
        local: [usize; 3],
        group: [usize; 3],
    ) -> Self {
        let scratch = args
            .iter()
            .map(|arg| match arg {
                BoundArgument::Local(local) => Some(Scratch {
                    type_id: local.type_id(),
                    bytes: vec![0; local.count() * local.type_id().size_in_bytes().unwrap_or(0)],
                }),
                _ => None,
            })
            .collect();

        Self {
            args,
            dimensions,
            global,
            local,
            group,
            scratch,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn global_size(&self, axis: usize) -> usize {
        self.global[axis]
    }

    pub fn global_extents(&self) -> [usize; 3] {
        self.global
    }

    pub fn local_size(&self, axis: usize) -> usize {
        self.local[axis]
    }

    pub fn group_id(&self, axis: usize) -> usize {
        self.group[axis]
    }

    pub fn group_count(&self, axis: usize) -> usize {
        self.global[axis] / self.local[axis]
    }

    pub fn items(&self) -> WorkItems {
        WorkItems {
            local: self.local,
            group: self.group,
            next: 0,
            total: self.local.iter().product(),
        }
    }

    /// Element count of a buffer argument.
    pub fn arg_len(&self, arg: usize) -> usize {
        match &self.args[arg] {
            BoundArgument::Global { len, .. } => *len,
            BoundArgument::Local(local) => local.count(),
            BoundArgument::Constant(_) => 1,
        }
    }

    pub fn load<T: DataType>(&self, arg: usize, index: usize) -> T {
        let (ptr, _) = self.global_slot::<T>(arg, index);
        unsafe { ptr.cast::<T>().add(index).read() }
    }

    pub fn store<T: DataType>(&self, arg: usize, index: usize, value: T) {
        let (ptr, access) = self.global_slot::<T>(arg, index);
        assert!(access.writes(), "argument {} is bound read-only", arg);
        unsafe { ptr.cast::<T>().add(index).write(value) }
    }

    pub fn scalar<T: DataType>(&self, arg: usize) -> T {
        match &self.args[arg] {
            BoundArgument::Constant(value) => value.get::<T>().unwrap_or_else(|| {
                panic!(
                    "argument {} holds a {} scalar, read as {}",
                    arg,
                    value.type_id(),
                    T::TYPE_ID
                )
            }),
            _ => panic!("argument {} is not a scalar", arg),
        }
    }

    pub fn local_load<T: DataType>(&self, arg: usize, index: usize) -> T {
        let scratch = self.scratch(arg);
        let range = scratch.element::<T>(arg, index);
        bytemuck::pod_read_unaligned(&scratch.bytes[range])
    }

    pub fn local_store<T: DataType>(&mut self, arg: usize, index: usize, value: T) {
        let scratch = self.scratch_mut(arg);
        let range = scratch.element::<T>(arg, index);
        scratch.bytes[range].copy_from_slice(bytemuck::bytes_of(&value));
    }

    fn global_slot<T: DataType>(&self, arg: usize, index: usize) -> (*mut u8, AccessMode) {
        match &self.args[arg] {
            BoundArgument::Global {
                type_id,
                ptr,
                len,
                access,
            } => {
                assert_eq!(
                    *type_id,
                    T::TYPE_ID,
                    "argument {} holds {} elements",
                    arg,
                    type_id
                );
                assert!(
                    index < *len,
                    "index {} out of bounds for argument {} of {} elements",
                    index,
                    arg,
                    len
                );
                (*ptr, *access)
            }
            _ => panic!("argument {} is not a global buffer", arg),
        }
    }

    fn scratch(&self, arg: usize) -> &Scratch {
        match &self.scratch[arg] {
            Some(scratch) => scratch,
            None => panic!("argument {} is not a local buffer", arg),
        }
    }

    fn scratch_mut(&mut self, arg: usize) -> &mut Scratch {
        match &mut self.scratch[arg] {
            Some(scratch) => scratch,
            None => panic!("argument {} is not a local buffer", arg),
        }
    }
}
