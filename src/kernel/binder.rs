use std::collections::BTreeMap;

use crate::backend::queue::DeviceQueue;
use crate::buffer::storage::{ErasedRegion, LockedBlock, Region};
use crate::buffer::{Buffer, BufferVisitor, HostBuffer, NativeBuffer, UsmBuffer, UsmKind};
use crate::error::{Error, Result};
use crate::types::{Any, DataType, Scalar, TypeId, TypeOp, dispatch};

use super::argument::{AccessMode, ArgumentCategory, KernelArguments, LocalBuffer};

/// An argument resolved to its physical form, before any lock is taken.
pub(crate) enum Resolved {
    Constant(Scalar),
    Global {
        region: Box<dyn ErasedRegion>,
        access: AccessMode,
    },
    Local(LocalBuffer),
}

impl Resolved {
    /// Work-group memory this argument needs, `None` on overflow.
    pub(crate) fn local_bytes(&self) -> Option<usize> {
        match self {
            Resolved::Local(local) => local
                .count()
                .checked_mul(local.type_id().size_in_bytes().unwrap_or(0)),
            _ => Some(0),
        }
    }
}

/// Resolves every argument in declaration order.
///
/// Local buffers are only meaningful for nd-range launches, binding one into
/// a flat launch is a caller bug.
pub(crate) fn resolve(
    args: &KernelArguments,
    queue: &DeviceQueue,
    allow_local: bool,
) -> Result<Vec<Resolved>> {
    args.iter()
        .enumerate()
        .map(|(index, arg)| {
            if !arg.is_set() {
                return Err(Error::IncorrectParameter(format!(
                    "kernel argument {} is not set",
                    index
                ))
                .into());
            }

            match arg.category() {
                ArgumentCategory::PublicConstant => {
                    Ok(Resolved::Constant(*arg.value().get::<Scalar>()))
                }
                ArgumentCategory::PrivateBuffer => {
                    assert!(
                        allow_local,
                        "local buffer argument {} requires an nd-range launch",
                        index
                    );
                    Ok(Resolved::Local(*arg.value().get::<LocalBuffer>()))
                }
                ArgumentCategory::PublicBuffer => {
                    let region = dispatch(
                        arg.type_id(),
                        ResolveBuffer {
                            value: arg.value(),
                            queue,
                        },
                    )??;
                    Ok(Resolved::Global {
                        region,
                        access: arg.access(),
                    })
                }
            }
        })
        .collect()
}

struct ResolveBuffer<'a> {
    value: &'a Any,
    queue: &'a DeviceQueue,
}

impl TypeOp for ResolveBuffer<'_> {
    type Output = Result<Box<dyn ErasedRegion>>;

    fn call<T: DataType>(self) -> Self::Output {
        let region = device_region(self.value.get::<Buffer<T>>(), self.queue)?;
        Ok(Box::new(region))
    }
}

/// The storage a device operation on `buffer` addresses. Device USM is only
/// addressable by the queue that allocated it.
pub(crate) fn device_region<T: DataType>(buffer: &Buffer<T>, queue: &DeviceQueue) -> Result<Region<T>> {
    buffer.apply(&mut DeviceAccess { queue })
}

struct DeviceAccess<'a> {
    queue: &'a DeviceQueue,
}

impl<T: DataType> BufferVisitor<T> for DeviceAccess<'_> {
    type Output = Result<Region<T>>;

    fn visit_host(&mut self, buffer: &HostBuffer<T>) -> Self::Output {
        Ok(buffer.region().clone())
    }

    fn visit_usm(&mut self, buffer: &UsmBuffer<T>) -> Self::Output {
        if buffer.kind() == UsmKind::Device && !buffer.is_owned_by(self.queue) {
            return Err(Error::AccessUsmPointerOnOtherDevice.into());
        }
        Ok(buffer.region().clone())
    }

    fn visit_native(&mut self, buffer: &NativeBuffer<T>) -> Self::Output {
        Ok(buffer.region().clone())
    }
}

/// An argument as the kernel body sees it.
pub(crate) enum BoundArgument {
    Constant(Scalar),
    Global {
        type_id: TypeId,
        ptr: *mut u8,
        len: usize,
        access: AccessMode,
    },
    Local(LocalBuffer),
}

/// Bound arguments plus the storage locks that keep their memory valid.
/// The locks are released when this value is dropped, after the submission.
pub(crate) struct BoundArguments<'a> {
    args: Vec<BoundArgument>,
    _held: Vec<LockedBlock<'a>>,
}

impl<'a> BoundArguments<'a> {
    /// Locks every distinct storage once, for writing if any argument writes
    /// it, in address order.
    pub(crate) fn bind(resolved: &'a [Resolved]) -> Self {
        let mut modes: BTreeMap<usize, (usize, bool)> = BTreeMap::new();
        for (index, arg) in resolved.iter().enumerate() {
            if let Resolved::Global { region, access } = arg {
                let entry = modes.entry(region.storage_key()).or_insert((index, false));
                entry.1 |= access.writes();
            }
        }

        let mut bases = BTreeMap::new();
        let mut held = Vec::with_capacity(modes.len());
        for (key, (index, write)) in modes {
            if let Resolved::Global { region, .. } = &resolved[index] {
                let locked = region.lock(write);
                bases.insert(key, locked.base);
                held.push(locked);
            }
        }

        let args = resolved
            .iter()
            .map(|arg| match arg {
                Resolved::Constant(value) => BoundArgument::Constant(*value),
                Resolved::Local(local) => BoundArgument::Local(*local),
                Resolved::Global { region, access } => {
                    let type_id = region.element_type();
                    let element = type_id.size_in_bytes().unwrap_or(0);
                    let base = bases[&region.storage_key()];
                    BoundArgument::Global {
                        type_id,
                        ptr: unsafe { base.add(region.offset() * element) },
                        len: region.len(),
                        access: *access,
                    }
                }
            })
            .collect();

        Self { args, _held: held }
    }

    pub(crate) fn args(&self) -> &[BoundArgument] {
        &self.args
    }
}
