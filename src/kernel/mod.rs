mod argument;
pub(crate) mod binder;
#[allow(clippy::module_inception)]
mod kernel;
mod range;
mod work_group;

pub use argument::{AccessMode, ArgumentCategory, KernelArgument, KernelArguments, LocalBuffer};
pub use kernel::{ExecutionTarget, Kernel, KernelPtr, KernelScheduler, Launch};
pub use range::{KernelNDRange, KernelRange};
pub(crate) use range::NativeRange;
pub use work_group::{HostKernelFn, WorkGroup, WorkItem, WorkItems};
