mod compiler;

mod factory;

pub(crate) mod memory_tracker;

mod native_kernel;

pub(crate) mod queue;

mod resource;

mod runtime;

pub(crate) mod scheduler;

pub use factory::{KernelFactory, NativeKernelFactory};
pub use memory_tracker::{MemoryTracker, Reservation};
pub use native_kernel::{LevelZeroKernel, OpenClKernel};
pub use queue::DeviceQueue;
pub use resource::{
    LevelZeroContextRef, LevelZeroDeviceRef, LevelZeroKernelRef, LevelZeroModuleRef, NativeKind,
    NativeRef, OpenClContextRef, OpenClDeviceRef, OpenClKernelRef, OpenClProgramRef,
};
pub use runtime::{Handle, NativeApi, NativeRuntime};
