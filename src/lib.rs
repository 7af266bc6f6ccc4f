//! hetexec - heterogeneous execution and buffer core
//!
//! Numeric kernels are written once and run against host memory, backend
//! native buffers or USM allocations through a single scheduling and
//! argument-passing protocol. [`UniversalBuffer`] erases the element type so
//! algorithm code can move typed buffers around without knowing where they
//! live.

mod backend;

mod blas;

mod buffer;

mod config;

mod context;

mod error;

mod kernel;

mod types;

pub use backend::{
    DeviceQueue, Handle, KernelFactory, LevelZeroContextRef, LevelZeroDeviceRef,
    LevelZeroKernel, LevelZeroKernelRef, LevelZeroModuleRef, MemoryTracker, NativeApi,
    NativeKernelFactory, NativeKind, NativeRef, NativeRuntime, OpenClContextRef, OpenClDeviceRef,
    OpenClKernel, OpenClKernelRef, OpenClProgramRef, Reservation,
};
pub use blas::{AxpyParams, GemmParams, PotrfParams, PotrsParams, SyrkParams, Transpose, UpLo};
pub use buffer::{
    Buffer, BufferVisitor, HostBuffer, HostReadView, HostWriteView, NativeBuffer, ToNative,
    ToUsm, UniversalBuffer, UsmBuffer, UsmKind,
};
pub use config::{AllocationMode, ContextConfig};
pub use context::{
    CpuExecutionContext, CpuKernelFactory, DeviceExecutionContext, ExecutionContext, InfoDevice,
};
pub use error::{Error, ErrorKind, Result, Status};
pub use kernel::{
    AccessMode, ArgumentCategory, ExecutionTarget, HostKernelFn, Kernel, KernelArgument,
    KernelArguments, KernelNDRange, KernelPtr, KernelRange, KernelScheduler, Launch, LocalBuffer,
    WorkGroup, WorkItem, WorkItems,
};
pub use types::{Any, DataType, FloatOp, HostArray, Scalar, TypeId, TypeOp, dispatch, dispatch_float};
