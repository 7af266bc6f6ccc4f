use std::fmt::Debug;
use std::sync::Arc;

use crate::backend::{LevelZeroKernel, OpenClKernel};
use crate::error::Result;

use super::argument::KernelArguments;
use super::range::{KernelNDRange, KernelRange};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExecutionTarget {
    Host,
    Device,
}

/// The iteration space of one kernel launch.
#[derive(Clone, Copy, Debug)]
pub enum Launch<'a> {
    Range(&'a KernelRange),
    NdRange(&'a KernelNDRange),
}

/// A compiled kernel.
///
/// Launching is a double dispatch: the context hands its scheduler to the
/// kernel, and the kernel calls back the scheduler entry point for its own
/// concrete type.
pub trait Kernel: Debug + Send + Sync {
    fn name(&self) -> &str;

    fn target(&self) -> ExecutionTarget;

    fn schedule(
        &self,
        scheduler: &mut dyn KernelScheduler,
        launch: Launch<'_>,
        args: &KernelArguments,
    ) -> Result<()>;
}

pub type KernelPtr = Arc<dyn Kernel>;

/// Backend side of a launch: binds the arguments and submits the work.
pub trait KernelScheduler {
    fn schedule_opencl(
        &mut self,
        kernel: &OpenClKernel,
        launch: Launch<'_>,
        args: &KernelArguments,
    ) -> Result<()>;

    fn schedule_level_zero(
        &mut self,
        kernel: &LevelZeroKernel,
        launch: Launch<'_>,
        args: &KernelArguments,
    ) -> Result<()>;
}
