mod cpu;

mod device;

mod info;

pub use cpu::{CpuExecutionContext, CpuKernelFactory};
pub use device::DeviceExecutionContext;
pub use info::InfoDevice;

use crate::backend::KernelFactory;
use crate::blas::{AxpyParams, GemmParams, PotrfParams, PotrsParams, SyrkParams};
use crate::buffer::UniversalBuffer;
use crate::error::Result;
use crate::kernel::{Kernel, KernelArguments, KernelNDRange, KernelRange};
use crate::types::{HostArray, TypeId};

/// Entry point of algorithm code into a device.
///
/// Every operation is blocking: work submitted to the device has completed,
/// and its failures are in the returned status, by the time a call returns.
pub trait ExecutionContext: Send + Sync {
    fn run(&self, range: &KernelRange, kernel: &dyn Kernel, args: &KernelArguments) -> Result<()>;

    fn run_nd(
        &self,
        range: &KernelNDRange,
        kernel: &dyn Kernel,
        args: &KernelArguments,
    ) -> Result<()>;

    fn gemm(
        &self,
        params: &GemmParams,
        a: &UniversalBuffer,
        b: &UniversalBuffer,
        c: &UniversalBuffer,
    ) -> Result<()>;

    fn syrk(&self, params: &SyrkParams, a: &UniversalBuffer, c: &UniversalBuffer) -> Result<()>;

    fn axpy(&self, params: &AxpyParams, x: &UniversalBuffer, y: &UniversalBuffer) -> Result<()>;

    fn potrf(&self, params: &PotrfParams, a: &UniversalBuffer) -> Result<()>;

    fn potrs(&self, params: &PotrsParams, a: &UniversalBuffer, b: &UniversalBuffer) -> Result<()>;

    /// Copies `count` elements. Both buffers must hold the same element type.
    fn copy(
        &self,
        dest: &UniversalBuffer,
        dest_offset: usize,
        src: &UniversalBuffer,
        src_offset: usize,
        count: usize,
    ) -> Result<()>;

    fn copy_from_host(
        &self,
        dest: &UniversalBuffer,
        dest_offset: usize,
        src: HostArray<'_>,
        src_offset: usize,
        count: usize,
    ) -> Result<()>;

    /// Sets every element to `value` converted to the element type.
    fn fill(&self, dest: &UniversalBuffer, value: f64) -> Result<()>;

    fn allocate(&self, type_id: TypeId, len: usize) -> Result<UniversalBuffer>;

    fn kernel_factory(&self) -> &dyn KernelFactory;

    fn info_device(&self) -> InfoDevice;
}
