use crate::backend::KernelFactory;
use crate::blas::{AxpyParams, GemmParams, PotrfParams, PotrsParams, SyrkParams};
use crate::buffer::UniversalBuffer;
use crate::error::{Error, Result};
use crate::kernel::{ExecutionTarget, Kernel, KernelArguments, KernelNDRange, KernelPtr, KernelRange};
use crate::types::{HostArray, TypeId};

use super::{ExecutionContext, InfoDevice};

fn unimplemented<T>(method: &str) -> Result<T> {
    Err(Error::not_implemented(method).into())
}

/// Kernel factory of a context without a device.
#[derive(Debug, Default)]
pub struct CpuKernelFactory;

impl KernelFactory for CpuKernelFactory {
    fn build(&self, _target: ExecutionTarget, _key: &str, _source: &str, _options: &str) -> Result<()> {
        unimplemented("KernelFactory::build")
    }

    fn get_kernel(&self, _name: &str) -> Result<KernelPtr> {
        unimplemented("KernelFactory::get_kernel")
    }

    fn cached_programs(&self) -> usize {
        0
    }

    fn cached_kernels(&self) -> usize {
        0
    }

    fn is_program_cached(&self, _key: &str) -> bool {
        false
    }
}

/// Context for hosts without a supported device. Every operation reports
/// `MethodNotImplemented` and leaves its buffers untouched.
#[derive(Debug, Default)]
pub struct CpuExecutionContext {
    factory: CpuKernelFactory,
}

impl CpuExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExecutionContext for CpuExecutionContext {
    fn run(&self, _range: &KernelRange, _kernel: &dyn Kernel, _args: &KernelArguments) -> Result<()> {
        unimplemented("ExecutionContext::run")
    }

    fn run_nd(
        &self,
        _range: &KernelNDRange,
        _kernel: &dyn Kernel,
        _args: &KernelArguments,
    ) -> Result<()> {
        unimplemented("ExecutionContext::run_nd")
    }

    fn gemm(
        &self,
        _params: &GemmParams,
        _a: &UniversalBuffer,
        _b: &UniversalBuffer,
        _c: &UniversalBuffer,
    ) -> Result<()> {
        unimplemented("ExecutionContext::gemm")
    }

    fn syrk(&self, _params: &SyrkParams, _a: &UniversalBuffer, _c: &UniversalBuffer) -> Result<()> {
        unimplemented("ExecutionContext::syrk")
    }

    fn axpy(&self, _params: &AxpyParams, _x: &UniversalBuffer, _y: &UniversalBuffer) -> Result<()> {
        unimplemented("ExecutionContext::axpy")
    }

    fn potrf(&self, _params: &PotrfParams, _a: &UniversalBuffer) -> Result<()> {
        unimplemented("ExecutionContext::potrf")
    }

    fn potrs(&self, _params: &PotrsParams, _a: &UniversalBuffer, _b: &UniversalBuffer) -> Result<()> {
        unimplemented("ExecutionContext::potrs")
    }

    fn copy(
        &self,
        _dest: &UniversalBuffer,
        _dest_offset: usize,
        _src: &UniversalBuffer,
        _src_offset: usize,
        _count: usize,
    ) -> Result<()> {
        unimplemented("ExecutionContext::copy")
    }

    fn copy_from_host(
        &self,
        _dest: &UniversalBuffer,
        _dest_offset: usize,
        _src: HostArray<'_>,
        _src_offset: usize,
        _count: usize,
    ) -> Result<()> {
        unimplemented("ExecutionContext::copy_from_host")
    }

    fn fill(&self, _dest: &UniversalBuffer, _value: f64) -> Result<()> {
        unimplemented("ExecutionContext::fill")
    }

    fn allocate(&self, _type_id: TypeId, _len: usize) -> Result<UniversalBuffer> {
        unimplemented("ExecutionContext::allocate")
    }

    fn kernel_factory(&self) -> &dyn KernelFactory {
        &self.factory
    }

    fn info_device(&self) -> InfoDevice {
        InfoDevice::host()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Buffer;
    use crate::error::ErrorKind;

    fn not_implemented(result: Result<()>) -> bool {
        result
            .err()
            .is_some_and(|status| status.contains(ErrorKind::NotImplemented))
    }

    #[test]
    fn test_every_operation_is_rejected() {
        let context = CpuExecutionContext::new();
        let buffer = UniversalBuffer::new(Buffer::from(vec![1.0f32; 4]));

        assert!(not_implemented(context.fill(&buffer, 2.0)));
        assert!(not_implemented(context.copy(&buffer, 0, &buffer, 2, 2)));
        assert!(not_implemented(context.copy_from_host(
            &buffer,
            0,
            HostArray::new(&[5.0f32]),
            0,
            1
        )));
        assert!(not_implemented(context.axpy(&AxpyParams::new(4, 1.0), &buffer, &buffer)));
        assert!(context.allocate(TypeId::Float32, 4).is_err());
        assert!(
            context
                .kernel_factory()
                .build(ExecutionTarget::Device, "k", "__kernel void k() {}", "")
                .is_err()
        );

        assert_eq!(buffer.get::<f32>().to_vec().unwrap(), vec![1.0; 4]);
        assert!(context.info_device().is_cpu);
    }
}
