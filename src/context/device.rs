use std::sync::Arc;

use num_traits::{Float, NumCast};
use tracing::info;

use crate::backend::memory_tracker::MemoryTracker;
use crate::backend::queue::{DeviceQueue, QueueLimits};
use crate::backend::scheduler::QueueScheduler;
use crate::backend::{KernelFactory, NativeKernelFactory, NativeRuntime};
use crate::blas::{AxpyParams, GemmParams, PotrfParams, PotrsParams, SyrkParams, reference};
use crate::buffer::{Buffer, UniversalBuffer};
use crate::config::{AllocationMode, ContextConfig};
use crate::error::{Error, Result};
use crate::kernel::binder::device_region;
use crate::kernel::{
    ExecutionTarget, Kernel, KernelArguments, KernelNDRange, KernelRange, Launch, WorkGroup,
};
use crate::types::{DataType, FloatOp, HostArray, TypeId, TypeOp, dispatch, dispatch_float};

use super::{ExecutionContext, InfoDevice};

/// Execution context backed by a device queue of the reference native
/// runtime.
pub struct DeviceExecutionContext {
    config: ContextConfig,
    runtime: Arc<NativeRuntime>,
    queue: Arc<DeviceQueue>,
    factory: NativeKernelFactory,
    info: InfoDevice,
}

impl DeviceExecutionContext {
    pub fn new(config: ContextConfig) -> Result<Self> {
        let config = config.build()?;
        let runtime = NativeRuntime::new(config.native_api);
        let memory = Arc::new(MemoryTracker::new(config.resolved_memory_limit()));
        let queue = DeviceQueue::new(
            Arc::clone(&runtime),
            memory,
            QueueLimits {
                max_work_group_size: config.max_work_group_size,
                local_memory_size: config.local_memory_size,
            },
        );
        let factory = NativeKernelFactory::new(Arc::clone(&runtime));
        let info = InfoDevice::reference(&config);

        info!(
            device = %config.device_name,
            api = config.native_api.name(),
            memory_limit = info.global_mem_size,
            allocation = ?config.allocation,
            "execution context created"
        );

        Ok(Self {
            config,
            runtime,
            queue,
            factory,
            info,
        })
    }

    /// Registers the host implementation of the device kernel `name`.
    /// Programs declaring the kernel must be built after registration.
    pub fn register_kernel<F>(&self, name: &str, kernel: F)
    where
        F: Fn(&mut WorkGroup<'_>) + Send + Sync + 'static,
    {
        self.runtime.register_kernel(name, Arc::new(kernel));
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn runtime(&self) -> &Arc<NativeRuntime> {
        &self.runtime
    }

    pub fn queue(&self) -> &Arc<DeviceQueue> {
        &self.queue
    }

    pub fn native_factory(&self) -> &NativeKernelFactory {
        &self.factory
    }

    fn launch(&self, kernel: &dyn Kernel, launch: Launch<'_>, args: &KernelArguments) -> Result<()> {
        if kernel.target() != ExecutionTarget::Device {
            return Err(Error::incorrect_parameter(format!(
                "kernel '{}' targets {:?}, not the device",
                kernel.name(),
                kernel.target()
            ))
            .into());
        }
        kernel.schedule(&mut QueueScheduler::new(&self.queue), launch, args)
    }
}

fn check_range(what: &str, offset: usize, count: usize, len: usize) -> Result<()> {
    match offset.checked_add(count) {
        Some(end) if end <= len => Ok(()),
        _ => Err(Error::incorrect_parameter(format!(
            "{} range {}..{} exceeds its {} elements",
            what,
            offset,
            offset.saturating_add(count),
            len
        ))
        .into()),
    }
}

/// The element type shared by all operands of `op`.
fn common_type(op: &str, buffers: &[&UniversalBuffer]) -> Result<TypeId> {
    let type_id = buffers.first().map_or(TypeId::Custom, |b| b.type_id());
    if let Some(other) = buffers.iter().find(|b| b.type_id() != type_id) {
        return Err(Error::incorrect_parameter(format!(
            "{}: operands mix {} and {} elements",
            op,
            type_id,
            other.type_id()
        ))
        .into());
    }
    Ok(type_id)
}

struct Allocate<'a> {
    queue: &'a Arc<DeviceQueue>,
    mode: AllocationMode,
    len: usize,
}

impl TypeOp for Allocate<'_> {
    type Output = Result<UniversalBuffer>;

    fn call<T: DataType>(self) -> Self::Output {
        let buffer: Buffer<T> = match self.mode {
            AllocationMode::Native => self.queue.allocate_native::<T>(self.len)?.into(),
            AllocationMode::Usm(kind) => self.queue.allocate_usm::<T>(self.len, kind)?.into(),
        };
        Ok(UniversalBuffer::new(buffer))
    }
}

struct CopyOp<'a> {
    queue: &'a DeviceQueue,
    dest: &'a UniversalBuffer,
    dest_offset: usize,
    src: &'a UniversalBuffer,
    src_offset: usize,
    count: usize,
}

impl TypeOp for CopyOp<'_> {
    type Output = Result<()>;

    fn call<T: DataType>(self) -> Self::Output {
        let dest = device_region(self.dest.get::<T>(), self.queue)?;
        let src = device_region(self.src.get::<T>(), self.queue)?;
        let count = self.count;

        if dest.shares_storage(&src) {
            let from = src.offset() + self.src_offset;
            let to = dest.offset() + self.dest_offset;
            self.queue.submit("copy", || {
                dest.with_block_mut(|block, _| block.copy_within(from..from + count, to));
                Ok(())
            })
        } else {
            let (src_offset, dest_offset) = (self.src_offset, self.dest_offset);
            self.queue.submit("copy", || {
                let src = src.read();
                dest.write()[dest_offset..dest_offset + count]
                    .copy_from_slice(&src[src_offset..src_offset + count]);
                Ok(())
            })
        }
    }
}

struct CopyFromHost<'a, 'h> {
    queue: &'a DeviceQueue,
    dest: &'a UniversalBuffer,
    dest_offset: usize,
    src: HostArray<'h>,
    src_offset: usize,
    count: usize,
}

impl TypeOp for CopyFromHost<'_, '_> {
    type Output = Result<()>;

    fn call<T: DataType>(self) -> Self::Output {
        let dest = device_region(self.dest.get::<T>(), self.queue)?;
        let src = self.src.as_slice::<T>().ok_or(Error::Unknown)?;
        let (src_offset, dest_offset, count) = (self.src_offset, self.dest_offset, self.count);

        self.queue.submit("copy_from_host", || {
            dest.write()[dest_offset..dest_offset + count]
                .copy_from_slice(&src[src_offset..src_offset + count]);
            Ok(())
        })
    }
}

struct Fill<'a> {
    queue: &'a DeviceQueue,
    dest: &'a UniversalBuffer,
    value: f64,
}

impl TypeOp for Fill<'_> {
    type Output = Result<()>;

    fn call<T: DataType>(self) -> Self::Output {
        let value: T = NumCast::from(self.value).ok_or_else(|| {
            Error::incorrect_parameter(format!(
                "fill value {} is not representable as {}",
                self.value,
                T::TYPE_ID
            ))
        })?;
        let dest = device_region(self.dest.get::<T>(), self.queue)?;

        self.queue.submit("fill", || {
            dest.write().fill(value);
            Ok(())
        })
    }
}

struct Gemm<'a> {
    queue: &'a DeviceQueue,
    params: &'a GemmParams,
    a: &'a UniversalBuffer,
    b: &'a UniversalBuffer,
    c: &'a UniversalBuffer,
}

impl FloatOp for Gemm<'_> {
    type Output = Result<()>;

    fn call<T: DataType + Float>(self) -> Self::Output {
        let a = device_region(self.a.get::<T>(), self.queue)?;
        let b = device_region(self.b.get::<T>(), self.queue)?;
        let c = device_region(self.c.get::<T>(), self.queue)?;
        self.params.validate(a.len(), b.len(), c.len())?;

        self.queue.submit("gemm", || {
            let (a, b) = (a.to_vec(), b.to_vec());
            reference::gemm(self.params, &a, &b, &mut c.write());
            Ok(())
        })
    }
}

struct Syrk<'a> {
    queue: &'a DeviceQueue,
    params: &'a SyrkParams,
    a: &'a UniversalBuffer,
    c: &'a UniversalBuffer,
}

impl FloatOp for Syrk<'_> {
    type Output = Result<()>;

    fn call<T: DataType + Float>(self) -> Self::Output {
        let a = device_region(self.a.get::<T>(), self.queue)?;
        let c = device_region(self.c.get::<T>(), self.queue)?;
        self.params.validate(a.len(), c.len())?;

        self.queue.submit("syrk", || {
            let a = a.to_vec();
            reference::syrk(self.params, &a, &mut c.write());
            Ok(())
        })
    }
}

struct Axpy<'a> {
    queue: &'a DeviceQueue,
    params: &'a AxpyParams,
    x: &'a UniversalBuffer,
    y: &'a UniversalBuffer,
}

impl FloatOp for Axpy<'_> {
    type Output = Result<()>;

    fn call<T: DataType + Float>(self) -> Self::Output {
        let x = device_region(self.x.get::<T>(), self.queue)?;
        let y = device_region(self.y.get::<T>(), self.queue)?;
        self.params.validate(x.len(), y.len())?;

        self.queue.submit("axpy", || {
            let x = x.to_vec();
            reference::axpy(self.params, &x, &mut y.write());
            Ok(())
        })
    }
}

struct Potrf<'a> {
    queue: &'a DeviceQueue,
    params: &'a PotrfParams,
    a: &'a UniversalBuffer,
}

impl FloatOp for Potrf<'_> {
    type Output = Result<()>;

    fn call<T: DataType + Float>(self) -> Self::Output {
        let a = device_region(self.a.get::<T>(), self.queue)?;
        self.params.validate(a.len())?;

        self.queue
            .submit("potrf", || reference::potrf(self.params, &mut a.write()))
    }
}

struct Potrs<'a> {
    queue: &'a DeviceQueue,
    params: &'a PotrsParams,
    a: &'a UniversalBuffer,
    b: &'a UniversalBuffer,
}

impl FloatOp for Potrs<'_> {
    type Output = Result<()>;

    fn call<T: DataType + Float>(self) -> Self::Output {
        let a = device_region(self.a.get::<T>(), self.queue)?;
        let b = device_region(self.b.get::<T>(), self.queue)?;
        self.params.validate(a.len(), b.len())?;

        self.queue.submit("potrs", || {
            let a = a.to_vec();
            reference::potrs(self.params, &a, &mut b.write());
            Ok(())
        })
    }
}

impl ExecutionContext for DeviceExecutionContext {
    fn run(&self, range: &KernelRange, kernel: &dyn Kernel, args: &KernelArguments) -> Result<()> {
        self.launch(kernel, Launch::Range(range), args)
    }

    fn run_nd(
        &self,
        range: &KernelNDRange,
        kernel: &dyn Kernel,
        args: &KernelArguments,
    ) -> Result<()> {
        self.launch(kernel, Launch::NdRange(range), args)
    }

    fn gemm(
        &self,
        params: &GemmParams,
        a: &UniversalBuffer,
        b: &UniversalBuffer,
        c: &UniversalBuffer,
    ) -> Result<()> {
        let type_id = common_type("gemm", &[a, b, c])?;
        dispatch_float(
            type_id,
            Gemm {
                queue: &self.queue,
                params,
                a,
                b,
                c,
            },
        )?
    }

    fn syrk(&self, params: &SyrkParams, a: &UniversalBuffer, c: &UniversalBuffer) -> Result<()> {
        let type_id = common_type("syrk", &[a, c])?;
        dispatch_float(
            type_id,
            Syrk {
                queue: &self.queue,
                params,
                a,
                c,
            },
        )?
    }

    fn axpy(&self, params: &AxpyParams, x: &UniversalBuffer, y: &UniversalBuffer) -> Result<()> {
        let type_id = common_type("axpy", &[x, y])?;
        dispatch_float(
            type_id,
            Axpy {
                queue: &self.queue,
                params,
                x,
                y,
            },
        )?
    }

    fn potrf(&self, params: &PotrfParams, a: &UniversalBuffer) -> Result<()> {
        dispatch_float(
            a.type_id(),
            Potrf {
                queue: &self.queue,
                params,
                a,
            },
        )?
    }

    fn potrs(&self, params: &PotrsParams, a: &UniversalBuffer, b: &UniversalBuffer) -> Result<()> {
        let type_id = common_type("potrs", &[a, b])?;
        dispatch_float(
            type_id,
            Potrs {
                queue: &self.queue,
                params,
                a,
                b,
            },
        )?
    }

    fn copy(
        &self,
        dest: &UniversalBuffer,
        dest_offset: usize,
        src: &UniversalBuffer,
        src_offset: usize,
        count: usize,
    ) -> Result<()> {
        let type_id = common_type("copy", &[dest, src])?;
        check_range("copy destination", dest_offset, count, dest.len())?;
        check_range("copy source", src_offset, count, src.len())?;
        if count == 0 {
            return Ok(());
        }

        dispatch(
            type_id,
            CopyOp {
                queue: &self.queue,
                dest,
                dest_offset,
                src,
                src_offset,
                count,
            },
        )?
    }

    fn copy_from_host(
        &self,
        dest: &UniversalBuffer,
        dest_offset: usize,
        src: HostArray<'_>,
        src_offset: usize,
        count: usize,
    ) -> Result<()> {
        if src.type_id() != dest.type_id() {
            return Err(Error::incorrect_parameter(format!(
                "copy_from_host: host array of {} into a buffer of {}",
                src.type_id(),
                dest.type_id()
            ))
            .into());
        }
        check_range("copy destination", dest_offset, count, dest.len())?;
        check_range("host source", src_offset, count, src.len())?;
        if count == 0 {
            return Ok(());
        }

        dispatch(
            dest.type_id(),
            CopyFromHost {
                queue: &self.queue,
                dest,
                dest_offset,
                src,
                src_offset,
                count,
            },
        )?
    }

    fn fill(&self, dest: &UniversalBuffer, value: f64) -> Result<()> {
        dispatch(
            dest.type_id(),
            Fill {
                queue: &self.queue,
                dest,
                value,
            },
        )?
    }

    fn allocate(&self, type_id: TypeId, len: usize) -> Result<UniversalBuffer> {
        dispatch(
            type_id,
            Allocate {
                queue: &self.queue,
                mode: self.config.allocation,
                len,
            },
        )?
    }

    fn kernel_factory(&self) -> &dyn KernelFactory {
        &self.factory
    }

    fn info_device(&self) -> InfoDevice {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::UsmKind;
    use crate::error::ErrorKind;

    fn context() -> DeviceExecutionContext {
        DeviceExecutionContext::new(ContextConfig {
            memory_limit: Some(1 << 20),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_copy_within_one_allocation() {
        let context = context();
        let buffer = context.allocate(TypeId::Int32, 6).unwrap();
        context
            .copy_from_host(&buffer, 0, HostArray::new(&[1, 2, 3, 4, 5, 6]), 0, 6)
            .unwrap();

        let tail = buffer.sub_buffer(2, 4).unwrap();
        context.copy(&tail, 0, &buffer, 0, 4).unwrap();
        assert_eq!(buffer.get::<i32>().to_vec().unwrap(), vec![1, 2, 1, 2, 3, 4]);
    }

    #[test]
    fn test_copy_validates_operands() {
        let context = context();
        let ints = context.allocate(TypeId::Int32, 4).unwrap();
        let floats = context.allocate(TypeId::Float32, 4).unwrap();

        let status = context.copy(&ints, 0, &floats, 0, 4).unwrap_err();
        assert!(status.contains(ErrorKind::IncorrectParameter));
        assert!(context.copy(&ints, 2, &ints, 0, 3).is_err());
        assert!(context.copy(&ints, 0, &ints, 0, 0).is_ok());
    }

    #[test]
    fn test_fill_converts_value() {
        let context = context();
        let bytes = context.allocate(TypeId::UInt8, 3).unwrap();
        context.fill(&bytes, 200.0).unwrap();
        assert_eq!(bytes.get::<u8>().to_vec().unwrap(), vec![200; 3]);

        let status = context.fill(&bytes, -1.0).unwrap_err();
        assert!(status.contains(ErrorKind::IncorrectParameter));
        assert_eq!(bytes.get::<u8>().to_vec().unwrap(), vec![200; 3]);
    }

    #[test]
    fn test_usm_allocation_mode() {
        let context = DeviceExecutionContext::new(ContextConfig {
            memory_limit: Some(1 << 20),
            allocation: AllocationMode::Usm(UsmKind::Device),
            ..Default::default()
        })
        .unwrap();

        let buffer = context.allocate(TypeId::Float64, 2).unwrap();
        assert!(matches!(buffer.get::<f64>(), Buffer::Usm(usm) if usm.kind() == UsmKind::Device));
        context.fill(&buffer, 0.25).unwrap();
        assert_eq!(buffer.get::<f64>().to_vec().unwrap(), vec![0.25; 2]);
    }

    #[test]
    fn test_foreign_device_memory_is_rejected() {
        let first = context();
        let second = context();
        let buffer = first.allocate(TypeId::Int64, 2).unwrap().get::<i64>().to_usm().unwrap();
        let buffer = UniversalBuffer::new(Buffer::Usm(buffer));

        let status = second.fill(&buffer, 1.0).unwrap_err();
        assert!(status.contains(ErrorKind::Access));
        assert!(first.fill(&buffer, 1.0).is_ok());
    }

    #[test]
    fn test_blas_requires_float_operands() {
        let context = context();
        let ints = context.allocate(TypeId::Int32, 4).unwrap();
        let status = context
            .axpy(&AxpyParams::new(4, 1.0), &ints, &ints)
            .unwrap_err();
        assert!(status.contains(ErrorKind::IncorrectParameter));
    }
}
