use hetexec::{
    AllocationMode, AxpyParams, Buffer, ContextConfig, CpuExecutionContext, DeviceExecutionContext,
    ErrorKind, ExecutionContext, ExecutionTarget, GemmParams, HostArray, KernelArguments,
    KernelNDRange, KernelRange, PotrfParams, TypeId, UniversalBuffer, UpLo, UsmKind,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn context(allocation: AllocationMode) -> DeviceExecutionContext {
    DeviceExecutionContext::new(ContextConfig {
        allocation,
        memory_limit: Some(1 << 16),
        ..Default::default()
    })
    .unwrap()
}

const MODES: [AllocationMode; 3] = [
    AllocationMode::Native,
    AllocationMode::Usm(UsmKind::Device),
    AllocationMode::Usm(UsmKind::Shared),
];

#[test]
fn test_fill_float_buffer() {
    for mode in MODES {
        let context = context(mode);
        let buffer = context.allocate(TypeId::Float32, 10).unwrap();
        assert_eq!(buffer.type_id(), TypeId::Float32);
        assert_eq!(buffer.len(), 10);

        context.fill(&buffer, 3.0).unwrap();
        let values = buffer.get::<f32>().host_read().unwrap();
        assert!(values.iter().all(|&v| v == 3.0f32));
    }
}

#[test]
fn test_copy_filled_buffer() {
    for mode in MODES {
        let context = context(mode);
        let src = context.allocate(TypeId::Int32, 5).unwrap();
        let dest = context.allocate(TypeId::Int32, 5).unwrap();

        context.fill(&src, 7.0).unwrap();
        context.copy(&dest, 0, &src, 0, 5).unwrap();
        assert_eq!(dest.get::<i32>().to_vec().unwrap(), vec![7; 5]);
    }
}

#[test]
fn test_copy_round_trip_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(7);
    let data: Vec<f64> = (0..64).map(|_| rng.random_range(-100.0..100.0)).collect();
    let context = context(AllocationMode::Native);

    let src = context.allocate(TypeId::Float64, data.len()).unwrap();
    context
        .copy_from_host(&src, 0, HostArray::new(&data), 0, data.len())
        .unwrap();
    let dest = context.allocate(TypeId::Float64, data.len()).unwrap();

    context.copy(&dest, 0, &src, 0, data.len()).unwrap();
    let first = dest.get::<f64>().to_vec().unwrap();
    context.copy(&dest, 0, &src, 0, data.len()).unwrap();
    let second = dest.get::<f64>().to_vec().unwrap();

    assert_eq!(first, data);
    assert_eq!(second, first);
    assert_eq!(src.get::<f64>().to_vec().unwrap(), data);
}

#[test]
fn test_fill_converts_to_element_type() {
    let context = context(AllocationMode::Native);
    for type_id in TypeId::NATIVE {
        let buffer = context.allocate(type_id, 3).unwrap();
        context.fill(&buffer, 42.0).unwrap();

        match type_id {
            TypeId::Float32 => assert_eq!(buffer.get::<f32>().to_vec().unwrap(), vec![42.0; 3]),
            TypeId::Int8 => assert_eq!(buffer.get::<i8>().to_vec().unwrap(), vec![42; 3]),
            TypeId::UInt64 => assert_eq!(buffer.get::<u64>().to_vec().unwrap(), vec![42; 3]),
            _ => assert_eq!(buffer.len(), 3),
        }
    }

    let bytes = context.allocate(TypeId::Int8, 2).unwrap();
    let status = context.fill(&bytes, 1000.0).unwrap_err();
    assert!(status.contains(ErrorKind::IncorrectParameter));
}

#[test]
fn test_copy_between_offsets() {
    let context = context(AllocationMode::Native);
    let src = context.allocate(TypeId::UInt16, 6).unwrap();
    context
        .copy_from_host(&src, 0, HostArray::new(&[1u16, 2, 3, 4, 5, 6]), 0, 6)
        .unwrap();
    let dest = context.allocate(TypeId::UInt16, 4).unwrap();

    context.copy(&dest, 1, &src, 3, 3).unwrap();
    assert_eq!(dest.get::<u16>().to_vec().unwrap(), vec![0, 4, 5, 6]);

    let status = context.copy(&dest, 2, &src, 0, 3).unwrap_err();
    assert!(status.contains(ErrorKind::IncorrectParameter));

    let status = context
        .copy_from_host(&dest, 0, HostArray::new(&[1u32]), 0, 1)
        .unwrap_err();
    assert!(status.contains(ErrorKind::IncorrectParameter));
}

#[test]
fn test_allocation_failures() {
    let context = context(AllocationMode::Native);

    let status = context.allocate(TypeId::Int32, 0).err().unwrap();
    assert!(status.contains(ErrorKind::BackendRuntime));

    let status = context.allocate(TypeId::Float64, 1 << 14).err().unwrap();
    assert!(status.contains(ErrorKind::Allocation));
    assert_eq!(context.queue().memory().current(), 0);

    let status = context.allocate(TypeId::Custom, 4).err().unwrap();
    assert!(status.contains(ErrorKind::IncorrectParameter));
}

#[test]
fn test_memory_returns_on_last_drop() {
    let context = context(AllocationMode::Native);
    let buffer = context.allocate(TypeId::Float32, 1024).unwrap();
    let view = buffer.sub_buffer(512, 256).unwrap();
    assert_eq!(context.queue().memory().current(), 4096);

    drop(buffer);
    assert_eq!(context.queue().memory().current(), 4096);
    drop(view);
    assert_eq!(context.queue().memory().current(), 0);
}

#[test]
fn test_info_device_reports_limits() {
    let context = context(AllocationMode::Native);
    let info = context.info_device();
    assert!(!info.is_cpu);
    assert_eq!(info.global_mem_size, 1 << 16);
    assert_eq!(info.max_work_group_size, 256);
}

#[test]
fn test_context_is_shared_between_threads() {
    let context = context(AllocationMode::Native);
    let buffers: Vec<UniversalBuffer> = (0..4)
        .map(|_| context.allocate(TypeId::Int64, 8).unwrap())
        .collect();

    std::thread::scope(|scope| {
        for (i, buffer) in buffers.iter().enumerate() {
            let context = &context;
            scope.spawn(move || context.fill(buffer, i as f64).unwrap());
        }
    });

    for (i, buffer) in buffers.iter().enumerate() {
        assert_eq!(buffer.get::<i64>().to_vec().unwrap(), vec![i as i64; 8]);
    }
}

#[test]
fn test_cpu_context_does_nothing() {
    let context = CpuExecutionContext::new();
    let a = UniversalBuffer::new(Buffer::from(vec![1.0f64; 4]));
    let b = UniversalBuffer::new(Buffer::from(vec![2.0f64; 4]));
    let not_implemented =
        |result: hetexec::Result<()>| result.err().is_some_and(|s| s.contains(ErrorKind::NotImplemented));

    assert!(not_implemented(context.fill(&a, 5.0)));
    assert!(not_implemented(context.copy(&a, 0, &b, 0, 4)));
    assert!(not_implemented(context.copy_from_host(&a, 0, HostArray::new(&[9.0f64]), 0, 1)));
    assert!(not_implemented(context.gemm(&GemmParams::new(2, 2, 1), &a, &b, &a)));
    assert!(not_implemented(context.axpy(&AxpyParams::new(4, 1.0), &a, &b)));
    assert!(not_implemented(context.potrf(&PotrfParams::new(UpLo::Lower, 2), &a)));
    assert!(not_implemented(context.run(
        &KernelRange::new_1d(4),
        &NoKernel,
        &KernelArguments::new(0)
    )));
    assert!(not_implemented(context.run_nd(
        &KernelNDRange::new(1),
        &NoKernel,
        &KernelArguments::new(0)
    )));
    assert!(context.allocate(TypeId::Float64, 4).is_err());
    assert!(context.kernel_factory().get_kernel("k").is_err());

    assert_eq!(a.get::<f64>().to_vec().unwrap(), vec![1.0; 4]);
    assert_eq!(b.get::<f64>().to_vec().unwrap(), vec![2.0; 4]);
}

#[derive(Debug)]
struct NoKernel;

impl hetexec::Kernel for NoKernel {
    fn name(&self) -> &str {
        "none"
    }

    fn target(&self) -> ExecutionTarget {
        ExecutionTarget::Device
    }

    fn schedule(
        &self,
        _scheduler: &mut dyn hetexec::KernelScheduler,
        _launch: hetexec::Launch<'_>,
        _args: &KernelArguments,
    ) -> hetexec::Result<()> {
        panic!("the stub context must not schedule kernels")
    }
}
