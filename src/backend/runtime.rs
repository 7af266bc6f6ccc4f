use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use crate::error::Error;
use crate::kernel::HostKernelFn;

use super::compiler;

pub type Handle = u64;

/// The native API whose objects and status codes the runtime emulates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum NativeApi {
    #[default]
    OpenCl,
    LevelZero,
}

impl NativeApi {
    pub fn name(self) -> &'static str {
        match self {
            NativeApi::OpenCl => "OpenCL",
            NativeApi::LevelZero => "Level Zero",
        }
    }

    pub(crate) fn error(self, failure: Failure) -> Error {
        match self {
            NativeApi::OpenCl => Error::from_opencl(failure.opencl_code()),
            NativeApi::LevelZero => Error::from_level_zero(failure.level_zero_code()),
        }
    }
}

/// Failures of native calls, independent of the API that reports them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Failure {
    InvalidObject,
    InvalidContext,
    InvalidProgram,
    InvalidKernel,
    OutOfResources,
    OutOfDeviceMemory,
    InvalidBufferSize,
    BuildFailure,
    InvalidBuildOptions,
    InvalidProgramExecutable,
    InvalidKernelName,
    InvalidWorkGroupSize,
}

impl Failure {
    fn opencl_code(self) -> i32 {
        match self {
            Failure::InvalidObject => -30,
            Failure::InvalidContext => -34,
            Failure::InvalidProgram => -44,
            Failure::InvalidKernel => -48,
            Failure::OutOfResources => -5,
            Failure::OutOfDeviceMemory => -4,
            Failure::InvalidBufferSize => -61,
            Failure::BuildFailure => -11,
            Failure::InvalidBuildOptions => -43,
            Failure::InvalidProgramExecutable => -45,
            Failure::InvalidKernelName => -46,
            Failure::InvalidWorkGroupSize => -54,
        }
    }

    fn level_zero_code(self) -> u32 {
        match self {
            Failure::InvalidObject
            | Failure::InvalidContext
            | Failure::InvalidProgram
            | Failure::InvalidKernel => 0x7800_0005,
            Failure::OutOfResources | Failure::OutOfDeviceMemory => 0x7000_0003,
            Failure::InvalidBufferSize => 0x7800_0008,
            Failure::BuildFailure => 0x7000_0004,
            Failure::InvalidBuildOptions => 0x7800_0004,
            Failure::InvalidProgramExecutable => 0x7800_0018,
            Failure::InvalidKernelName => 0x7800_0011,
            Failure::InvalidWorkGroupSize => 0x7800_0013,
        }
    }
}

enum BuildState {
    NotBuilt,
    Built(HashMap<String, HostKernelFn>),
    Failed(String),
}

enum Object {
    Context,
    Device,
    Program { source: String, build: BuildState },
    Kernel { program: Handle, entry: HostKernelFn },
}

struct Entry {
    refs: u32,
    object: Object,
}

/// In-process stand-in for an OpenCL or Level Zero driver.
///
/// Objects live in a handle table with reference counts, programs are
/// compiled by checking their source and resolving every kernel entry point
/// against the host implementations registered on the runtime.
pub struct NativeRuntime {
    api: NativeApi,
    implementations: RwLock<HashMap<String, HostKernelFn>>,
    objects: Mutex<HashMap<Handle, Entry>>,
    next_handle: AtomicU64,
    builds: AtomicUsize,
}

impl NativeRuntime {
    pub fn new(api: NativeApi) -> Arc<Self> {
        Arc::new(Self {
            api,
            implementations: RwLock::new(HashMap::new()),
            objects: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
            builds: AtomicUsize::new(0),
        })
    }

    pub fn api(&self) -> NativeApi {
        self.api
    }

    /// Makes `entry` the implementation of every kernel named `name` in
    /// programs built from now on.
    pub fn register_kernel(&self, name: impl Into<String>, entry: HostKernelFn) {
        let name = name.into();
        debug!(kernel = %name, "registered host kernel implementation");
        self.implementations.write().insert(name, entry);
    }

    /// Number of program builds attempted so far.
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Acquire)
    }

    /// Number of native objects with a non-zero reference count.
    pub fn live_objects(&self) -> usize {
        self.objects.lock().len()
    }

    pub fn reference_count(&self, handle: Handle) -> Option<u32> {
        self.objects.lock().get(&handle).map(|entry| entry.refs)
    }

    pub(crate) fn error(&self, failure: Failure) -> Error {
        self.api.error(failure)
    }

    pub(crate) fn create_context(&self) -> Handle {
        Self::insert(&mut self.objects.lock(), &self.next_handle, Object::Context)
    }

    pub(crate) fn create_device(&self) -> Handle {
        Self::insert(&mut self.objects.lock(), &self.next_handle, Object::Device)
    }

    pub(crate) fn retain(&self, handle: Handle) -> Result<(), Failure> {
        let mut objects = self.objects.lock();
        let entry = objects.get_mut(&handle).ok_or(Failure::InvalidObject)?;
        entry.refs += 1;
        trace!(handle, refs = entry.refs, "retain");
        Ok(())
    }

    pub(crate) fn release(&self, handle: Handle) -> Result<(), Failure> {
        Self::release_locked(&mut self.objects.lock(), handle)
    }

    pub(crate) fn create_program(&self, context: Handle, source: &str) -> Result<Handle, Failure> {
        let mut objects = self.objects.lock();
        match objects.get(&context) {
            Some(Entry {
                object: Object::Context,
                ..
            }) => {}
            _ => return Err(Failure::InvalidContext),
        }
        let object = Object::Program {
            source: source.to_string(),
            build: BuildState::NotBuilt,
        };
        Ok(Self::insert(&mut objects, &self.next_handle, object))
    }

    pub(crate) fn build_program(&self, program: Handle, options: &str) -> Result<(), Failure> {
        let source = match self.objects.lock().get(&program) {
            Some(Entry {
                object: Object::Program { source, .. },
                ..
            }) => source.clone(),
            _ => return Err(Failure::InvalidProgram),
        };

        if !compiler::valid_options(options) {
            return Err(Failure::InvalidBuildOptions);
        }

        self.builds.fetch_add(1, Ordering::AcqRel);
        let outcome = compiler::compile(&source, &self.implementations.read());

        let mut objects = self.objects.lock();
        let Some(Entry {
            object: Object::Program { build, .. },
            ..
        }) = objects.get_mut(&program)
        else {
            return Err(Failure::InvalidProgram);
        };

        match outcome {
            Ok(kernels) => {
                *build = BuildState::Built(kernels);
                Ok(())
            }
            Err(log) => {
                *build = BuildState::Failed(log);
                Err(Failure::BuildFailure)
            }
        }
    }

    pub(crate) fn build_log(&self, program: Handle) -> String {
        match self.objects.lock().get(&program) {
            Some(Entry {
                object: Object::Program { build, .. },
                ..
            }) => match build {
                BuildState::Failed(log) => log.clone(),
                BuildState::Built(_) | BuildState::NotBuilt => String::new(),
            },
            _ => String::new(),
        }
    }

    /// Creates a kernel object. The kernel holds a reference on its program.
    pub(crate) fn create_kernel(&self, program: Handle, name: &str) -> Result<Handle, Failure> {
        let mut objects = self.objects.lock();
        let entry = match objects.get(&program) {
            Some(Entry {
                object: Object::Program { build, .. },
                ..
            }) => match build {
                BuildState::Built(kernels) => kernels
                    .get(name)
                    .cloned()
                    .ok_or(Failure::InvalidKernelName)?,
                BuildState::NotBuilt | BuildState::Failed(_) => {
                    return Err(Failure::InvalidProgramExecutable);
                }
            },
            _ => return Err(Failure::InvalidProgram),
        };

        if let Some(program_entry) = objects.get_mut(&program) {
            program_entry.refs += 1;
        }
        Ok(Self::insert(
            &mut objects,
            &self.next_handle,
            Object::Kernel { program, entry },
        ))
    }

    pub(crate) fn kernel_entry(&self, kernel: Handle) -> Result<HostKernelFn, Failure> {
        match self.objects.lock().get(&kernel) {
            Some(Entry {
                object: Object::Kernel { entry, .. },
                ..
            }) => Ok(Arc::clone(entry)),
            _ => Err(Failure::InvalidKernel),
        }
    }

    fn insert(objects: &mut HashMap<Handle, Entry>, next: &AtomicU64, object: Object) -> Handle {
        let handle = next.fetch_add(1, Ordering::Relaxed);
        objects.insert(handle, Entry { refs: 1, object });
        trace!(handle, "created native object");
        handle
    }

    fn release_locked(objects: &mut HashMap<Handle, Entry>, handle: Handle) -> Result<(), Failure> {
        let entry = objects.get_mut(&handle).ok_or(Failure::InvalidObject)?;
        entry.refs -= 1;
        trace!(handle, refs = entry.refs, "release");
        if entry.refs > 0 {
            return Ok(());
        }

        if let Some(Entry {
            object: Object::Kernel { program, .. },
            ..
        }) = objects.remove(&handle)
        {
            return Self::release_locked(objects, program);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::kernel::WorkGroup;

    fn noop() -> HostKernelFn {
        Arc::new(|_: &mut WorkGroup<'_>| {})
    }

    #[test]
    fn test_kernel_keeps_program_alive() {
        let runtime = NativeRuntime::new(NativeApi::OpenCl);
        runtime.register_kernel("noop", noop());

        let context = runtime.create_context();
        let program = runtime
            .create_program(context, "__kernel void noop() {}")
            .unwrap();
        runtime.build_program(program, "").unwrap();
        let kernel = runtime.create_kernel(program, "noop").unwrap();
        assert_eq!(runtime.reference_count(program), Some(2));

        runtime.release(program).unwrap();
        assert!(runtime.kernel_entry(kernel).is_ok());
        assert_eq!(runtime.live_objects(), 3);

        runtime.release(kernel).unwrap();
        assert_eq!(runtime.live_objects(), 1);
        assert_eq!(runtime.release(kernel), Err(Failure::InvalidObject));
    }

    #[test]
    fn test_failed_build_keeps_log() {
        let runtime = NativeRuntime::new(NativeApi::LevelZero);
        let context = runtime.create_context();
        let program = runtime
            .create_program(context, "__kernel void missing(global int* a) {}")
            .unwrap();

        assert_eq!(runtime.build_program(program, ""), Err(Failure::BuildFailure));
        assert!(runtime.build_log(program).contains("missing"));
        assert_eq!(
            runtime.create_kernel(program, "missing"),
            Err(Failure::InvalidProgramExecutable)
        );
        assert_eq!(runtime.build_count(), 1);
    }

    #[test]
    fn test_failures_map_to_api_codes() {
        let cl = NativeApi::OpenCl.error(Failure::BuildFailure);
        assert!(matches!(cl, Error::OpenCl { code: -11, .. }));
        assert_eq!(cl.kind(), ErrorKind::Compilation);

        let ze = NativeApi::LevelZero.error(Failure::OutOfDeviceMemory);
        assert!(matches!(ze, Error::LevelZero { code: 0x7000_0003, .. }));
        assert_eq!(ze.kind(), ErrorKind::Allocation);
    }

    #[test]
    fn test_program_needs_context() {
        let runtime = NativeRuntime::new(NativeApi::OpenCl);
        let device = runtime.create_device();
        assert_eq!(
            runtime.create_program(device, "__kernel void k() {}"),
            Err(Failure::InvalidContext)
        );
        assert_eq!(runtime.build_program(device, ""), Err(Failure::InvalidProgram));
    }
}
