use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result, Status};
use crate::kernel::{ExecutionTarget, KernelPtr};

use super::native_kernel::{LevelZeroKernel, OpenClKernel};
use super::resource::{
    LevelZeroContextRef, LevelZeroDeviceRef, LevelZeroKernelRef, LevelZeroModuleRef,
    OpenClContextRef, OpenClDeviceRef, OpenClKernelRef, OpenClProgramRef,
};
use super::runtime::{Failure, Handle, NativeApi, NativeRuntime};

/// Builds programs and hands out their kernels.
pub trait KernelFactory: Send + Sync {
    /// Builds `source` under `key` and makes it the current program. A key
    /// that is already cached only becomes current again.
    fn build(&self, target: ExecutionTarget, key: &str, source: &str, options: &str) -> Result<()>;

    /// A kernel of the current program, created once and then served from
    /// the cache.
    fn get_kernel(&self, name: &str) -> Result<KernelPtr>;

    fn cached_programs(&self) -> usize;

    fn cached_kernels(&self) -> usize;

    fn is_program_cached(&self, key: &str) -> bool;
}

enum NativeContext {
    OpenCl {
        context: OpenClContextRef,
        _device: OpenClDeviceRef,
    },
    LevelZero {
        context: LevelZeroContextRef,
        _device: LevelZeroDeviceRef,
    },
}

impl NativeContext {
    fn create(runtime: &Arc<NativeRuntime>) -> Self {
        let context = runtime.create_context();
        let device = runtime.create_device();
        match runtime.api() {
            NativeApi::OpenCl => NativeContext::OpenCl {
                context: OpenClContextRef::adopt(runtime, context),
                _device: OpenClDeviceRef::adopt(runtime, device),
            },
            NativeApi::LevelZero => NativeContext::LevelZero {
                context: LevelZeroContextRef::adopt(runtime, context),
                _device: LevelZeroDeviceRef::adopt(runtime, device),
            },
        }
    }

    fn handle(&self) -> Handle {
        match self {
            NativeContext::OpenCl { context, .. } => context.handle(),
            NativeContext::LevelZero { context, .. } => context.handle(),
        }
    }
}

enum NativeProgram {
    OpenCl(OpenClProgramRef),
    LevelZero(LevelZeroModuleRef),
}

impl NativeProgram {
    fn handle(&self) -> Handle {
        match self {
            NativeProgram::OpenCl(program) => program.handle(),
            NativeProgram::LevelZero(module) => module.handle(),
        }
    }
}

struct CachedProgram {
    target: ExecutionTarget,
    program: NativeProgram,
}

#[derive(Default)]
struct FactoryState {
    programs: HashMap<String, CachedProgram>,
    kernels: HashMap<String, KernelPtr>,
    current: Option<String>,
}

/// Kernel factory backed by the native runtime. Programs and kernels are
/// cached for the lifetime of the factory.
pub struct NativeKernelFactory {
    runtime: Arc<NativeRuntime>,
    context: NativeContext,
    state: Mutex<FactoryState>,
}

impl NativeKernelFactory {
    pub fn new(runtime: Arc<NativeRuntime>) -> Self {
        let context = NativeContext::create(&runtime);
        Self {
            runtime,
            context,
            state: Mutex::new(FactoryState::default()),
        }
    }

    pub fn runtime(&self) -> &Arc<NativeRuntime> {
        &self.runtime
    }

    /// Key of the program `get_kernel` currently reads from.
    pub fn current_program(&self) -> Option<String> {
        self.state.lock().current.clone()
    }

    fn compile(&self, key: &str, source: &str, options: &str) -> Result<NativeProgram> {
        let runtime = &self.runtime;
        let handle = runtime
            .create_program(self.context.handle(), source)
            .map_err(|failure| runtime.error(failure))?;

        // Wrapped before building so a failed build releases it.
        let program = match runtime.api() {
            NativeApi::OpenCl => NativeProgram::OpenCl(OpenClProgramRef::adopt(runtime, handle)),
            NativeApi::LevelZero => {
                NativeProgram::LevelZero(LevelZeroModuleRef::adopt(runtime, handle))
            }
        };

        match runtime.build_program(handle, options) {
            Ok(()) => Ok(program),
            Err(failure @ Failure::BuildFailure) => {
                let mut status = Status::from(runtime.error(failure));
                status |= Error::ProgramBuildFailed {
                    program: key.to_string(),
                    log: runtime.build_log(handle),
                };
                Err(status)
            }
            Err(failure) => Err(runtime.error(failure).into()),
        }
    }
}

impl KernelFactory for NativeKernelFactory {
    fn build(&self, target: ExecutionTarget, key: &str, source: &str, options: &str) -> Result<()> {
        let mut state = self.state.lock();
        if state.programs.contains_key(key) {
            debug!(program = key, "program cache hit");
            state.current = Some(key.to_string());
            return Ok(());
        }

        debug!(program = key, "program cache miss, building");
        let program = self.compile(key, source, options)?;
        info!(program = key, api = self.runtime.api().name(), "program built");

        state
            .programs
            .insert(key.to_string(), CachedProgram { target, program });
        state.current = Some(key.to_string());
        Ok(())
    }

    fn get_kernel(&self, name: &str) -> Result<KernelPtr> {
        let state = &mut *self.state.lock();
        let key = state.current.clone().ok_or_else(|| {
            Error::incorrect_parameter(format!("no program is built to get kernel '{}' from", name))
        })?;

        let cache_key = format!("{}.{}", key, name);
        if let Some(kernel) = state.kernels.get(&cache_key) {
            debug!(kernel = %cache_key, "kernel cache hit");
            return Ok(Arc::clone(kernel));
        }

        let cached = state.programs.get(&key).ok_or(Error::Unknown)?;
        let runtime = &self.runtime;
        let handle = runtime
            .create_kernel(cached.program.handle(), name)
            .map_err(|failure| runtime.error(failure))?;

        let kernel: KernelPtr = match cached.program {
            NativeProgram::OpenCl(_) => Arc::new(OpenClKernel::new(
                name,
                &key,
                cached.target,
                OpenClKernelRef::adopt(runtime, handle),
            )),
            NativeProgram::LevelZero(_) => Arc::new(LevelZeroKernel::new(
                name,
                &key,
                cached.target,
                LevelZeroKernelRef::adopt(runtime, handle),
            )),
        };

        debug!(kernel = %cache_key, "kernel cache miss, created");
        state.kernels.insert(cache_key, Arc::clone(&kernel));
        Ok(kernel)
    }

    fn cached_programs(&self) -> usize {
        self.state.lock().programs.len()
    }

    fn cached_kernels(&self) -> usize {
        self.state.lock().kernels.len()
    }

    fn is_program_cached(&self, key: &str) -> bool {
        self.state.lock().programs.contains_key(key)
    }
}
