use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::warn;

use crate::error::Result;

use super::runtime::{Handle, NativeRuntime};

/// Kind of native object a [`NativeRef`] owns.
pub trait NativeKind {
    const NAME: &'static str;
}

macro_rules! native_kinds {
    ($($kind:ident => $name:literal),* $(,)?) => {
        $(
            #[derive(Debug)]
            pub enum $kind {}

            impl NativeKind for $kind {
                const NAME: &'static str = $name;
            }
        )*
    };
}

native_kinds! {
    ClContext => "cl_context",
    ClDevice => "cl_device_id",
    ClProgram => "cl_program",
    ClKernel => "cl_kernel",
    ZeContext => "ze_context_handle_t",
    ZeDevice => "ze_device_handle_t",
    ZeModule => "ze_module_handle_t",
    ZeKernel => "ze_kernel_handle_t",
}

/// Owns one reference to a native object and releases it on drop.
pub struct NativeRef<K: NativeKind> {
    handle: Handle,
    runtime: Arc<NativeRuntime>,
    _kind: PhantomData<K>,
}

impl<K: NativeKind> NativeRef<K> {
    /// Takes ownership of a reference the caller already holds, as returned
    /// by a create call.
    pub(crate) fn adopt(runtime: &Arc<NativeRuntime>, handle: Handle) -> Self {
        Self {
            handle,
            runtime: Arc::clone(runtime),
            _kind: PhantomData,
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn runtime(&self) -> &Arc<NativeRuntime> {
        &self.runtime
    }

    /// A second owner of the same object. Increments the native count.
    pub fn retain(&self) -> Result<Self> {
        self.runtime
            .retain(self.handle)
            .map_err(|failure| self.runtime.error(failure))?;
        Ok(Self::adopt(&self.runtime, self.handle))
    }
}

impl<K: NativeKind> Drop for NativeRef<K> {
    fn drop(&mut self) {
        if let Err(failure) = self.runtime.release(self.handle) {
            let error = self.runtime.error(failure);
            warn!(kind = K::NAME, handle = self.handle, %error, "failed to release native object");
        }
    }
}

impl<K: NativeKind> fmt::Debug for NativeRef<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:#x})", K::NAME, self.handle)
    }
}

pub type OpenClContextRef = NativeRef<ClContext>;
pub type OpenClDeviceRef = NativeRef<ClDevice>;
pub type OpenClProgramRef = NativeRef<ClProgram>;
pub type OpenClKernelRef = NativeRef<ClKernel>;
pub type LevelZeroContextRef = NativeRef<ZeContext>;
pub type LevelZeroDeviceRef = NativeRef<ZeDevice>;
pub type LevelZeroModuleRef = NativeRef<ZeModule>;
pub type LevelZeroKernelRef = NativeRef<ZeKernel>;
