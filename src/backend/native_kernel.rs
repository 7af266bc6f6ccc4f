use crate::error::Result;
use crate::kernel::{ExecutionTarget, Kernel, KernelArguments, KernelScheduler, Launch};

use super::resource::{LevelZeroKernelRef, OpenClKernelRef};

macro_rules! native_kernel {
    ($(#[$doc:meta])* $name:ident, $native:ty, $schedule:ident) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $name {
            name: String,
            program: String,
            target: ExecutionTarget,
            native: $native,
        }

        impl $name {
            pub(crate) fn new(
                name: &str,
                program: &str,
                target: ExecutionTarget,
                native: $native,
            ) -> Self {
                Self {
                    name: name.to_string(),
                    program: program.to_string(),
                    target,
                    native,
                }
            }

            /// Key of the program the kernel was created from.
            pub fn program(&self) -> &str {
                &self.program
            }

            pub fn native(&self) -> &$native {
                &self.native
            }
        }

        impl Kernel for $name {
            fn name(&self) -> &str {
                &self.name
            }

            fn target(&self) -> ExecutionTarget {
                self.target
            }

            fn schedule(
                &self,
                scheduler: &mut dyn KernelScheduler,
                launch: Launch<'_>,
                args: &KernelArguments,
            ) -> Result<()> {
                scheduler.$schedule(self, launch, args)
            }
        }
    };
}

native_kernel!(
    /// A kernel object created through the OpenCL API.
    OpenClKernel,
    OpenClKernelRef,
    schedule_opencl
);

native_kernel!(
    /// A kernel object created from a Level Zero module.
    LevelZeroKernel,
    LevelZeroKernelRef,
    schedule_level_zero
);
