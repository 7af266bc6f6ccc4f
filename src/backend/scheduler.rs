use tracing::debug;

use crate::error::{Error, Result};
use crate::kernel::binder::{self, BoundArguments, Resolved};
use crate::kernel::{
    HostKernelFn, Kernel, KernelArguments, KernelNDRange, KernelRange, KernelScheduler, Launch,
    NativeRange, WorkGroup,
};

use super::native_kernel::{LevelZeroKernel, OpenClKernel};
use super::queue::DeviceQueue;
use super::resource::{NativeKind, NativeRef};
use super::runtime::Failure;

/// Submits kernels to one device queue and waits for them.
pub(crate) struct QueueScheduler<'q> {
    queue: &'q DeviceQueue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Geometry {
    dimensions: usize,
    global: [usize; 3],
    local: [usize; 3],
    groups: [usize; 3],
    nd: bool,
}

impl Geometry {
    /// A flat launch runs as a single work-group spanning the whole range.
    fn flat(range: &KernelRange) -> Result<Self> {
        let native = NativeRange::from(range);
        let global = native.padded();
        let groups = if checked_total(range)? == 0 { [0; 3] } else { [1; 3] };
        Ok(Self {
            dimensions: native.dimensions(),
            global,
            local: global,
            groups,
            nd: false,
        })
    }

    fn nd(range: &KernelNDRange, queue: &DeviceQueue) -> Result<Self> {
        let (Some(global), Some(local)) = (range.global(), range.local()) else {
            return Err(Error::incorrect_parameter(
                "nd-range launch needs both a global and a local range",
            )
            .into());
        };

        checked_total(global)?;
        let global = NativeRange::from(global).padded();
        let local = NativeRange::from(local).padded();
        let limit = queue.limits().max_work_group_size;
        let divides = global
            .iter()
            .zip(&local)
            .all(|(&g, &l)| l != 0 && g % l == 0);
        if !divides || local.iter().product::<usize>() > limit {
            return Err(queue.runtime().error(Failure::InvalidWorkGroupSize).into());
        }

        let groups = [global[0] / local[0], global[1] / local[1], global[2] / local[2]];
        Ok(Self {
            dimensions: range.dimensions(),
            global,
            local,
            groups,
            nd: true,
        })
    }
}

fn checked_total(range: &KernelRange) -> Result<usize> {
    range.checked_total().ok_or_else(|| {
        Error::incorrect_parameter(format!(
            "range {:?} has more work items than fit in usize",
            range.extents()
        ))
        .into()
    })
}

impl<'q> QueueScheduler<'q> {
    pub(crate) fn new(queue: &'q DeviceQueue) -> Self {
        Self { queue }
    }

    fn entry<K: NativeKind>(&self, native: &NativeRef<K>) -> Result<HostKernelFn> {
        let runtime = self.queue.runtime();
        runtime
            .kernel_entry(native.handle())
            .map_err(|failure| runtime.error(failure).into())
    }

    fn launch(
        &self,
        name: &str,
        entry: HostKernelFn,
        launch: Launch<'_>,
        args: &KernelArguments,
    ) -> Result<()> {
        let geometry = match launch {
            Launch::Range(range) => Geometry::flat(range)?,
            Launch::NdRange(range) => Geometry::nd(range, self.queue)?,
        };

        let resolved = binder::resolve(args, self.queue, geometry.nd)?;
        let local_bytes = resolved
            .iter()
            .try_fold(0usize, |total, arg| total.checked_add(arg.local_bytes()?));
        if local_bytes.is_none_or(|bytes| bytes > self.queue.limits().local_memory_size) {
            return Err(self.queue.runtime().error(Failure::OutOfResources).into());
        }

        debug!(
            kernel = name,
            global = ?geometry.global,
            local = ?geometry.local,
            "launch"
        );

        self.queue.submit(name, || {
            let bound = BoundArguments::bind(&resolved);
            let [gx, gy, gz] = geometry.groups;
            for z in 0..gz {
                for y in 0..gy {
                    for x in 0..gx {
                        let mut group = WorkGroup::new(
                            bound.args(),
                            geometry.dimensions,
                            geometry.global,
                            geometry.local,
                            [x, y, z],
                        );
                        entry(&mut group);
                    }
                }
            }
            Ok(())
        })
    }
}

impl KernelScheduler for QueueScheduler<'_> {
    fn schedule_opencl(
        &mut self,
        kernel: &OpenClKernel,
        launch: Launch<'_>,
        args: &KernelArguments,
    ) -> Result<()> {
        let entry = self.entry(kernel.native())?;
        self.launch(kernel.name(), entry, launch, args)
    }

    fn schedule_level_zero(
        &mut self,
        kernel: &LevelZeroKernel,
        launch: Launch<'_>,
        args: &KernelArguments,
    ) -> Result<()> {
        let entry = self.entry(kernel.native())?;
        self.launch(kernel.name(), entry, launch, args)
    }
}
