use std::ptr;

use vulkanalia::{
    Entry,
    loader::{LIBRARY, LibloadingLoader},
    vk::{self, InstanceV1_0},
};

use crate::config::ContextConfig;
use crate::error::{Error, Result};

/// Capabilities of the device behind an execution context.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InfoDevice {
    pub name: String,
    pub is_cpu: bool,
    pub max_work_group_size: usize,
    pub max_mem_alloc_size: u64,
    pub global_mem_size: u64,
    pub local_mem_size: usize,
    pub compute_units: u32,
}

impl InfoDevice {
    /// The zeroed record of a context without a device.
    pub fn host() -> Self {
        Self {
            is_cpu: true,
            ..Default::default()
        }
    }

    pub(crate) fn reference(config: &ContextConfig) -> Self {
        let global_mem_size = config.resolved_memory_limit();
        Self {
            name: config.device_name.clone(),
            is_cpu: false,
            max_work_group_size: config.max_work_group_size,
            max_mem_alloc_size: global_mem_size,
            global_mem_size,
            local_mem_size: config.local_memory_size,
            compute_units: sys_info::cpu_num().unwrap_or(1),
        }
    }

    /// Vulkan physical devices present on this system.
    pub fn vulkan_adapters() -> Result<Vec<InfoDevice>> {
        unsafe {
            let loader = LibloadingLoader::new(LIBRARY).map_err(|e| {
                Error::BackendException(format!("failed to load the Vulkan library: {}", e))
            })?;
            let entry = Entry::new(loader).map_err(|e| {
                Error::BackendException(format!("failed to create Vulkan entry point: {}", e))
            })?;

            let name = c"hetexec";
            let appinfo = vk::ApplicationInfo {
                s_type: vk::StructureType::APPLICATION_INFO,
                next: ptr::null(),
                application_name: name.as_ptr(),
                application_version: vk::make_version(0, 1, 0),
                engine_name: name.as_ptr(),
                engine_version: vk::make_version(0, 1, 0),
                api_version: vk::make_version(1, 1, 0),
            };

            let create_info = vk::InstanceCreateInfo {
                s_type: vk::StructureType::INSTANCE_CREATE_INFO,
                next: ptr::null(),
                flags: vk::InstanceCreateFlags::empty(),
                application_info: &appinfo,
                enabled_layer_count: 0,
                enabled_layer_names: ptr::null(),
                enabled_extension_count: 0,
                enabled_extension_names: ptr::null(),
            };

            let instance = entry
                .create_instance(&create_info, None)
                .map_err(Error::from)?;

            let adapters = instance.enumerate_physical_devices().map(|devices| {
                devices
                    .into_iter()
                    .map(|device| Self::from_vulkan(&instance, device))
                    .collect()
            });

            instance.destroy_instance(None);
            adapters.map_err(|code| Error::from(code).into())
        }
    }

    unsafe fn from_vulkan(instance: &vulkanalia::Instance, device: vk::PhysicalDevice) -> Self {
        let (properties, memory) = unsafe {
            (
                instance.get_physical_device_properties(device),
                instance.get_physical_device_memory_properties(device),
            )
        };

        let name = String::from_utf8_lossy(
            &properties
                .device_name
                .iter()
                .take_while(|&&c| c != 0)
                .map(|&c| c as u8)
                .collect::<Vec<u8>>(),
        )
        .to_string();

        let device_local = memory.memory_heaps[..memory.memory_heap_count as usize]
            .iter()
            .filter(|heap| heap.flags.contains(vk::MemoryHeapFlags::DEVICE_LOCAL));
        let global_mem_size = device_local.clone().map(|heap| heap.size).sum();
        let max_mem_alloc_size = device_local.map(|heap| heap.size).max().unwrap_or(0);

        Self {
            name,
            is_cpu: properties.device_type == vk::PhysicalDeviceType::CPU,
            max_work_group_size: properties.limits.max_compute_work_group_invocations as usize,
            max_mem_alloc_size,
            global_mem_size,
            local_mem_size: properties.limits.max_compute_shared_memory_size as usize,
            compute_units: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_record_follows_config() {
        let config = ContextConfig {
            memory_limit: Some(1 << 20),
            max_work_group_size: 128,
            ..Default::default()
        };
        let info = InfoDevice::reference(&config);
        assert!(!info.is_cpu);
        assert_eq!(info.global_mem_size, 1 << 20);
        assert_eq!(info.max_work_group_size, 128);
        assert_eq!(info.local_mem_size, 64 * 1024);
        assert!(info.compute_units >= 1);
    }

    #[test]
    fn test_host_record_is_zeroed() {
        let info = InfoDevice::host();
        assert!(info.is_cpu);
        assert_eq!(info.global_mem_size, 0);
        assert!(info.name.is_empty());
    }
}
