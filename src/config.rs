use crate::backend::NativeApi;
use crate::buffer::UsmKind;
use crate::error::{Error, Result};

/// Used when the host memory size cannot be queried.
const FALLBACK_MEMORY_LIMIT: u64 = 1 << 30;

/// How `ExecutionContext::allocate` backs new buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AllocationMode {
    #[default]
    Native,
    Usm(UsmKind),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextConfig {
    pub native_api: NativeApi,
    pub allocation: AllocationMode,
    /// Device memory available to allocations. `None` means the size of
    /// host memory.
    pub memory_limit: Option<u64>,
    pub max_work_group_size: usize,
    pub local_memory_size: usize,
    pub device_name: String,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            native_api: NativeApi::default(),
            allocation: AllocationMode::default(),
            memory_limit: None,
            max_work_group_size: 256,
            local_memory_size: 64 * 1024,
            device_name: "hetexec reference device".to_string(),
        }
    }
}

impl ContextConfig {
    /// Validates the configuration and resolves the memory limit.
    pub fn build(mut self) -> Result<Self> {
        if self.max_work_group_size == 0 || !self.max_work_group_size.is_power_of_two() {
            return Err(Error::incorrect_parameter(format!(
                "max work-group size must be a non-zero power of two, got {}",
                self.max_work_group_size
            ))
            .into());
        }
        if self.local_memory_size == 0 {
            return Err(Error::incorrect_parameter("local memory size cannot be zero").into());
        }
        if self.memory_limit == Some(0) {
            return Err(Error::incorrect_parameter("memory limit cannot be zero").into());
        }

        if self.memory_limit.is_none() {
            self.memory_limit = Some(host_memory().unwrap_or(FALLBACK_MEMORY_LIMIT));
        }
        Ok(self)
    }

    pub(crate) fn resolved_memory_limit(&self) -> u64 {
        self.memory_limit
            .unwrap_or_else(|| host_memory().unwrap_or(FALLBACK_MEMORY_LIMIT))
    }
}

/// Total host memory in bytes.
pub(crate) fn host_memory() -> Option<u64> {
    sys_info::mem_info().ok().map(|info| info.total * 1024)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_default_builds() {
        let config = ContextConfig::default().build().unwrap();
        assert!(config.memory_limit.is_some_and(|limit| limit > 0));
        assert_eq!(config.allocation, AllocationMode::Native);
        assert_eq!(config.native_api, NativeApi::OpenCl);
    }

    #[test]
    fn test_explicit_limit_is_kept() {
        let config = ContextConfig {
            memory_limit: Some(4096),
            ..Default::default()
        }
        .build()
        .unwrap();
        assert_eq!(config.resolved_memory_limit(), 4096);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for config in [
            ContextConfig {
                max_work_group_size: 96,
                ..Default::default()
            },
            ContextConfig {
                max_work_group_size: 0,
                ..Default::default()
            },
            ContextConfig {
                local_memory_size: 0,
                ..Default::default()
            },
            ContextConfig {
                memory_limit: Some(0),
                ..Default::default()
            },
        ] {
            let status = config.build().unwrap_err();
            assert!(status.contains(ErrorKind::IncorrectParameter));
        }
    }
}
