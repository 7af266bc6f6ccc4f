use vulkanalia::vk;

use super::{Error, ErrorKind};

pub(super) const UNKNOWN_NAME: &str = "VK_RESULT_UNRECOGNIZED";
pub(super) const UNKNOWN_DESCRIPTION: &str = "Unknown Vulkan error";

const CODES: &[(vk::Result, &str, &str)] = &[
    (vk::Result::NOT_READY, "VK_NOT_READY", "A fence or query has not yet completed"),
    (vk::Result::TIMEOUT, "VK_TIMEOUT", "A wait operation has not completed in the specified time"),
    (vk::Result::INCOMPLETE, "VK_INCOMPLETE", "A return array was too small for the result"),
    (vk::Result::ERROR_OUT_OF_HOST_MEMORY, "VK_ERROR_OUT_OF_HOST_MEMORY", "A host memory allocation has failed"),
    (vk::Result::ERROR_OUT_OF_DEVICE_MEMORY, "VK_ERROR_OUT_OF_DEVICE_MEMORY", "A device memory allocation has failed"),
    (vk::Result::ERROR_INITIALIZATION_FAILED, "VK_ERROR_INITIALIZATION_FAILED", "Initialization of an object could not be completed"),
    (vk::Result::ERROR_DEVICE_LOST, "VK_ERROR_DEVICE_LOST", "The logical or physical device has been lost"),
    (vk::Result::ERROR_MEMORY_MAP_FAILED, "VK_ERROR_MEMORY_MAP_FAILED", "Mapping of a memory object has failed"),
    (vk::Result::ERROR_LAYER_NOT_PRESENT, "VK_ERROR_LAYER_NOT_PRESENT", "A requested layer is not present or could not be loaded"),
    (vk::Result::ERROR_EXTENSION_NOT_PRESENT, "VK_ERROR_EXTENSION_NOT_PRESENT", "A requested extension is not supported"),
    (vk::Result::ERROR_FEATURE_NOT_PRESENT, "VK_ERROR_FEATURE_NOT_PRESENT", "A requested feature is not supported"),
    (vk::Result::ERROR_INCOMPATIBLE_DRIVER, "VK_ERROR_INCOMPATIBLE_DRIVER", "The requested Vulkan version is not supported by the driver"),
    (vk::Result::ERROR_TOO_MANY_OBJECTS, "VK_ERROR_TOO_MANY_OBJECTS", "Too many objects of the type have already been created"),
    (vk::Result::ERROR_FORMAT_NOT_SUPPORTED, "VK_ERROR_FORMAT_NOT_SUPPORTED", "A requested format is not supported on this device"),
    (vk::Result::ERROR_FRAGMENTED_POOL, "VK_ERROR_FRAGMENTED_POOL", "A pool allocation has failed due to fragmentation"),
    (vk::Result::ERROR_UNKNOWN, "VK_ERROR_UNKNOWN", "An unknown error has occurred in the driver"),
];

fn describe(result: vk::Result) -> (&'static str, &'static str) {
    CODES
        .iter()
        .find(|(r, _, _)| *r == result)
        .map(|&(_, name, description)| (name, description))
        .unwrap_or((UNKNOWN_NAME, UNKNOWN_DESCRIPTION))
}

pub(super) fn kind(code: i32) -> ErrorKind {
    match code {
        -1 | -2 | -12 => ErrorKind::Allocation,
        -13 => ErrorKind::Unknown,
        _ => ErrorKind::BackendRuntime,
    }
}

impl From<vk::Result> for Error {
    fn from(result: vk::Result) -> Self {
        let (name, description) = describe(result);
        Error::Vulkan {
            code: result.as_raw(),
            name,
            description,
        }
    }
}

impl From<vk::ErrorCode> for Error {
    fn from(code: vk::ErrorCode) -> Self {
        Error::from(vk::Result::from_raw(code.as_raw()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_descriptions_are_distinct_and_non_empty() {
        let mut seen = HashSet::new();
        for &(_, name, description) in CODES {
            assert!(!name.is_empty());
            assert!(seen.insert(description), "duplicate description for {}", name);
        }
    }

    #[test]
    fn test_vulkan_results_translate() {
        let error = Error::from(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);
        assert_eq!(error.kind(), ErrorKind::Allocation);
        assert!(error.to_string().contains("VK_ERROR_OUT_OF_DEVICE_MEMORY"));

        match Error::from(vk::Result::from_raw(-424242)) {
            Error::Vulkan { description, .. } => assert_eq!(description, UNKNOWN_DESCRIPTION),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
