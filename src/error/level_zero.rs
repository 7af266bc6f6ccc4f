use super::ErrorKind;

pub(super) const UNKNOWN_NAME: &str = "ZE_RESULT_UNRECOGNIZED";
pub(super) const UNKNOWN_DESCRIPTION: &str = "Unknown Level Zero error";

pub(super) const CODES: &[(u32, &str, &str)] = &[
    (0x0000_0001, "ZE_RESULT_NOT_READY", "Synchronization primitive not signaled"),
    (0x7000_0001, "ZE_RESULT_ERROR_DEVICE_LOST", "Device hung, reset, was removed, or the driver was updated"),
    (0x7000_0002, "ZE_RESULT_ERROR_OUT_OF_HOST_MEMORY", "Insufficient host memory to satisfy the call"),
    (0x7000_0003, "ZE_RESULT_ERROR_OUT_OF_DEVICE_MEMORY", "Insufficient device memory to satisfy the call"),
    (0x7000_0004, "ZE_RESULT_ERROR_MODULE_BUILD_FAILURE", "Error occurred when building the module"),
    (0x7000_0005, "ZE_RESULT_ERROR_MODULE_LINK_FAILURE", "Error occurred when linking modules"),
    (0x7001_0000, "ZE_RESULT_ERROR_INSUFFICIENT_PERMISSIONS", "Access denied due to permission level"),
    (0x7001_0001, "ZE_RESULT_ERROR_NOT_AVAILABLE", "Resource already in use and simultaneous access not allowed"),
    (0x7002_0000, "ZE_RESULT_ERROR_DEPENDENCY_UNAVAILABLE", "External required dependency is unavailable or missing"),
    (0x7800_0001, "ZE_RESULT_ERROR_UNINITIALIZED", "Driver is not initialized"),
    (0x7800_0002, "ZE_RESULT_ERROR_UNSUPPORTED_VERSION", "Generic error code for unsupported versions"),
    (0x7800_0003, "ZE_RESULT_ERROR_UNSUPPORTED_FEATURE", "Generic error code for unsupported features"),
    (0x7800_0004, "ZE_RESULT_ERROR_INVALID_ARGUMENT", "Generic error code for invalid arguments"),
    (0x7800_0005, "ZE_RESULT_ERROR_INVALID_NULL_HANDLE", "Handle argument is not valid"),
    (0x7800_0006, "ZE_RESULT_ERROR_HANDLE_OBJECT_IN_USE", "Object pointed to by handle is still in use by the device"),
    (0x7800_0007, "ZE_RESULT_ERROR_INVALID_NULL_POINTER", "Pointer argument may not be null"),
    (0x7800_0008, "ZE_RESULT_ERROR_INVALID_SIZE", "Size argument is invalid"),
    (0x7800_0009, "ZE_RESULT_ERROR_UNSUPPORTED_SIZE", "Size argument is not supported by the device"),
    (0x7800_000a, "ZE_RESULT_ERROR_UNSUPPORTED_ALIGNMENT", "Alignment argument is not supported by the device"),
    (0x7800_000b, "ZE_RESULT_ERROR_INVALID_SYNCHRONIZATION_OBJECT", "Synchronization object in invalid state"),
    (0x7800_000c, "ZE_RESULT_ERROR_INVALID_ENUMERATION", "Enumerator argument is not valid"),
    (0x7800_000d, "ZE_RESULT_ERROR_UNSUPPORTED_ENUMERATION", "Enumerator argument is not supported by the device"),
    (0x7800_000e, "ZE_RESULT_ERROR_UNSUPPORTED_IMAGE_FORMAT", "Image format is not supported by the device"),
    (0x7800_000f, "ZE_RESULT_ERROR_INVALID_NATIVE_BINARY", "Native binary is not supported by the device"),
    (0x7800_0010, "ZE_RESULT_ERROR_INVALID_GLOBAL_NAME", "Global variable is not found in the module"),
    (0x7800_0011, "ZE_RESULT_ERROR_INVALID_KERNEL_NAME", "Kernel name is not found in the module"),
    (0x7800_0012, "ZE_RESULT_ERROR_INVALID_FUNCTION_NAME", "Function name is not found in the module"),
    (0x7800_0013, "ZE_RESULT_ERROR_INVALID_GROUP_SIZE_DIMENSION", "Group size dimension is not valid for the kernel or device"),
    (0x7800_0014, "ZE_RESULT_ERROR_INVALID_GLOBAL_WIDTH_DIMENSION", "Global width dimension is not valid for the kernel or device"),
    (0x7800_0015, "ZE_RESULT_ERROR_INVALID_KERNEL_ARGUMENT_INDEX", "Kernel argument index is not valid for the kernel"),
    (0x7800_0016, "ZE_RESULT_ERROR_INVALID_KERNEL_ARGUMENT_SIZE", "Kernel argument size does not match the kernel"),
    (0x7800_0017, "ZE_RESULT_ERROR_INVALID_KERNEL_ATTRIBUTE_VALUE", "Value of kernel attribute is not valid for the kernel or device"),
    (0x7800_0018, "ZE_RESULT_ERROR_INVALID_MODULE_UNLINKED", "Module with imports needs to be linked before kernels can be created"),
    (0x7800_0019, "ZE_RESULT_ERROR_INVALID_COMMAND_LIST_TYPE", "Command list type does not match command queue type"),
    (0x7800_001a, "ZE_RESULT_ERROR_OVERLAPPING_REGIONS", "Copy operations do not support overlapping regions of memory"),
    (0x7fff_fffe, "ZE_RESULT_ERROR_UNKNOWN", "Unknown or internal error reported by the driver"),
];

pub(super) fn describe(code: u32) -> (&'static str, &'static str) {
    CODES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|&(_, name, description)| (name, description))
        .unwrap_or((UNKNOWN_NAME, UNKNOWN_DESCRIPTION))
}

pub(super) fn kind(code: u32) -> ErrorKind {
    match code {
        0x7000_0002 | 0x7000_0003 => ErrorKind::Allocation,
        0x7000_0004 | 0x7000_0005 | 0x7800_000f => ErrorKind::Compilation,
        0x7fff_fffe => ErrorKind::Unknown,
        _ => ErrorKind::BackendRuntime,
    }
}
