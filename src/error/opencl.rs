use super::ErrorKind;

pub(super) const UNKNOWN_NAME: &str = "CL_UNKNOWN_ERROR";
pub(super) const UNKNOWN_DESCRIPTION: &str = "Unknown OpenCL error";

pub(super) const CODES: &[(i32, &str, &str)] = &[
    (-1, "CL_DEVICE_NOT_FOUND", "No OpenCL device matches the requested device type"),
    (-2, "CL_DEVICE_NOT_AVAILABLE", "The OpenCL device is currently not available"),
    (-3, "CL_COMPILER_NOT_AVAILABLE", "No program compiler is available for the device"),
    (-4, "CL_MEM_OBJECT_ALLOCATION_FAILURE", "Failed to allocate memory for a buffer or image object"),
    (-5, "CL_OUT_OF_RESOURCES", "Failed to allocate resources required by the implementation on the device"),
    (-6, "CL_OUT_OF_HOST_MEMORY", "Failed to allocate resources required by the implementation on the host"),
    (-7, "CL_PROFILING_INFO_NOT_AVAILABLE", "Profiling information is not available for the event"),
    (-8, "CL_MEM_COPY_OVERLAP", "Source and destination regions of a copy overlap"),
    (-9, "CL_IMAGE_FORMAT_MISMATCH", "Source and destination images do not share a format"),
    (-10, "CL_IMAGE_FORMAT_NOT_SUPPORTED", "The image format is not supported"),
    (-11, "CL_BUILD_PROGRAM_FAILURE", "Failed to build the program executable"),
    (-12, "CL_MAP_FAILURE", "Failed to map the requested region into the host address space"),
    (-13, "CL_MISALIGNED_SUB_BUFFER_OFFSET", "Sub-buffer offset is not aligned to the device base address alignment"),
    (-14, "CL_EXEC_STATUS_ERROR_FOR_EVENTS_IN_WAIT_LIST", "An event in the wait list completed with an error"),
    (-15, "CL_COMPILE_PROGRAM_FAILURE", "Failed to compile the program source"),
    (-16, "CL_LINKER_NOT_AVAILABLE", "No linker is available for the device"),
    (-17, "CL_LINK_PROGRAM_FAILURE", "Failed to link the compiled programs"),
    (-18, "CL_DEVICE_PARTITION_FAILED", "Failed to partition the device"),
    (-19, "CL_KERNEL_ARG_INFO_NOT_AVAILABLE", "Kernel argument information is not available"),
    (-30, "CL_INVALID_VALUE", "Invalid value passed to an OpenCL function"),
    (-31, "CL_INVALID_DEVICE_TYPE", "Invalid device type"),
    (-32, "CL_INVALID_PLATFORM", "Invalid platform"),
    (-33, "CL_INVALID_DEVICE", "Invalid device"),
    (-34, "CL_INVALID_CONTEXT", "Invalid context"),
    (-35, "CL_INVALID_QUEUE_PROPERTIES", "Queue properties are not supported by the device"),
    (-36, "CL_INVALID_COMMAND_QUEUE", "Invalid command queue"),
    (-37, "CL_INVALID_HOST_PTR", "Invalid host pointer"),
    (-38, "CL_INVALID_MEM_OBJECT", "Invalid memory object"),
    (-39, "CL_INVALID_IMAGE_FORMAT_DESCRIPTOR", "Invalid image format descriptor"),
    (-40, "CL_INVALID_IMAGE_SIZE", "Image dimensions are not supported by the device"),
    (-41, "CL_INVALID_SAMPLER", "Invalid sampler"),
    (-42, "CL_INVALID_BINARY", "Invalid program binary"),
    (-43, "CL_INVALID_BUILD_OPTIONS", "Invalid program build options"),
    (-44, "CL_INVALID_PROGRAM", "Invalid program object"),
    (-45, "CL_INVALID_PROGRAM_EXECUTABLE", "No successfully built executable exists for the program"),
    (-46, "CL_INVALID_KERNEL_NAME", "Kernel name is not found in the program"),
    (-47, "CL_INVALID_KERNEL_DEFINITION", "Kernel definition differs between devices"),
    (-48, "CL_INVALID_KERNEL", "Invalid kernel object"),
    (-49, "CL_INVALID_ARG_INDEX", "Invalid kernel argument index"),
    (-50, "CL_INVALID_ARG_VALUE", "Invalid kernel argument value"),
    (-51, "CL_INVALID_ARG_SIZE", "Kernel argument size does not match the declared type"),
    (-52, "CL_INVALID_KERNEL_ARGS", "Kernel argument values have not been specified"),
    (-53, "CL_INVALID_WORK_DIMENSION", "Invalid number of work dimensions"),
    (-54, "CL_INVALID_WORK_GROUP_SIZE", "Invalid work-group size"),
    (-55, "CL_INVALID_WORK_ITEM_SIZE", "Work-item count exceeds the per-dimension device limit"),
    (-56, "CL_INVALID_GLOBAL_OFFSET", "Invalid global work offset"),
    (-57, "CL_INVALID_EVENT_WAIT_LIST", "Invalid event wait list"),
    (-58, "CL_INVALID_EVENT", "Invalid event object"),
    (-59, "CL_INVALID_OPERATION", "Invalid operation"),
    (-60, "CL_INVALID_GL_OBJECT", "Invalid OpenGL object"),
    (-61, "CL_INVALID_BUFFER_SIZE", "Invalid buffer size"),
    (-62, "CL_INVALID_MIP_LEVEL", "Invalid mip level"),
    (-63, "CL_INVALID_GLOBAL_WORK_SIZE", "Invalid global work size"),
    (-64, "CL_INVALID_PROPERTY", "Invalid property"),
    (-65, "CL_INVALID_IMAGE_DESCRIPTOR", "Invalid image descriptor"),
    (-66, "CL_INVALID_COMPILER_OPTIONS", "Invalid compiler options"),
    (-67, "CL_INVALID_LINKER_OPTIONS", "Invalid linker options"),
    (-68, "CL_INVALID_DEVICE_PARTITION_COUNT", "Invalid device partition count"),
    (-69, "CL_INVALID_PIPE_SIZE", "Invalid pipe size"),
    (-70, "CL_INVALID_DEVICE_QUEUE", "Invalid device queue"),
];

pub(super) fn describe(code: i32) -> (&'static str, &'static str) {
    CODES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|&(_, name, description)| (name, description))
        .unwrap_or((UNKNOWN_NAME, UNKNOWN_DESCRIPTION))
}

pub(super) fn kind(code: i32) -> ErrorKind {
    match code {
        -6..=-4 => ErrorKind::Allocation,
        -3 | -11 | -15 | -16 | -17 | -42 | -43 | -66 | -67 => ErrorKind::Compilation,
        _ => ErrorKind::BackendRuntime,
    }
}
