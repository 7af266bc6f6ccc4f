mod level_zero;
mod opencl;
mod status;
mod vulkan;

use thiserror::Error;

pub use status::{Result, Status};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Incorrect parameter: {0}")]
    IncorrectParameter(String),

    #[error("Memory allocation failed: {0}")]
    MemoryAllocationFailed(String),

    #[error("Method not implemented: {0}")]
    MethodNotImplemented(String),

    #[error("Cannot access device pointer on host: USM allocation belongs to another device")]
    AccessUsmPointerOnOtherDevice,

    #[error("Failed to build program '{program}':\n{log}")]
    ProgramBuildFailed { program: String, log: String },

    #[error("Matrix is not positive definite: leading minor {0} is not positive")]
    NotPositiveDefinite(usize),

    #[error("OpenCL error {code} ({name}): {description}")]
    OpenCl {
        code: i32,
        name: &'static str,
        description: &'static str,
    },

    #[error("Level Zero error {code:#010x} ({name}): {description}")]
    LevelZero {
        code: u32,
        name: &'static str,
        description: &'static str,
    },

    #[error("Vulkan error {code} ({name}): {description}")]
    Vulkan {
        code: i32,
        name: &'static str,
        description: &'static str,
    },

    #[error("Exception raised by backend: {0}")]
    BackendException(String),

    #[error("Unknown backend failure")]
    Unknown,
}

/// Coarse classification of an [`Error`], used by callers that branch on the
/// kind of failure rather than on the concrete native code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    IncorrectParameter,
    Allocation,
    NotImplemented,
    Access,
    Compilation,
    BackendRuntime,
    Numeric,
    Unknown,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::IncorrectParameter(_) => ErrorKind::IncorrectParameter,
            Error::MemoryAllocationFailed(_) => ErrorKind::Allocation,
            Error::MethodNotImplemented(_) => ErrorKind::NotImplemented,
            Error::AccessUsmPointerOnOtherDevice => ErrorKind::Access,
            Error::ProgramBuildFailed { .. } => ErrorKind::Compilation,
            Error::NotPositiveDefinite(_) => ErrorKind::Numeric,
            Error::OpenCl { code, .. } => opencl::kind(*code),
            Error::LevelZero { code, .. } => level_zero::kind(*code),
            Error::Vulkan { code, .. } => vulkan::kind(*code),
            Error::BackendException(_) => ErrorKind::BackendRuntime,
            Error::Unknown => ErrorKind::Unknown,
        }
    }

    /// Translates an OpenCL `cl_int` status code.
    pub fn from_opencl(code: i32) -> Self {
        let (name, description) = opencl::describe(code);
        Error::OpenCl {
            code,
            name,
            description,
        }
    }

    /// Translates a Level Zero `ze_result_t` code.
    pub fn from_level_zero(code: u32) -> Self {
        let (name, description) = level_zero::describe(code);
        Error::LevelZero {
            code,
            name,
            description,
        }
    }

    pub fn incorrect_parameter(message: impl Into<String>) -> Self {
        Error::IncorrectParameter(message.into())
    }

    pub fn not_implemented(method: impl Into<String>) -> Self {
        Error::MethodNotImplemented(method.into())
    }
}
