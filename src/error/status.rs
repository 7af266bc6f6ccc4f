use std::fmt;
use std::ops::BitOrAssign;

use super::{Error, ErrorKind};

pub type Result<T> = std::result::Result<T, Status>;

/// Accumulates every error recorded along a call chain.
///
/// An empty status means success. Errors are appended with `|=`, either one
/// at a time or by merging another status, so that a caller which runs
/// several steps can report all of their failures together.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Status {
    errors: Vec<Error>,
}

impl Status {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn contains(&self, kind: ErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind() == kind)
    }

    pub fn add(&mut self, error: Error) -> &mut Self {
        self.errors.push(error);
        self
    }

    /// Records the error of `result`, if any, and hands back its value.
    pub fn record<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(status) => {
                *self |= status;
                None
            }
        }
    }

    pub fn into_result(self) -> Result<()> {
        if self.is_ok() { Ok(()) } else { Err(self) }
    }
}

impl From<Error> for Status {
    fn from(error: Error) -> Self {
        Status {
            errors: vec![error],
        }
    }
}

impl BitOrAssign<Status> for Status {
    fn bitor_assign(&mut self, rhs: Status) {
        self.errors.extend(rhs.errors);
    }
}

impl BitOrAssign<Error> for Status {
    fn bitor_assign(&mut self, rhs: Error) {
        self.errors.push(rhs);
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "success");
        }

        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for Status {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_with_bitor() {
        let mut status = Status::new();
        assert!(status.is_ok());

        status |= Error::incorrect_parameter("first");
        let mut other = Status::new();
        other |= Error::from_opencl(-5);
        status |= other;

        assert_eq!(status.errors().len(), 2);
        assert!(status.contains(ErrorKind::IncorrectParameter));
        assert!(status.contains(ErrorKind::Allocation));
        assert!(!status.contains(ErrorKind::NotImplemented));
    }

    #[test]
    fn test_record_keeps_value_or_error() {
        let mut status = Status::new();
        assert_eq!(status.record(Ok(3)), Some(3));
        let failed: Result<i32> = Err(Error::Unknown.into());
        assert_eq!(status.record(failed), None);
        assert!(status.into_result().is_err());
    }

    #[test]
    fn test_display_joins_messages() {
        let mut status = Status::from(Error::Unknown);
        status |= Error::not_implemented("fill");
        let text = status.to_string();
        assert!(text.contains("Unknown backend failure"));
        assert!(text.contains("; Method not implemented: fill"));
    }
}
