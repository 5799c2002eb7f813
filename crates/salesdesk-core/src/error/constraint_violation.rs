use super::Error;

/// Error when the underlying store rejects a write with a uniqueness or
/// foreign-key violation.
#[derive(Debug)]
pub(super) struct ConstraintViolationError {
    pub(super) detail: Box<str>,
}

impl std::error::Error for ConstraintViolationError {}

impl core::fmt::Display for ConstraintViolationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "constraint violation: {}", self.detail)
    }
}

impl Error {
    pub fn constraint_violation(detail: impl Into<Box<str>>) -> Error {
        Error::from(super::ErrorKind::ConstraintViolation(
            ConstraintViolationError {
                detail: detail.into(),
            },
        ))
    }

    pub fn is_constraint_violation(&self) -> bool {
        self.chain()
            .any(|err| matches!(err.kind(), super::ErrorKind::ConstraintViolation(_)))
    }
}
