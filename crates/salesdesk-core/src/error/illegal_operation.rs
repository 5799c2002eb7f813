use super::Error;

/// Error when an operation is structurally disallowed: editing a
/// primary-key column, omitting a key component, or deleting from a
/// keyless table.
#[derive(Debug)]
pub(super) struct IllegalOperationError {
    pub(super) reason: Box<str>,
}

impl std::error::Error for IllegalOperationError {}

impl core::fmt::Display for IllegalOperationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "illegal operation: {}", self.reason)
    }
}

impl Error {
    pub fn illegal_operation(reason: impl Into<Box<str>>) -> Error {
        Error::from(super::ErrorKind::IllegalOperation(IllegalOperationError {
            reason: reason.into(),
        }))
    }

    pub fn is_illegal_operation(&self) -> bool {
        self.chain()
            .any(|err| matches!(err.kind(), super::ErrorKind::IllegalOperation(_)))
    }
}
