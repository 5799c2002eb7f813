use super::Error;

/// Error when catalog construction violates a schema invariant.
#[derive(Debug)]
pub(super) struct InvalidSchemaError {
    pub(super) detail: Box<str>,
}

impl std::error::Error for InvalidSchemaError {}

impl core::fmt::Display for InvalidSchemaError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid schema: {}", self.detail)
    }
}

impl Error {
    pub fn invalid_schema(detail: impl Into<Box<str>>) -> Error {
        Error::from(super::ErrorKind::InvalidSchema(InvalidSchemaError {
            detail: detail.into(),
        }))
    }

    pub fn is_invalid_schema(&self) -> bool {
        self.chain()
            .any(|err| matches!(err.kind(), super::ErrorKind::InvalidSchema(_)))
    }
}
