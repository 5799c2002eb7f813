use super::Error;
use crate::schema::Type;

/// Error when a supplied value cannot be coerced to the column's
/// semantic type.
#[derive(Debug)]
pub(super) struct TypeMismatchError {
    pub(super) column: Box<str>,
    pub(super) expected: Type,
    pub(super) value: Box<str>,
}

impl std::error::Error for TypeMismatchError {}

impl core::fmt::Display for TypeMismatchError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "cannot coerce `{}` to {} for column `{}`",
            self.value, self.expected, self.column
        )
    }
}

impl Error {
    pub fn type_mismatch(
        column: impl Into<Box<str>>,
        expected: Type,
        value: impl core::fmt::Display,
    ) -> Error {
        Error::from(super::ErrorKind::TypeMismatch(TypeMismatchError {
            column: column.into(),
            expected,
            value: value.to_string().into(),
        }))
    }

    pub fn is_type_mismatch(&self) -> bool {
        self.chain()
            .any(|err| matches!(err.kind(), super::ErrorKind::TypeMismatch(_)))
    }
}
