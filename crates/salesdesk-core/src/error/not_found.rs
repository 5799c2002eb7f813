use super::Error;

/// Error when an update or delete target key matches no row.
#[derive(Debug)]
pub(super) struct NotFoundError {
    pub(super) table: Box<str>,
    pub(super) key: Box<str>,
}

impl std::error::Error for NotFoundError {}

impl core::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "no row in `{}` matching {}", self.table, self.key)
    }
}

impl Error {
    pub fn not_found(table: impl Into<Box<str>>, key: impl Into<Box<str>>) -> Error {
        Error::from(super::ErrorKind::NotFound(NotFoundError {
            table: table.into(),
            key: key.into(),
        }))
    }

    pub fn is_not_found(&self) -> bool {
        self.chain()
            .any(|err| matches!(err.kind(), super::ErrorKind::NotFound(_)))
    }
}
