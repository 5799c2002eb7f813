use super::Error;

/// Error when a table name is not registered in the catalog.
#[derive(Debug)]
pub(super) struct UnknownTableError {
    pub(super) table: Box<str>,
}

impl std::error::Error for UnknownTableError {}

impl core::fmt::Display for UnknownTableError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "unknown table `{}`", self.table)
    }
}

impl Error {
    /// Creates an error for a catalog lookup miss.
    pub fn unknown_table(table: impl Into<Box<str>>) -> Error {
        Error::from(super::ErrorKind::UnknownTable(UnknownTableError {
            table: table.into(),
        }))
    }

    /// Returns `true` if this error chain contains an unknown-table error.
    pub fn is_unknown_table(&self) -> bool {
        self.chain()
            .any(|err| matches!(err.kind(), super::ErrorKind::UnknownTable(_)))
    }
}
