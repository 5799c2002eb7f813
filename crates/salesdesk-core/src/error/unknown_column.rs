use super::Error;

/// Error when a supplied column name does not exist in the table.
#[derive(Debug)]
pub(super) struct UnknownColumnError {
    pub(super) table: Box<str>,
    pub(super) column: Box<str>,
}

impl std::error::Error for UnknownColumnError {}

impl core::fmt::Display for UnknownColumnError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "unknown column `{}` in table `{}`", self.column, self.table)
    }
}

impl Error {
    pub fn unknown_column(table: impl Into<Box<str>>, column: impl Into<Box<str>>) -> Error {
        Error::from(super::ErrorKind::UnknownColumn(UnknownColumnError {
            table: table.into(),
            column: column.into(),
        }))
    }

    pub fn is_unknown_column(&self) -> bool {
        self.chain()
            .any(|err| matches!(err.kind(), super::ErrorKind::UnknownColumn(_)))
    }
}
