use super::Error;

/// Error when default-row construction cannot satisfy the table's
/// constraints, e.g. a cyclic foreign-key closure.
#[derive(Debug)]
pub(super) struct SynthesisError {
    pub(super) table: Box<str>,
    pub(super) reason: Box<str>,
}

impl std::error::Error for SynthesisError {}

impl core::fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "cannot synthesize a default row for `{}`: {}",
            self.table, self.reason
        )
    }
}

impl Error {
    pub fn synthesis(table: impl Into<Box<str>>, reason: impl Into<Box<str>>) -> Error {
        Error::from(super::ErrorKind::Synthesis(SynthesisError {
            table: table.into(),
            reason: reason.into(),
        }))
    }

    pub fn is_synthesis(&self) -> bool {
        self.chain()
            .any(|err| matches!(err.kind(), super::ErrorKind::Synthesis(_)))
    }
}
