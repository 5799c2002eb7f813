mod constraint_violation;
mod illegal_operation;
mod invalid_schema;
mod not_found;
mod storage;
mod synthesis;
mod type_mismatch;
mod unknown_column;
mod unknown_table;

use constraint_violation::ConstraintViolationError;
use illegal_operation::IllegalOperationError;
use invalid_schema::InvalidSchemaError;
use not_found::NotFoundError;
use std::sync::Arc;
use storage::StorageError;
use synthesis::SynthesisError;
use type_mismatch::TypeMismatchError;
use unknown_column::UnknownColumnError;
use unknown_table::UnknownTableError;

/// An error that can occur in Salesdesk.
#[derive(Clone)]
pub struct Error {
    inner: Arc<ErrorInner>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

impl Error {
    /// Adds context to this error.
    ///
    /// Context is displayed in reverse order: the most recently added
    /// context is shown first, ending with the root cause.
    pub fn context(self, consequent: Error) -> Error {
        let mut inner = match Arc::try_unwrap(consequent.inner) {
            Ok(inner) => inner,
            Err(shared) => ErrorInner {
                kind: ErrorKind::Anyhow(anyhow::anyhow!("{}", shared.kind)),
                cause: shared.cause.clone(),
            },
        };
        assert!(
            inner.cause.is_none(),
            "consequent error must not already have a cause"
        );
        inner.cause = Some(self);
        Error {
            inner: Arc::new(inner),
        }
    }

    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.cause.as_ref()?;
            Some(err)
        }))
    }

    fn kind(&self) -> &ErrorKind {
        &self.inner.kind
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind() {
            ErrorKind::Storage(err) => Some(err),
            ErrorKind::Anyhow(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(err.kind(), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            core::fmt::Display::fmt(self, f)
        } else {
            f.debug_struct("Error")
                .field("kind", &self.inner.kind)
                .field("cause", &self.inner.cause)
                .finish()
        }
    }
}

#[derive(Debug)]
enum ErrorKind {
    Anyhow(anyhow::Error),
    ConstraintViolation(ConstraintViolationError),
    IllegalOperation(IllegalOperationError),
    InvalidSchema(InvalidSchemaError),
    NotFound(NotFoundError),
    Storage(StorageError),
    Synthesis(SynthesisError),
    TypeMismatch(TypeMismatchError),
    UnknownColumn(UnknownColumnError),
    UnknownTable(UnknownTableError),
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ErrorKind::*;

        match self {
            Anyhow(err) => core::fmt::Display::fmt(err, f),
            ConstraintViolation(err) => core::fmt::Display::fmt(err, f),
            IllegalOperation(err) => core::fmt::Display::fmt(err, f),
            InvalidSchema(err) => core::fmt::Display::fmt(err, f),
            NotFound(err) => core::fmt::Display::fmt(err, f),
            Storage(err) => core::fmt::Display::fmt(err, f),
            Synthesis(err) => core::fmt::Display::fmt(err, f),
            TypeMismatch(err) => core::fmt::Display::fmt(err, f),
            UnknownColumn(err) => core::fmt::Display::fmt(err, f),
            UnknownTable(err) => core::fmt::Display::fmt(err, f),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Arc::new(ErrorInner { kind, cause: None }),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Error {
        Error::from(ErrorKind::Anyhow(err))
    }
}
