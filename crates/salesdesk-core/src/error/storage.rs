use super::Error;

/// Error from the underlying storage backend.
#[derive(Debug)]
pub(super) struct StorageError {
    pub(super) inner: Box<dyn std::error::Error + Send + Sync>,
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        // Display the error and walk its source chain
        core::fmt::Display::fmt(&self.inner, f)?;
        let mut source = self.inner.source();
        while let Some(err) = source {
            write!(f, ": {}", err)?;
            source = err.source();
        }
        Ok(())
    }
}

impl Error {
    /// Creates an error from a storage backend error.
    ///
    /// This is the preferred way to convert backend-specific errors
    /// (rusqlite and friends) into salesdesk errors, except for
    /// constraint rejections which map to
    /// [`Error::constraint_violation`].
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::from(super::ErrorKind::Storage(StorageError {
            inner: Box::new(err),
        }))
    }

    pub fn is_storage(&self) -> bool {
        self.chain()
            .any(|err| matches!(err.kind(), super::ErrorKind::Storage(_)))
    }
}
