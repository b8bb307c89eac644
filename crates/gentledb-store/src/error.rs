use std::io;

use gentledb_types::{Identifier, TypeError};

/// Errors from content store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No content is stored under this identifier.
    #[error("content not found: {0}")]
    NotFound(Identifier),

    /// An identifier or prefix failed validation.
    #[error(transparent)]
    InvalidIdentifier(#[from] TypeError),

    /// Bytes were written to a writer that has already been closed.
    #[error("content writer already closed")]
    WriterClosed,

    /// An earlier `close` failed to publish; the written bytes are gone.
    #[error("content writer failed to publish; its data was discarded")]
    PublishFailed,

    /// Stored bytes no longer hash to their identifier.
    #[error("hash mismatch for {id}: computed {computed}")]
    HashMismatch { id: Identifier, computed: Identifier },

    /// A backend lock was poisoned by a panicking thread.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    /// I/O error from the underlying storage medium.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for io::Error {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Io(err) => err,
            StoreError::NotFound(id) => io::Error::new(io::ErrorKind::NotFound, id.to_hex()),
            err => io::Error::other(err),
        }
    }
}
