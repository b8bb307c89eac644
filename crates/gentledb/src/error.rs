use gentledb_pointers::PointerError;
use gentledb_store::StoreError;
use gentledb_types::{Identifier, TypeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("content not found: {0}")]
    ContentNotFound(Identifier),

    #[error("pointer not found: {0}")]
    PointerNotFound(Identifier),

    #[error(transparent)]
    InvalidIdentifier(#[from] TypeError),

    #[error("content writer already closed")]
    WriterClosed,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("pointer error: {0}")]
    Pointer(PointerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DbError {
    /// Whether this is a lookup miss on content or on a pointer.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ContentNotFound(_) | Self::PointerNotFound(_))
    }
}

impl From<StoreError> for DbError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::ContentNotFound(id),
            StoreError::InvalidIdentifier(e) => Self::InvalidIdentifier(e),
            StoreError::WriterClosed => Self::WriterClosed,
            StoreError::Io(e) => Self::Io(e),
            other => Self::Store(other),
        }
    }
}

impl From<PointerError> for DbError {
    fn from(err: PointerError) -> Self {
        match err {
            PointerError::NotFound(id) => Self::PointerNotFound(id),
            PointerError::InvalidIdentifier(e) => Self::InvalidIdentifier(e),
            PointerError::Io(e) => Self::Io(e),
            other => Self::Pointer(other),
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;
