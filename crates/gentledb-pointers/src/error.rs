//! Error types for pointer operations.

use gentledb_types::{Identifier, TypeError};
use thiserror::Error;

/// Errors that can occur during pointer operations.
#[derive(Debug, Error)]
pub enum PointerError {
    /// The pointer is not set.
    #[error("pointer not found: {0}")]
    NotFound(Identifier),

    /// A pointer identifier, target or prefix failed validation.
    #[error(transparent)]
    InvalidIdentifier(#[from] TypeError),

    /// A pointer file exists but does not hold a valid content identifier.
    #[error("corrupt pointer {pointer}: {reason}")]
    Corrupt { pointer: Identifier, reason: String },

    /// A backend lock was poisoned by a panicking thread.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    /// I/O error during file-based pointer operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for pointer operations.
pub type Result<T> = std::result::Result<T, PointerError>;
