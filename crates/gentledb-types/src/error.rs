use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// The string does not match `^[0-9a-f]{64}$` (full) or
    /// `^[0-9a-f]{0,64}$` (partial).
    #[error("invalid {} identifier: {:?}", mode(.partial), .id)]
    InvalidIdentifier { id: String, partial: bool },
}

fn mode(partial: &bool) -> &'static str {
    if *partial {
        "partial"
    } else {
        "full"
    }
}
