//! The [`PointerStore`] trait defining the pointer storage interface.
//!
//! Any backend (in-memory, filesystem) implements this trait to provide the
//! mutable naming layer over the content store.

use gentledb_types::{IdPrefix, Identifier};

use crate::error::{PointerError, Result};

/// Storage backend for pointers.
///
/// Implementations must be thread-safe (`Send + Sync`). Concurrent `set`
/// calls on the same pointer are not serialized against each other beyond
/// what the backend's own write primitive provides: the last one to land
/// wins, with no compare-and-swap.
pub trait PointerStore: Send + Sync {
    /// Read the target of a pointer.
    ///
    /// Returns `Ok(None)` if the pointer is not set.
    fn read(&self, pointer: &Identifier) -> Result<Option<Identifier>>;

    /// Point `pointer` at `target`, replacing any previous target.
    ///
    /// With `target == None` the pointer is removed instead; that fails with
    /// [`PointerError::NotFound`] if it was not set.
    fn set(&self, pointer: &Identifier, target: Option<&Identifier>) -> Result<()>;

    /// Prefix enumeration, for backends that support it.
    fn as_search(&self) -> Option<&dyn PointerSearch> {
        None
    }

    /// Target of a pointer, failing with [`PointerError::NotFound`] if unset.
    fn get(&self, pointer: &Identifier) -> Result<Identifier> {
        self.read(pointer)?
            .ok_or(PointerError::NotFound(*pointer))
    }

    /// Remove a pointer. Shorthand for `set(pointer, None)`.
    fn delete(&self, pointer: &Identifier) -> Result<()> {
        self.set(pointer, None)
    }
}

/// Optional capability: enumerate pointer identifiers by prefix.
pub trait PointerSearch {
    /// Pointer identifiers whose hex form starts with `prefix`. Order is not
    /// part of the contract.
    fn find_pointers(&self, prefix: &IdPrefix) -> Result<Vec<Identifier>>;
}
