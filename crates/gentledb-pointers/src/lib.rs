//! Pointer management for GentleDB.
//!
//! Content identifiers are immutable; pointers give them mutable names. A
//! pointer maps an identifier the caller chooses (or draws at random) to a
//! content identifier. Setting a pointer overwrites any previous target,
//! the last `set` wins, and no history is kept.
//!
//! # Modules
//!
//! - [`error`]: Error types for pointer operations
//! - [`traits`]: The [`PointerStore`] trait defining the storage interface
//! - [`memory`]: In-memory [`InMemoryPointerStore`]
//! - [`fs`]: Durable [`FsPointerStore`] using the sharded layout

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use error::{PointerError, Result};
pub use fs::FsPointerStore;
pub use memory::InMemoryPointerStore;
pub use traits::{PointerSearch, PointerStore};
