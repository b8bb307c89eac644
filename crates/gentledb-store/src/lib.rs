//! Content-addressed storage for GentleDB.
//!
//! Content is written once, named by the SHA-256 of its bytes, and read
//! back by that name. The same [`ContentStore`] contract is met by a durable
//! filesystem backend and a volatile in-memory backend, so callers never
//! need to know which one they hold.
//!
//! # Storage Backends
//!
//! - [`FsContentStore`] -- sharded directory tree with atomic publish
//! - [`InMemoryContentStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Streaming
//!
//! [`ContentStore::open_writer`] returns a [`ContentWriter`] that hashes
//! bytes as they arrive and publishes them on close;
//! [`ContentStore::open_reader`] returns a [`ContentReader`] with its own
//! cursor.
//!
//! # Design Rules
//!
//! 1. Content is immutable once written; there is no delete.
//! 2. Writes are idempotent: identical bytes collapse to one record.
//! 3. A record is visible completely or not at all.
//! 4. Write content first, then link to it from a pointer.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod layout;
pub mod memory;
pub mod stream;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use fs::{FsContentReader, FsContentStore, FsContentWriter, FsOptions};
pub use memory::{InMemoryContentStore, MemoryContentReader, MemoryContentWriter};
pub use stream::{ContentReader, ContentWriter};
pub use traits::{ContentSearch, ContentStore};
