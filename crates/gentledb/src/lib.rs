//! GentleDB: a content-addressable store with a mutable naming layer.
//!
//! Content is written once and named by the SHA-256 of its bytes. Pointers
//! map caller-chosen identifiers to content identifiers and can be moved or
//! removed at will. [`GentleDb`] wires a content store and a pointer store
//! from the same backend and is the main entry point for applications.
//!
//! ```
//! use gentledb::GentleDb;
//!
//! let db = GentleDb::in_memory();
//! let content = db.put(b"hello")?;
//! let name = db.random();
//! db.set_pointer(&name, Some(&content))?;
//! assert_eq!(db.get(&db.pointer(&name)?)?, b"hello");
//! # Ok::<(), gentledb::DbError>(())
//! ```

pub mod config;
pub mod db;
pub mod error;

pub use config::{BackendConfig, GentleDbConfig};
pub use db::{Backend, GentleDb, Search};
pub use error::{DbError, DbResult};

// Re-export key types
pub use gentledb_pointers::{PointerSearch, PointerStore};
pub use gentledb_store::{ContentReader, ContentSearch, ContentStore, ContentWriter, FsOptions};
pub use gentledb_types::{validate_identifier, IdPrefix, Identifier, TypeError};
