//! Foundation types for GentleDB.
//!
//! GentleDB names everything with the same kind of token: a 256-bit value
//! written as 64 lowercase hex characters. Content is named by the SHA-256
//! of its bytes; pointers are named by whatever identifier the caller picks
//! (often a random one). Every other GentleDB crate depends on
//! `gentledb-types`.
//!
//! # Key Types
//!
//! - [`Identifier`]: full, validated 64-character identifier
//! - [`IdPrefix`]: validated partial identifier used for prefix search
//! - [`validate_identifier`]: the charset/length rule shared by both

pub mod error;
pub mod identifier;
pub mod prefix;

pub use error::TypeError;
pub use identifier::{validate_identifier, Identifier, ID_HEX_LEN};
pub use prefix::IdPrefix;
