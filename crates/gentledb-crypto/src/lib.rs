//! Content hashing for GentleDB.
//!
//! A content identifier is the plain SHA-256 of the stored bytes, with no
//! domain tag or framing, so any external `sha256sum` reproduces it.
//!
//! All crypto operations wrap established libraries; no custom cryptography.

pub mod hasher;

pub use hasher::ContentHasher;
