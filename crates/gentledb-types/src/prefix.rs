use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;
use crate::identifier::{validate_identifier, Identifier};

/// A validated partial identifier.
///
/// Any lowercase hex string of 0 to 64 characters. The empty prefix matches
/// every identifier; a full-length prefix matches exactly one.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct IdPrefix(String);

impl IdPrefix {
    /// Parse and validate a partial identifier.
    pub fn new(prefix: &str) -> Result<Self, TypeError> {
        validate_identifier(prefix, true)?;
        Ok(Self(prefix.to_string()))
    }

    /// The prefix that matches everything.
    pub fn all() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether `id` begins with this prefix.
    pub fn matches(&self, id: &Identifier) -> bool {
        id.starts_with(self)
    }

    /// Whether a partially reconstructed identifier (for example the
    /// concatenated shard directories walked so far) can still lead to a
    /// match.
    pub fn admits(&self, partial: &str) -> bool {
        partial.starts_with(&self.0) || self.0.starts_with(partial)
    }
}

impl fmt::Debug for IdPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdPrefix({:?})", self.0)
    }
}

impl fmt::Display for IdPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for IdPrefix {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<Identifier> for IdPrefix {
    fn from(id: Identifier) -> Self {
        Self(id.to_hex())
    }
}
