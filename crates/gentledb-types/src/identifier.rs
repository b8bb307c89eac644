use std::fmt;
use std::str::FromStr;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;
use crate::prefix::IdPrefix;

/// Length of a full identifier in hex characters.
pub const ID_HEX_LEN: usize = 64;

/// Validate an identifier string.
///
/// A full identifier is exactly 64 lowercase hex characters. A partial
/// identifier is any lowercase hex string of at most 64 characters,
/// including the empty string.
///
/// # Examples
///
/// ```
/// use gentledb_types::validate_identifier;
///
/// assert!(validate_identifier("ab", true).is_ok());
/// assert!(validate_identifier("xyz", false).is_err());
/// assert!(validate_identifier(&"00".repeat(32), false).is_ok());
/// ```
pub fn validate_identifier(id: &str, partial: bool) -> Result<(), TypeError> {
    let length_ok = if partial {
        id.len() <= ID_HEX_LEN
    } else {
        id.len() == ID_HEX_LEN
    };
    let charset_ok = id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
    if length_ok && charset_ok {
        Ok(())
    } else {
        Err(TypeError::InvalidIdentifier {
            id: id.to_string(),
            partial,
        })
    }
}

/// A full GentleDB identifier.
///
/// Used both as a content identifier (the SHA-256 of the stored bytes) and
/// as a pointer identifier (caller-chosen or random). The canonical textual
/// form is 64 lowercase hex characters; construction from text always
/// validates.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier([u8; 32]);

impl Identifier {
    /// Create an identifier from a pre-computed 32-byte value.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// A fresh identifier drawn from the operating system's CSPRNG.
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Parse and validate a full identifier.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        validate_identifier(s, false)?;
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| TypeError::InvalidIdentifier {
            id: s.to_string(),
            partial: false,
        })?;
        Ok(Self(bytes))
    }

    /// The raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Canonical 64-character lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 8 hex characters, for log output.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Split the hex form into the four on-disk segments:
    /// `[0:2]`, `[2:4]`, `[4:7]` and `[7:]`.
    pub fn shard(&self) -> [String; 4] {
        let hex = self.to_hex();
        [
            hex[..2].to_string(),
            hex[2..4].to_string(),
            hex[4..7].to_string(),
            hex[7..].to_string(),
        ]
    }

    /// Whether the hex form of this identifier begins with `prefix`.
    pub fn starts_with(&self, prefix: &IdPrefix) -> bool {
        self.to_hex().starts_with(prefix.as_str())
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.short_hex())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Identifier {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<&str> for Identifier {
    type Error = TypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::from_hex(s)
    }
}

impl From<[u8; 32]> for Identifier {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<Identifier> for [u8; 32] {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
