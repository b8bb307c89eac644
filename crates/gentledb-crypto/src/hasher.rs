use std::io::{self, Read, Write};

use gentledb_types::Identifier;
use sha2::{Digest, Sha256};

/// Incremental SHA-256 hasher producing an [`Identifier`].
///
/// Feed bytes with [`update`](Self::update) (or through its `io::Write`
/// impl) and call [`finalize`](Self::finalize) once all content has been
/// seen. Hashing a buffer in arbitrary chunks gives the same identifier as
/// hashing the concatenation in one call.
#[derive(Clone, Default)]
pub struct ContentHasher {
    inner: Sha256,
}

impl ContentHasher {
    pub fn new() -> Self {
        Self {
            inner: Sha256::new(),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Consume the hasher and return the content identifier.
    pub fn finalize(self) -> Identifier {
        Identifier::from_bytes(self.inner.finalize().into())
    }

    /// Hash a whole buffer in one call.
    pub fn digest(data: &[u8]) -> Identifier {
        Identifier::from_bytes(Sha256::digest(data).into())
    }

    /// Hash everything a reader yields until EOF.
    pub fn hash_reader<R: Read>(mut reader: R) -> io::Result<Identifier> {
        let mut hasher = Self::new();
        io::copy(&mut reader, &mut hasher)?;
        Ok(hasher.finalize())
    }

    /// Verify that data hashes to the expected identifier.
    pub fn verify(data: &[u8], expected: &Identifier) -> bool {
        Self::digest(data) == *expected
    }
}

impl Write for ContentHasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for ContentHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentHasher").finish_non_exhaustive()
    }
}
