use std::io::{self, Read};

use gentledb_crypto::ContentHasher;
use gentledb_types::{IdPrefix, Identifier};

use crate::error::{StoreError, StoreResult};
use crate::stream::{ContentReader, ContentWriter};

/// Content-addressed store of immutable byte strings.
///
/// All implementations must satisfy these invariants:
/// - The identifier of stored bytes is their SHA-256; `get(put(b)) == b`.
/// - `put` is idempotent: storing identical bytes again returns the same
///   identifier without duplicating storage or failing.
/// - Content is never mutated, partially written or deleted.
/// - A content record becomes visible all at once, never partially.
/// - All I/O errors are propagated, never silently ignored.
pub trait ContentStore: Send + Sync {
    /// Store bytes and return their content identifier.
    fn put(&self, data: &[u8]) -> StoreResult<Identifier>;

    /// Read stored bytes. Fails with [`StoreError::NotFound`] if absent.
    fn get(&self, id: &Identifier) -> StoreResult<Vec<u8>>;

    /// Check whether content exists for `id`.
    fn contains(&self, id: &Identifier) -> StoreResult<bool>;

    /// Start an incremental write whose identifier is known only once it is
    /// finalized.
    fn open_writer(&self) -> StoreResult<Box<dyn ContentWriter + '_>>;

    /// Open a cursor over stored content. Fails with
    /// [`StoreError::NotFound`] if absent.
    fn open_reader(&self, id: &Identifier) -> StoreResult<Box<dyn ContentReader + '_>>;

    /// Prefix enumeration, for backends that support it.
    fn as_search(&self) -> Option<&dyn ContentSearch> {
        None
    }

    /// Stream everything `reader` yields into the store.
    ///
    /// If reading fails the writer is dropped unpublished.
    fn put_reader(&self, reader: &mut dyn Read) -> StoreResult<Identifier> {
        let mut writer = self.open_writer()?;
        io::copy(reader, &mut *writer)?;
        writer.finalize()
    }

    /// Rehash stored content and compare it with its identifier.
    ///
    /// Never called implicitly; reads do not verify.
    fn check(&self, id: &Identifier) -> StoreResult<()> {
        let data = self.get(id)?;
        let computed = ContentHasher::digest(&data);
        if computed == *id {
            Ok(())
        } else {
            Err(StoreError::HashMismatch {
                id: *id,
                computed,
            })
        }
    }
}

/// Optional capability: enumerate stored content identifiers by prefix.
pub trait ContentSearch {
    /// Identifiers whose hex form starts with `prefix`. Order is not part of
    /// the contract.
    fn find_content(&self, prefix: &IdPrefix) -> StoreResult<Vec<Identifier>>;
}
