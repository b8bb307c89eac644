use std::collections::HashMap;
use std::io::{self, Cursor, Read, Write};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use gentledb_crypto::ContentHasher;
use gentledb_types::{IdPrefix, Identifier};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::stream::{ContentReader, ContentWriter, WriterState};
use crate::traits::{ContentSearch, ContentStore};

/// In-memory, HashMap-based content store.
///
/// Intended for tests and embedding. Nothing survives the process; a new
/// store is always empty. Objects are shared with readers through `Arc`, so
/// opening a reader does not copy the content.
pub struct InMemoryContentStore {
    objects: RwLock<HashMap<Identifier, Arc<[u8]>>>,
}

impl InMemoryContentStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    fn objects(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<Identifier, Arc<[u8]>>>> {
        self.objects
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn objects_mut(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<Identifier, Arc<[u8]>>>> {
        self.objects
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn insert(&self, id: Identifier, data: impl Into<Arc<[u8]>>) -> StoreResult<()> {
        // Same ID always maps to the same bytes, so an existing entry wins.
        self.objects_mut()?.entry(id).or_insert_with(|| data.into());
        Ok(())
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.objects()?.len())
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Total bytes across all stored objects.
    pub fn total_bytes(&self) -> StoreResult<u64> {
        Ok(self
            .objects()?
            .values()
            .map(|data| data.len() as u64)
            .sum())
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore for InMemoryContentStore {
    fn put(&self, data: &[u8]) -> StoreResult<Identifier> {
        let id = ContentHasher::digest(data);
        self.insert(id, data)?;
        Ok(id)
    }

    fn get(&self, id: &Identifier) -> StoreResult<Vec<u8>> {
        self.objects()?
            .get(id)
            .map(|data| data.to_vec())
            .ok_or(StoreError::NotFound(*id))
    }

    fn contains(&self, id: &Identifier) -> StoreResult<bool> {
        Ok(self.objects()?.contains_key(id))
    }

    fn open_writer(&self) -> StoreResult<Box<dyn ContentWriter + '_>> {
        Ok(Box::new(MemoryContentWriter::new(self)))
    }

    fn open_reader(&self, id: &Identifier) -> StoreResult<Box<dyn ContentReader + '_>> {
        let data = self
            .objects()?
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound(*id))?;
        Ok(Box::new(MemoryContentReader {
            id: *id,
            cursor: Cursor::new(data),
        }))
    }

    fn as_search(&self) -> Option<&dyn ContentSearch> {
        Some(self)
    }
}

impl ContentSearch for InMemoryContentStore {
    fn find_content(&self, prefix: &IdPrefix) -> StoreResult<Vec<Identifier>> {
        let mut ids: Vec<Identifier> = self
            .objects()?
            .keys()
            .filter(|id| prefix.matches(id))
            .copied()
            .collect();
        ids.sort();
        Ok(ids)
    }
}

impl std::fmt::Debug for InMemoryContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryContentStore")
            .field("object_count", &self.len().ok())
            .finish()
    }
}

struct OpenBuffer {
    data: Vec<u8>,
    hasher: ContentHasher,
}

/// Streaming writer for [`InMemoryContentStore`]. Buffers everything and
/// inserts it into the map on close.
pub struct MemoryContentWriter<'a> {
    store: &'a InMemoryContentStore,
    state: WriterState<OpenBuffer>,
    written: u64,
}

impl<'a> MemoryContentWriter<'a> {
    pub fn new(store: &'a InMemoryContentStore) -> Self {
        Self {
            store,
            state: WriterState::Open(OpenBuffer {
                data: Vec::new(),
                hasher: ContentHasher::new(),
            }),
            written: 0,
        }
    }
}

impl Write for MemoryContentWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let open = self.state.open_mut()?;
        open.data.extend_from_slice(buf);
        open.hasher.update(buf);
        self.written += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.state.open_mut().map(|_| ())
    }
}

impl Drop for MemoryContentWriter<'_> {
    fn drop(&mut self) {
        if self.state.is_open() {
            debug!(bytes = self.written, "discarding unfinished content writer");
        }
    }
}

impl ContentWriter for MemoryContentWriter<'_> {
    fn close(&mut self) -> StoreResult<()> {
        let Some(open) = self.state.take_open()? else {
            return Ok(());
        };
        let id = open.hasher.finalize();
        self.store.insert(id, open.data)?;
        self.state = WriterState::Closed(id);
        Ok(())
    }

    fn finalize(&mut self) -> StoreResult<Identifier> {
        self.close()?;
        self.state.closed_id()
    }

    fn is_closed(&self) -> bool {
        !self.state.is_open()
    }

    fn bytes_written(&self) -> u64 {
        self.written
    }
}

/// Streaming reader for [`InMemoryContentStore`].
pub struct MemoryContentReader {
    id: Identifier,
    cursor: Cursor<Arc<[u8]>>,
}

impl Read for MemoryContentReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl ContentReader for MemoryContentReader {
    fn id(&self) -> &Identifier {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    // -----------------------------------------------------------------------
    // Core put / get
    // -----------------------------------------------------------------------

    #[test]
    fn put_and_get_hello() {
        let store = InMemoryContentStore::new();
        let id = store.put(b"hello").unwrap();
        assert_eq!(id.to_hex(), HELLO_SHA256);
        assert_eq!(store.get(&id).unwrap(), b"hello");
    }

    #[test]
    fn empty_content_roundtrips() {
        let store = InMemoryContentStore::new();
        let id = store.put(b"").unwrap();
        assert_eq!(store.get(&id).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn same_content_is_stored_once() {
        let store = InMemoryContentStore::new();
        let id1 = store.put(b"identical content").unwrap();
        let id2 = store.put(b"identical content").unwrap();
        assert_eq!(id1, id2);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn different_content_produces_different_ids() {
        let store = InMemoryContentStore::new();
        let id1 = store.put(b"aaa").unwrap();
        let id2 = store.put(b"bbb").unwrap();
        assert_ne!(id1, id2);
        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(store.total_bytes().unwrap(), 6);
    }

    #[test]
    fn get_missing_is_not_found() {
        let store = InMemoryContentStore::new();
        let id = Identifier::from_hex(&"00".repeat(32)).unwrap();
        assert!(matches!(store.get(&id), Err(StoreError::NotFound(_))));
        assert!(!store.contains(&id).unwrap());
    }

    // -----------------------------------------------------------------------
    // Streaming
    // -----------------------------------------------------------------------

    #[test]
    fn writer_foo_bar() {
        let store = InMemoryContentStore::new();
        let mut writer = store.open_writer().unwrap();
        writer.write_all(b"foo").unwrap();
        writer.write_all(b"bar").unwrap();
        assert_eq!(writer.bytes_written(), 6);
        let id = writer.finalize().unwrap();
        assert_eq!(id, ContentHasher::digest(b"foobar"));
        assert_eq!(store.get(&id).unwrap(), b"foobar");
    }

    #[test]
    fn writer_publishes_on_close_only() {
        let store = InMemoryContentStore::new();
        let mut writer = store.open_writer().unwrap();
        writer.write_all(b"later").unwrap();
        assert!(store.is_empty().unwrap());
        writer.close().unwrap();
        assert_eq!(store.len().unwrap(), 1);
        writer.close().unwrap();
        assert_eq!(writer.finalize().unwrap(), ContentHasher::digest(b"later"));
        assert!(writer.write_all(b"more").is_err());
    }

    #[test]
    fn dropped_writer_stores_nothing() {
        let store = InMemoryContentStore::new();
        {
            let mut writer = store.open_writer().unwrap();
            writer.write_all(b"abandoned").unwrap();
        }
        assert!(store.is_empty().unwrap());
    }

    fn poison(store: &InMemoryContentStore) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.objects.write().unwrap();
            panic!("writer thread died holding the lock");
        }));
    }

    #[test]
    fn failed_publish_keeps_failing() {
        let store = InMemoryContentStore::new();
        let mut writer = store.open_writer().unwrap();
        writer.write_all(b"payload").unwrap();
        poison(&store);

        assert!(matches!(writer.close(), Err(StoreError::LockPoisoned(_))));
        assert!(matches!(writer.close(), Err(StoreError::PublishFailed)));
        assert!(matches!(writer.finalize(), Err(StoreError::PublishFailed)));
        assert!(writer.is_closed());
        assert!(writer.write_all(b"more").is_err());
    }

    #[test]
    fn poisoned_store_counts_are_errors() {
        let store = InMemoryContentStore::new();
        store.put(b"x").unwrap();
        poison(&store);
        assert!(matches!(store.len(), Err(StoreError::LockPoisoned(_))));
        assert!(store.is_empty().is_err());
        assert!(store.total_bytes().is_err());
        assert!(format!("{store:?}").contains("object_count: None"));
    }

    #[test]
    fn reader_cursor_semantics() {
        let store = InMemoryContentStore::new();
        let id = store.put(b"hello world").unwrap();
        let mut reader = store.open_reader(&id).unwrap();
        assert_eq!(reader.read_chunk(Some(5)).unwrap(), b"hello");
        assert_eq!(reader.read_chunk(Some(1)).unwrap(), b" ");
        assert_eq!(reader.read_chunk(None).unwrap(), b"world");
        assert!(reader.read_chunk(None).unwrap().is_empty());

        let mut fresh = store.open_reader(&id).unwrap();
        assert_eq!(fresh.read_chunk(None).unwrap(), b"hello world");
    }

    #[test]
    fn reader_for_missing_content_fails() {
        let store = InMemoryContentStore::new();
        assert!(matches!(
            store.open_reader(&Identifier::random()).map(|_| ()),
            Err(StoreError::NotFound(_))
        ));
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    #[test]
    fn find_content_all_and_exact() {
        let store = InMemoryContentStore::new();
        let a = store.put(b"a").unwrap();
        let b = store.put(b"b").unwrap();

        let all = store.find_content(&IdPrefix::all()).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.contains(&a) && all.contains(&b));
        assert_eq!(store.find_content(&IdPrefix::from(a)).unwrap(), vec![a]);
    }

    #[test]
    fn check_passes_for_intact_content() {
        let store = InMemoryContentStore::new();
        let id = store.put(b"intact").unwrap();
        store.check(&id).unwrap();
    }

    // -----------------------------------------------------------------------
    // Concurrency / Debug
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_puts_of_same_content() {
        use std::thread;

        let store = Arc::new(InMemoryContentStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.put(b"shared data").unwrap())
            })
            .collect();
        let ids: Vec<Identifier> = handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .collect();
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn debug_format() {
        let store = InMemoryContentStore::new();
        store.put(b"x").unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryContentStore"));
        assert!(debug.contains("object_count"));
    }

    proptest! {
        #[test]
        fn put_get_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            let store = InMemoryContentStore::new();
            let id = store.put(&data).unwrap();
            prop_assert_eq!(id, ContentHasher::digest(&data));
            prop_assert_eq!(store.get(&id).unwrap(), data);
        }
    }
}
