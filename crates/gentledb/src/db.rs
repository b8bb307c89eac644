use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use gentledb_pointers::{FsPointerStore, InMemoryPointerStore, PointerSearch, PointerStore};
use gentledb_store::{
    ContentReader, ContentSearch, ContentStore, ContentWriter, FsContentStore, FsOptions,
    InMemoryContentStore,
};
use gentledb_types::{IdPrefix, Identifier};
use tracing::info;

use crate::config::{BackendConfig, GentleDbConfig};
use crate::error::{DbError, DbResult};

/// The storage substrate behind a [`GentleDb`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// Sharded directory tree on the local filesystem.
    Durable,
    /// Process-local maps; nothing survives the process.
    Volatile,
}

/// High-level GentleDB API.
///
/// Holds one content store and one pointer store from the same backend.
/// Every method behaves the same whichever backend is in use.
pub struct GentleDb {
    backend: Backend,
    base_dir: Option<PathBuf>,
    content: Box<dyn ContentStore>,
    pointers: Box<dyn PointerStore>,
}

impl GentleDb {
    /// Open a database as described by `config`.
    pub fn open(config: &GentleDbConfig) -> DbResult<Self> {
        match &config.storage {
            BackendConfig::Filesystem {
                base_dir,
                sync_writes,
            } => Self::open_dir_with(
                base_dir,
                FsOptions {
                    sync_writes: *sync_writes,
                },
            ),
            BackendConfig::Memory => Ok(Self::in_memory()),
        }
    }

    /// Open (or create) a durable database rooted at `base_dir`.
    pub fn open_dir(base_dir: impl AsRef<Path>) -> DbResult<Self> {
        Self::open_dir_with(base_dir, FsOptions::default())
    }

    pub fn open_dir_with(base_dir: impl AsRef<Path>, options: FsOptions) -> DbResult<Self> {
        let base_dir = base_dir.as_ref();
        let content = FsContentStore::with_options(base_dir, options.clone())?;
        let pointers = FsPointerStore::with_options(base_dir, options)?;
        info!(base_dir = %base_dir.display(), "opened durable database");
        Ok(Self {
            backend: Backend::Durable,
            base_dir: Some(base_dir.to_path_buf()),
            content: Box::new(content),
            pointers: Box::new(pointers),
        })
    }

    /// Open the per-user database at `$HOME/.gentledb`, creating it if
    /// missing.
    pub fn open_default() -> DbResult<Self> {
        let base_dir = GentleDbConfig::default_location()
            .ok_or_else(|| DbError::Config("HOME is not set".into()))?;
        Self::open_dir(base_dir)
    }

    /// A new, empty volatile database.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Volatile,
            base_dir: None,
            content: Box::new(InMemoryContentStore::new()),
            pointers: Box::new(InMemoryPointerStore::new()),
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Root directory of a durable database.
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    // ---- Content operations ----

    /// Store bytes and return their content identifier.
    pub fn put(&self, data: &[u8]) -> DbResult<Identifier> {
        Ok(self.content.put(data)?)
    }

    /// Read stored bytes.
    pub fn get(&self, id: &Identifier) -> DbResult<Vec<u8>> {
        Ok(self.content.get(id)?)
    }

    pub fn contains(&self, id: &Identifier) -> DbResult<bool> {
        Ok(self.content.contains(id)?)
    }

    /// Rehash stored content and compare it with its identifier.
    pub fn check(&self, id: &Identifier) -> DbResult<()> {
        Ok(self.content.check(id)?)
    }

    /// A fresh random identifier, for pointers without a meaningful name.
    pub fn random(&self) -> Identifier {
        Identifier::random()
    }

    // ---- Streaming ----

    /// Start an incremental write. Prefer [`write_with`](Self::write_with),
    /// which cannot leave a writer unfinished.
    pub fn open_writer(&self) -> DbResult<Box<dyn ContentWriter + '_>> {
        Ok(self.content.open_writer()?)
    }

    pub fn open_reader(&self, id: &Identifier) -> DbResult<Box<dyn ContentReader + '_>> {
        Ok(self.content.open_reader(id)?)
    }

    /// Run `f` against a fresh writer and finalize it.
    ///
    /// If `f` fails the writer is dropped unpublished and the error is
    /// returned; on success the content identifier is returned.
    pub fn write_with<F>(&self, f: F) -> DbResult<Identifier>
    where
        F: FnOnce(&mut dyn ContentWriter) -> io::Result<()>,
    {
        let mut writer = self.content.open_writer()?;
        f(&mut *writer)?;
        Ok(writer.finalize()?)
    }

    /// Stream everything `reader` yields into the content store.
    pub fn put_reader(&self, reader: &mut dyn Read) -> DbResult<Identifier> {
        Ok(self.content.put_reader(reader)?)
    }

    // ---- Pointer operations ----

    /// Target of a pointer.
    pub fn pointer(&self, pointer: &Identifier) -> DbResult<Identifier> {
        Ok(self.pointers.get(pointer)?)
    }

    /// Target of a pointer, or `None` if it is not set.
    pub fn try_pointer(&self, pointer: &Identifier) -> DbResult<Option<Identifier>> {
        Ok(self.pointers.read(pointer)?)
    }

    /// Point `pointer` at `target`; `None` removes the pointer.
    pub fn set_pointer(&self, pointer: &Identifier, target: Option<&Identifier>) -> DbResult<()> {
        Ok(self.pointers.set(pointer, target)?)
    }

    pub fn delete_pointer(&self, pointer: &Identifier) -> DbResult<()> {
        Ok(self.pointers.delete(pointer)?)
    }

    // ---- Capabilities ----

    /// Prefix search, if both stores of this backend support enumeration.
    pub fn search(&self) -> Option<Search<'_>> {
        Some(Search {
            content: self.content.as_search()?,
            pointers: self.pointers.as_search()?,
        })
    }
}

impl fmt::Debug for GentleDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GentleDb")
            .field("backend", &self.backend)
            .field("base_dir", &self.base_dir)
            .finish()
    }
}

/// Prefix enumeration over a [`GentleDb`]. Obtained from
/// [`GentleDb::search`].
pub struct Search<'a> {
    content: &'a dyn ContentSearch,
    pointers: &'a dyn PointerSearch,
}

impl Search<'_> {
    /// Content identifiers starting with `prefix` (a partial identifier).
    pub fn find_content(&self, prefix: &str) -> DbResult<Vec<Identifier>> {
        let prefix = IdPrefix::new(prefix)?;
        Ok(self.content.find_content(&prefix)?)
    }

    /// Pointer identifiers starting with `prefix` (a partial identifier).
    pub fn find_pointers(&self, prefix: &str) -> DbResult<Vec<Identifier>> {
        let prefix = IdPrefix::new(prefix)?;
        Ok(self.pointers.find_pointers(&prefix)?)
    }
}
