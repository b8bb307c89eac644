use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use gentledb_crypto::ContentHasher;
use gentledb_types::{IdPrefix, Identifier};
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::error::{StoreError, StoreResult};
use crate::layout::{
    self, Overwrite, ScratchArea, ShardedDir, CONTENT_DIR, CONTENT_FILE_MODE, SCRATCH_DIR,
};
use crate::stream::{ContentReader, ContentWriter, WriterState};
use crate::traits::{ContentSearch, ContentStore};

/// Tuning knobs for [`FsContentStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FsOptions {
    /// `fsync` each scratch file before it is renamed into place.
    pub sync_writes: bool,
}

impl Default for FsOptions {
    fn default() -> Self {
        Self { sync_writes: true }
    }
}

/// Durable content store on the local filesystem.
///
/// Objects live under `<base>/content_db` in the sharded layout described
/// in [`crate::layout`]; in-flight writes live under `<base>/tmp`. Content
/// files are read-only once published.
pub struct FsContentStore {
    base: PathBuf,
    objects: ShardedDir,
    scratch: ScratchArea,
    options: FsOptions,
}

impl FsContentStore {
    /// Open (or create) a store rooted at `base`.
    pub fn open(base: impl AsRef<Path>) -> StoreResult<Self> {
        Self::with_options(base, FsOptions::default())
    }

    pub fn with_options(base: impl AsRef<Path>, options: FsOptions) -> StoreResult<Self> {
        let base = base.as_ref().to_path_buf();
        layout::create_private_dir(&base)?;
        let objects = ShardedDir::open(base.join(CONTENT_DIR))?;
        let scratch = ScratchArea::open(base.join(SCRATCH_DIR))?;
        debug!(base = %base.display(), "opened filesystem content store");
        Ok(Self {
            base,
            objects,
            scratch,
            options,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn options(&self) -> &FsOptions {
        &self.options
    }

    /// Final on-disk path of a content object.
    pub fn path_for(&self, id: &Identifier) -> PathBuf {
        self.objects.path_for(id)
    }

    /// Move a completed scratch file into its sharded location, or discard
    /// it if identical content is already there.
    fn publish(&self, scratch: NamedTempFile, id: &Identifier) -> StoreResult<()> {
        let dest = self.objects.prepare(id)?;
        if dest.exists() {
            debug!(id = %id.short_hex(), "content already stored; discarding scratch");
            return Ok(());
        }
        if layout::publish(
            scratch,
            &dest,
            CONTENT_FILE_MODE,
            Overwrite::Never,
            self.options.sync_writes,
        )? {
            debug!(id = %id.short_hex(), "published content");
        }
        Ok(())
    }
}

impl ContentStore for FsContentStore {
    #[instrument(skip_all)]
    fn put(&self, data: &[u8]) -> StoreResult<Identifier> {
        let id = ContentHasher::digest(data);
        if self.objects.path_for(&id).exists() {
            debug!(id = %id.short_hex(), "skipping put: already stored");
            return Ok(id);
        }
        let mut scratch = self.scratch.create()?;
        scratch.write_all(data)?;
        self.publish(scratch, &id)?;
        Ok(id)
    }

    fn get(&self, id: &Identifier) -> StoreResult<Vec<u8>> {
        match std::fs::read(self.objects.path_for(id)) {
            Ok(data) => Ok(data),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound(*id)),
            Err(err) => Err(err.into()),
        }
    }

    fn contains(&self, id: &Identifier) -> StoreResult<bool> {
        Ok(self.objects.path_for(id).try_exists()?)
    }

    fn open_writer(&self) -> StoreResult<Box<dyn ContentWriter + '_>> {
        Ok(Box::new(FsContentWriter::new(self)?))
    }

    fn open_reader(&self, id: &Identifier) -> StoreResult<Box<dyn ContentReader + '_>> {
        Ok(Box::new(FsContentReader::open(self, id)?))
    }

    fn as_search(&self) -> Option<&dyn ContentSearch> {
        Some(self)
    }
}

impl ContentSearch for FsContentStore {
    fn find_content(&self, prefix: &IdPrefix) -> StoreResult<Vec<Identifier>> {
        Ok(self.objects.scan(prefix)?)
    }
}

impl std::fmt::Debug for FsContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsContentStore")
            .field("base", &self.base)
            .field("sync_writes", &self.options.sync_writes)
            .finish()
    }
}

struct OpenScratch {
    file: BufWriter<NamedTempFile>,
    hasher: ContentHasher,
}

/// Streaming writer for [`FsContentStore`].
///
/// Bytes go straight to a scratch file in `<base>/tmp` while the running
/// hash is updated; closing publishes the scratch file under the final
/// hash. Dropping an open writer deletes the scratch file.
pub struct FsContentWriter<'a> {
    store: &'a FsContentStore,
    state: WriterState<OpenScratch>,
    written: u64,
}

impl<'a> FsContentWriter<'a> {
    pub fn new(store: &'a FsContentStore) -> StoreResult<Self> {
        let scratch = store.scratch.create()?;
        Ok(Self {
            store,
            state: WriterState::Open(OpenScratch {
                file: BufWriter::new(scratch),
                hasher: ContentHasher::new(),
            }),
            written: 0,
        })
    }
}

impl Write for FsContentWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let open = self.state.open_mut()?;
        let n = open.file.write(buf)?;
        open.hasher.update(&buf[..n]);
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.state.open_mut()?.file.flush()
    }
}

impl ContentWriter for FsContentWriter<'_> {
    fn close(&mut self) -> StoreResult<()> {
        let Some(open) = self.state.take_open()? else {
            return Ok(());
        };
        let id = open.hasher.finalize();
        let scratch = open.file.into_inner().map_err(|e| e.into_error())?;
        self.store.publish(scratch, &id)?;
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

impl Drop for FsContentWriter<'_> {
    fn drop(&mut self) {
        if self.state.is_open() {
            debug!(bytes = self.written, "discarding unfinished content writer");
        }
    }
}

/// Streaming reader for [`FsContentStore`].
pub struct FsContentReader {
    id: Identifier,
    file: BufReader<File>,
}

impl FsContentReader {
    pub fn open(store: &FsContentStore, id: &Identifier) -> StoreResult<Self> {
        let file = match File::open(store.path_for(id)) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(*id))
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            id: *id,
            file: BufReader::new(file),
        })
    }
}

impl Read for FsContentReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl ContentReader for FsContentReader {
    fn id(&self) -> &Identifier {
        &self.id
    }
}
