//! On-disk layout shared by the filesystem backends.
//!
//! ```text
//! <base>/content_db/<id[0:2]>/<id[2:4]>/<id[4:7]>/<id[7:]>   dir 0700, file 0400
//! <base>/pointer_db/<id[0:2]>/<id[2:4]>/<id[4:7]>/<id[7:]>   dir 0700, file 0600
//! <base>/tmp/                                                 scratch, 0700
//! ```
//!
//! Splitting identifiers into `2/2/3/57` character segments keeps any one
//! directory at no more than 256, 256 and 4096 entries. Shard directories
//! are created lazily on the first write into them and never removed.
//!
//! Every file enters the tree through [`publish`]: bytes go to a private
//! scratch file under `tmp/`, its mode is fixed, and a single rename moves
//! it into place. Readers see a finished file or no file at all.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use gentledb_types::{IdPrefix, Identifier};
use tempfile::NamedTempFile;
use tracing::debug;
use walkdir::WalkDir;

/// Directory holding content objects.
pub const CONTENT_DIR: &str = "content_db";
/// Directory holding pointer files.
pub const POINTER_DIR: &str = "pointer_db";
/// Scratch area for in-flight writes.
pub const SCRATCH_DIR: &str = "tmp";

pub const DIR_MODE: u32 = 0o700;
pub const CONTENT_FILE_MODE: u32 = 0o400;
pub const POINTER_FILE_MODE: u32 = 0o600;

/// Number of directory levels above each leaf file.
const SHARD_DEPTH: usize = 3;

/// Create `path` and any missing parents with owner-only permissions.
pub fn create_private_dir(path: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder.create(path)
}

/// Set unix permission bits. A no-op on other platforms.
pub fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = (path, mode);
    Ok(())
}

/// How [`publish`] treats an existing destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overwrite {
    /// Keep the existing file and discard the scratch file.
    Never,
    /// Atomically replace the existing file.
    Replace,
}

/// Move a finished scratch file to `dest` with a single rename.
///
/// Returns `true` if the scratch file became `dest`, `false` if `dest`
/// already existed and `overwrite` is [`Overwrite::Never`]. In that case
/// the scratch file is deleted.
pub fn publish(
    scratch: NamedTempFile,
    dest: &Path,
    mode: u32,
    overwrite: Overwrite,
    sync: bool,
) -> io::Result<bool> {
    if sync {
        scratch.as_file().sync_all()?;
    }
    set_mode(scratch.path(), mode)?;
    match overwrite {
        Overwrite::Replace => {
            scratch.persist(dest).map_err(|e| e.error)?;
            Ok(true)
        }
        Overwrite::Never => match scratch.persist_noclobber(dest) {
            Ok(_) => Ok(true),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path = %dest.display(), "destination appeared during publish; discarding scratch");
                Ok(false)
            }
            Err(e) => Err(e.error),
        },
    }
}

/// The scratch directory where in-flight writes live until published.
#[derive(Clone, Debug)]
pub struct ScratchArea {
    dir: PathBuf,
}

impl ScratchArea {
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        create_private_dir(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// A new, uniquely named scratch file. It is deleted when dropped unless
    /// it has been published.
    pub fn create(&self) -> io::Result<NamedTempFile> {
        tempfile::Builder::new()
            .prefix("scratch-")
            .tempfile_in(&self.dir)
    }
}

/// A directory tree of identifier-named files in the sharded layout.
#[derive(Clone, Debug)]
pub struct ShardedDir {
    root: PathBuf,
}

impl ShardedDir {
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        create_private_dir(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Final path of `id`. Does not touch the filesystem.
    pub fn path_for(&self, id: &Identifier) -> PathBuf {
        let mut path = self.root.clone();
        for segment in id.shard() {
            path.push(segment);
        }
        path
    }

    /// Final path of `id`, creating its shard directories if needed.
    pub fn prepare(&self, id: &Identifier) -> io::Result<PathBuf> {
        let path = self.path_for(id);
        if let Some(parent) = path.parent() {
            create_private_dir(parent)?;
        }
        Ok(path)
    }

    /// All identifiers stored under this tree that start with `prefix`,
    /// sorted.
    ///
    /// Shard directories whose accumulated name cannot lead to a match are
    /// pruned without being read. Files that do not sit at the path their
    /// name implies are ignored.
    pub fn scan(&self, prefix: &IdPrefix) -> io::Result<Vec<Identifier>> {
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(SHARD_DEPTH + 1)
            .into_iter()
            .filter_entry(|entry| {
                self.relative_hex(entry.path())
                    .is_some_and(|partial| prefix.admits(&partial))
            });

        let mut ids = Vec::new();
        for entry in walker {
            let entry = entry?;
            if entry.depth() != SHARD_DEPTH + 1 || !entry.file_type().is_file() {
                continue;
            }
            let Some(hex) = self.relative_hex(entry.path()) else {
                continue;
            };
            match Identifier::from_hex(&hex) {
                Ok(id) if self.path_for(&id) == entry.path() && prefix.matches(&id) => {
                    ids.push(id)
                }
                Ok(_) => {}
                Err(_) => debug!(path = %entry.path().display(), "ignoring stray file"),
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn relative_hex(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let mut hex = String::new();
        for component in relative.components() {
            hex.push_str(component.as_os_str().to_str()?);
        }
        Some(hex)
    }
}
