//! Durable pointer store on the local filesystem.
//!
//! Each pointer is a file under `<base>/pointer_db`, sharded like content,
//! whose bytes are the 64-character hex target with no trailing newline.
//! Updates are written to a scratch file and renamed over the old pointer,
//! so a reader sees either the previous target or the new one.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use gentledb_store::layout::{
    self, Overwrite, ScratchArea, ShardedDir, POINTER_DIR, POINTER_FILE_MODE, SCRATCH_DIR,
};
use gentledb_store::FsOptions;
use gentledb_types::{IdPrefix, Identifier};
use tracing::debug;

use crate::error::{PointerError, Result};
use crate::traits::{PointerSearch, PointerStore};

/// A filesystem implementation of [`PointerStore`].
#[derive(Debug)]
pub struct FsPointerStore {
    base: PathBuf,
    pointers: ShardedDir,
    scratch: ScratchArea,
    options: FsOptions,
}

impl FsPointerStore {
    /// Open (or create) a pointer store rooted at `base`.
    pub fn open(base: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(base, FsOptions::default())
    }

    pub fn with_options(base: impl AsRef<Path>, options: FsOptions) -> Result<Self> {
        let base = base.as_ref().to_path_buf();
        layout::create_private_dir(&base)?;
        let pointers = ShardedDir::open(base.join(POINTER_DIR))?;
        let scratch = ScratchArea::open(base.join(SCRATCH_DIR))?;
        Ok(Self {
            base,
            pointers,
            scratch,
            options,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    /// On-disk path of a pointer file.
    pub fn path_for(&self, pointer: &Identifier) -> PathBuf {
        self.pointers.path_for(pointer)
    }

    fn write(&self, pointer: &Identifier, target: &Identifier) -> Result<()> {
        let dest = self.pointers.prepare(pointer)?;
        let mut scratch = self.scratch.create()?;
        scratch.write_all(target.to_hex().as_bytes())?;
        layout::publish(
            scratch,
            &dest,
            POINTER_FILE_MODE,
            Overwrite::Replace,
            self.options.sync_writes,
        )?;
        debug!(pointer = %pointer.short_hex(), target = %target.short_hex(), "pointer set");
        Ok(())
    }

    fn remove(&self, pointer: &Identifier) -> Result<()> {
        match std::fs::remove_file(self.path_for(pointer)) {
            Ok(()) => {
                debug!(pointer = %pointer.short_hex(), "pointer deleted");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(PointerError::NotFound(*pointer))
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl PointerStore for FsPointerStore {
    fn read(&self, pointer: &Identifier) -> Result<Option<Identifier>> {
        let text = match std::fs::read_to_string(self.path_for(pointer)) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                return Err(PointerError::Corrupt {
                    pointer: *pointer,
                    reason: "not UTF-8".into(),
                })
            }
            Err(err) => return Err(err.into()),
        };
        let target = Identifier::from_hex(&text).map_err(|e| PointerError::Corrupt {
            pointer: *pointer,
            reason: e.to_string(),
        })?;
        Ok(Some(target))
    }

    fn set(&self, pointer: &Identifier, target: Option<&Identifier>) -> Result<()> {
        match target {
            Some(target) => self.write(pointer, target),
            None => self.remove(pointer),
        }
    }

    fn as_search(&self) -> Option<&dyn PointerSearch> {
        Some(self)
    }
}

impl PointerSearch for FsPointerStore {
    fn find_pointers(&self, prefix: &IdPrefix) -> Result<Vec<Identifier>> {
        Ok(self.pointers.scan(prefix)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_store() -> (tempfile::TempDir, FsPointerStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPointerStore::with_options(
            dir.path().join("db"),
            FsOptions { sync_writes: false },
        )
        .unwrap();
        (dir, store)
    }

    fn deadbeef() -> Identifier {
        Identifier::from_hex(&"deadbeef".repeat(8)).unwrap()
    }

    #[test]
    fn set_get_overwrite_delete() {
        let (_dir, store) = temp_store();
        let c1 = Identifier::random();
        let c2 = Identifier::random();

        store.set(&deadbeef(), Some(&c1)).unwrap();
        assert_eq!(store.get(&deadbeef()).unwrap(), c1);

        store.set(&deadbeef(), Some(&c2)).unwrap();
        assert_eq!(store.get(&deadbeef()).unwrap(), c2);

        store.delete(&deadbeef()).unwrap();
        assert!(matches!(
            store.get(&deadbeef()),
            Err(PointerError::NotFound(_))
        ));
        assert!(matches!(
            store.delete(&deadbeef()),
            Err(PointerError::NotFound(_))
        ));
    }

    #[test]
    fn pointer_file_holds_bare_hex() {
        let (_dir, store) = temp_store();
        let target = Identifier::random();
        store.set(&deadbeef(), Some(&target)).unwrap();

        let path = store.path_for(&deadbeef());
        let expected = store
            .base_dir()
            .join(POINTER_DIR)
            .join("de")
            .join("ad")
            .join("bee")
            .join(&"deadbeef".repeat(8)[7..]);
        assert_eq!(path, expected);
        assert_eq!(fs::read_to_string(&path).unwrap(), target.to_hex());
    }

    #[cfg(unix)]
    #[test]
    fn pointer_files_are_read_write() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, store) = temp_store();
        store.set(&deadbeef(), Some(&Identifier::random())).unwrap();
        let mode = fs::metadata(store.path_for(&deadbeef()))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, POINTER_FILE_MODE);
    }

    #[test]
    fn no_scratch_files_left_after_updates() {
        let (_dir, store) = temp_store();
        for _ in 0..3 {
            store.set(&deadbeef(), Some(&Identifier::random())).unwrap();
        }
        let scratch = store.base_dir().join(SCRATCH_DIR);
        assert_eq!(fs::read_dir(scratch).unwrap().count(), 0);
    }

    #[test]
    fn reopen_keeps_pointers() {
        let (dir, store) = temp_store();
        let target = Identifier::random();
        store.set(&deadbeef(), Some(&target)).unwrap();
        drop(store);

        let reopened = FsPointerStore::open(dir.path().join("db")).unwrap();
        assert_eq!(reopened.get(&deadbeef()).unwrap(), target);
    }

    #[test]
    fn corrupt_pointer_file_is_reported() {
        let (_dir, store) = temp_store();
        store.set(&deadbeef(), Some(&Identifier::random())).unwrap();
        fs::write(store.path_for(&deadbeef()), b"garbage").unwrap();
        assert!(matches!(
            store.get(&deadbeef()),
            Err(PointerError::Corrupt { .. })
        ));
    }

    #[test]
    fn find_pointers_walks_layout() {
        let (_dir, store) = temp_store();
        let target = Identifier::random();
        let a = Identifier::from_bytes([0x10; 32]);
        let b = Identifier::from_bytes([0x20; 32]);
        store.set(&a, Some(&target)).unwrap();
        store.set(&b, Some(&target)).unwrap();

        assert_eq!(store.find_pointers(&IdPrefix::all()).unwrap(), vec![a, b]);
        assert_eq!(
            store.find_pointers(&IdPrefix::new("2020").unwrap()).unwrap(),
            vec![b]
        );

        store.delete(&a).unwrap();
        assert_eq!(store.find_pointers(&IdPrefix::all()).unwrap(), vec![b]);
    }
}
