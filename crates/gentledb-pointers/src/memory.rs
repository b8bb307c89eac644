//! In-memory pointer store for testing and ephemeral use.
//!
//! [`InMemoryPointerStore`] stores all pointers in a `HashMap` protected by a
//! `RwLock`. Data is lost when the store is dropped.

use std::collections::HashMap;
use std::sync::RwLock;

use gentledb_types::{IdPrefix, Identifier};
use tracing::debug;

use crate::error::{PointerError, Result};
use crate::traits::{PointerSearch, PointerStore};

/// An in-memory implementation of [`PointerStore`].
#[derive(Debug, Default)]
pub struct InMemoryPointerStore {
    pointers: RwLock<HashMap<Identifier, Identifier>>,
}

impl InMemoryPointerStore {
    /// Create a new empty pointer store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pointers currently set.
    pub fn len(&self) -> Result<usize> {
        Ok(self.pointers.read().map_err(poisoned)?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> PointerError {
    PointerError::LockPoisoned(e.to_string())
}

impl PointerStore for InMemoryPointerStore {
    fn read(&self, pointer: &Identifier) -> Result<Option<Identifier>> {
        let pointers = self.pointers.read().map_err(poisoned)?;
        Ok(pointers.get(pointer).copied())
    }

    fn set(&self, pointer: &Identifier, target: Option<&Identifier>) -> Result<()> {
        let mut pointers = self.pointers.write().map_err(poisoned)?;
        match target {
            Some(target) => {
                pointers.insert(*pointer, *target);
                debug!(pointer = %pointer.short_hex(), target = %target.short_hex(), "pointer set");
            }
            None => {
                pointers
                    .remove(pointer)
                    .ok_or(PointerError::NotFound(*pointer))?;
                debug!(pointer = %pointer.short_hex(), "pointer deleted");
            }
        }
        Ok(())
    }

    fn as_search(&self) -> Option<&dyn PointerSearch> {
        Some(self)
    }
}

impl PointerSearch for InMemoryPointerStore {
    fn find_pointers(&self, prefix: &IdPrefix) -> Result<Vec<Identifier>> {
        let pointers = self.pointers.read().map_err(poisoned)?;
        let mut ids: Vec<Identifier> = pointers
            .keys()
            .filter(|id| prefix.matches(id))
            .copied()
            .collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deadbeef() -> Identifier {
        Identifier::from_hex(&"deadbeef".repeat(8)).unwrap()
    }

    // ---- Test 1: set then get ----
    #[test]
    fn set_and_get() {
        let store = InMemoryPointerStore::new();
        let target = Identifier::random();
        store.set(&deadbeef(), Some(&target)).unwrap();
        assert_eq!(store.get(&deadbeef()).unwrap(), target);
        assert_eq!(store.read(&deadbeef()).unwrap(), Some(target));
    }

    // ---- Test 2: last set wins ----
    #[test]
    fn overwrite_replaces_target() {
        let store = InMemoryPointerStore::new();
        let c1 = Identifier::random();
        let c2 = Identifier::random();
        store.set(&deadbeef(), Some(&c1)).unwrap();
        store.set(&deadbeef(), Some(&c2)).unwrap();
        assert_eq!(store.get(&deadbeef()).unwrap(), c2);
        assert_eq!(store.len().unwrap(), 1);
    }

    // ---- Test 3: delete then get fails ----
    #[test]
    fn delete_removes_pointer() {
        let store = InMemoryPointerStore::new();
        store.set(&deadbeef(), Some(&Identifier::random())).unwrap();
        store.set(&deadbeef(), None).unwrap();
        assert!(matches!(
            store.get(&deadbeef()),
            Err(PointerError::NotFound(p)) if p == deadbeef()
        ));
        assert!(store.is_empty().unwrap());
    }

    // ---- Test 4: delete of unset pointer fails ----
    #[test]
    fn delete_unset_is_not_found() {
        let store = InMemoryPointerStore::new();
        assert!(matches!(
            store.delete(&deadbeef()),
            Err(PointerError::NotFound(_))
        ));
    }

    // ---- Test 5: read of unset pointer ----
    #[test]
    fn read_unset_is_none() {
        let store = InMemoryPointerStore::new();
        assert!(store.read(&Identifier::random()).unwrap().is_none());
    }

    // ---- Test 6: prefix search ----
    #[test]
    fn find_pointers_by_prefix() {
        let store = InMemoryPointerStore::new();
        let target = Identifier::random();
        let a = Identifier::from_bytes([0xaa; 32]);
        let b = Identifier::from_bytes([0xab; 32]);
        store.set(&a, Some(&target)).unwrap();
        store.set(&b, Some(&target)).unwrap();
        store.set(&deadbeef(), Some(&target)).unwrap();

        assert_eq!(store.find_pointers(&IdPrefix::all()).unwrap().len(), 3);
        assert_eq!(
            store.find_pointers(&IdPrefix::new("a").unwrap()).unwrap(),
            vec![a, b]
        );
        assert_eq!(
            store.find_pointers(&IdPrefix::from(deadbeef())).unwrap(),
            vec![deadbeef()]
        );
        assert!(store.as_search().is_some());
    }

    // ---- Test 7: poisoned lock is reported, not read as empty ----
    #[test]
    fn poisoned_lock_is_an_error() {
        let store = InMemoryPointerStore::new();
        store.set(&deadbeef(), Some(&Identifier::random())).unwrap();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.pointers.write().unwrap();
            panic!("writer thread died holding the lock");
        }));
        assert!(matches!(store.len(), Err(PointerError::LockPoisoned(_))));
        assert!(store.is_empty().is_err());
        assert!(matches!(
            store.read(&deadbeef()),
            Err(PointerError::LockPoisoned(_))
        ));
    }
}
