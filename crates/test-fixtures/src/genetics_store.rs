use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use crossbreed_core::traits::IGeneticsLookup;
use crossbreed_core::{CrossError, CrossOutcome, ParentGenetics, ParentRef};

/// Genetics store backed by a map keyed by canonical parent ref.
#[derive(Default)]
pub struct InMemoryGeneticsLookup {
    records: RwLock<HashMap<String, ParentGenetics>>,
    lookups: AtomicUsize,
}

impl InMemoryGeneticsLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with `genetics/parents.json`.
    pub fn from_fixtures() -> Self {
        let store = Self::new();
        for record in crate::fixture_parents() {
            store.insert(record);
        }
        store
    }

    /// Insert or replace a record. Records with an invalid parent ref are ignored.
    pub fn insert(&self, record: ParentGenetics) {
        if let Ok(canonical) = record.parent.canonical() {
            self.records
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(canonical, record);
        }
    }

    pub fn remove(&self, parent: &str) -> Option<ParentGenetics> {
        let canonical = ParentRef::from(parent).canonical().ok()?;
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&canonical)
    }

    /// Number of `lookup` calls served so far, hits and misses alike.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl IGeneticsLookup for InMemoryGeneticsLookup {
    fn lookup(&self, parent: &ParentRef) -> CrossOutcome<ParentGenetics> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let canonical = parent.canonical()?;
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&canonical)
            .cloned()
            .ok_or_else(|| CrossError::parent_not_found(parent.as_str()))
    }
}
