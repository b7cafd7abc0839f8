//! Reader-scoped caches for derived group data.
//!
//! Entries hold only a weak reference to their [`ReaderGeneration`]; once the
//! last strong handle is dropped the entry is dead and is pruned on the next
//! access. Values are built outside the lock, so two threads missing on the
//! same key may both build it. The structures are equivalent and the later
//! insert wins.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

use tracing::{debug, trace};

use crate::{error::FacetError, source::ReaderGeneration};

/// Cached values for one reader.
struct CacheEntry<T> {
    /// Id of the reader the values were built from.
    generation: u64,
    /// Liveness of that reader.
    reader: Weak<ReaderGeneration>,
    /// Values by key.
    values: HashMap<String, Arc<T>>,
}

/// A process-wide map from (reader, key) to shared immutable data.
pub struct ReaderCache<T> {
    /// Short label used in log output.
    label: &'static str,
    /// One entry per live reader.
    entries: Mutex<Vec<CacheEntry<T>>>,
}

impl<T> ReaderCache<T> {
    /// Creates an empty cache.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Returns the cached value for `key`, building it with `build` on a miss.
    pub fn get_or_build<F>(
        &self,
        reader: &Arc<ReaderGeneration>,
        key: &str,
        build: F,
    ) -> Result<Arc<T>, FacetError>
    where
        F: FnOnce() -> Result<T, FacetError>,
    {
        if let Some(value) = self.lookup(reader, key) {
            trace!(cache = self.label, key, "cache hit");
            return Ok(value);
        }

        debug!(cache = self.label, key, generation = reader.id(), "cache miss, building");
        let value = Arc::new(build()?);

        let mut entries = self.lock();
        prune(&mut entries);
        let index = match entries.iter().position(|e| e.generation == reader.id()) {
            Some(index) => index,
            None => {
                entries.push(CacheEntry {
                    generation: reader.id(),
                    reader: Arc::downgrade(reader),
                    values: HashMap::new(),
                });
                entries.len() - 1
            }
        };
        entries[index]
            .values
            .insert(key.to_string(), Arc::clone(&value));
        debug!(cache = self.label, key, readers = entries.len(), "cached");

        Ok(value)
    }

    /// Drops every value cached for `reader`.
    pub fn evict(&self, reader: &ReaderGeneration) {
        let mut entries = self.lock();
        entries.retain(|e| e.generation != reader.id());
        prune(&mut entries);
    }

    /// Number of readers with live cache entries.
    #[cfg(test)]
    pub fn reader_count(&self) -> usize {
        let mut entries = self.lock();
        prune(&mut entries);
        entries.len()
    }

    /// Looks up a value without building it.
    fn lookup(&self, reader: &ReaderGeneration, key: &str) -> Option<Arc<T>> {
        let mut entries = self.lock();
        prune(&mut entries);
        entries
            .iter()
            .find(|e| e.generation == reader.id())
            .and_then(|e| e.values.get(key))
            .cloned()
    }

    /// Locks the entry list, ignoring poisoning.
    fn lock(&self) -> MutexGuard<'_, Vec<CacheEntry<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Removes entries whose reader has been dropped.
fn prune<T>(entries: &mut Vec<CacheEntry<T>>) {
    entries.retain(|e| e.reader.strong_count() > 0);
}
