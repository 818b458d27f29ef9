//! Bounded read-through cache of rupture attributions.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lru::LruCache;
use tracing::debug;

use super::attributor::RuptureAttribution;
use crate::rupture::RuptureId;

/// LRU cache of computed attributions keyed by rupture id.
///
/// The lock is never held while computing, so concurrent misses for the same
/// id may compute twice; the first stored result wins and every caller sees
/// an identical value. A zero capacity disables caching entirely.
pub struct AttributionCache {
    entries: Option<Mutex<LruCache<RuptureId, Arc<RuptureAttribution>>>>,
}

impl AttributionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    /// A cache that stores nothing.
    pub fn disabled() -> Self {
        Self { entries: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    fn lock(
        entries: &Mutex<LruCache<RuptureId, Arc<RuptureAttribution>>>,
    ) -> MutexGuard<'_, LruCache<RuptureId, Arc<RuptureAttribution>>> {
        // Entries are immutable once stored, so a poisoned lock holds valid data.
        entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, id: RuptureId) -> Option<Arc<RuptureAttribution>> {
        let entries = self.entries.as_ref()?;
        Self::lock(entries).get(&id).cloned()
    }

    /// Returns the cached attribution for `id`, computing and storing it on a
    /// miss. Errors are returned to the caller and never cached.
    pub fn get_or_try_insert<E>(
        &self,
        id: RuptureId,
        compute: impl FnOnce() -> Result<RuptureAttribution, E>,
    ) -> Result<Arc<RuptureAttribution>, E> {
        let Some(entries) = self.entries.as_ref() else {
            return compute().map(Arc::new);
        };

        if let Some(hit) = Self::lock(entries).get(&id).cloned() {
            debug!(rupture_id = id, "attribution cache hit");
            return Ok(hit);
        }

        debug!(rupture_id = id, "attribution cache miss");
        let computed = Arc::new(compute()?);
        let stored = Self::lock(entries).get_or_insert(id, || computed).clone();
        Ok(stored)
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map(|e| Self::lock(e).len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Some(entries) = self.entries.as_ref() {
            Self::lock(entries).clear();
        }
    }
}

impl Default for AttributionCache {
    fn default() -> Self {
        Self::new(256)
    }
}

impl std::fmt::Debug for AttributionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributionCache")
            .field("enabled", &self.is_enabled())
            .field("len", &self.len())
            .finish()
    }
}
