//! In-process media cache keyed by primary key.
//!
//! Entries are replaced wholesale or evicted, never mutated in place, and
//! reads hand out clones, so callers can never corrupt a cached entry. There
//! is no expiry, size bound or persistence: entries live as long as the
//! cache does.

use dashmap::DashMap;

use crate::domain::Media;

/// Media metadata cache
#[derive(Debug, Default)]
pub struct MediaCache {
    entries: DashMap<u64, Media>,
}

impl MediaCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of the cached media
    pub fn get(&self, media_pk: u64) -> Option<Media> {
        self.entries.get(&media_pk).map(|entry| entry.value().clone())
    }

    /// Store media, replacing any previous entry
    pub fn put(&self, media_pk: u64, media: Media) {
        self.entries.insert(media_pk, media);
    }

    /// Remove an entry; no-op when absent
    pub fn evict(&self, media_pk: u64) {
        self.entries.remove(&media_pk);
    }

    pub fn contains(&self, media_pk: u64) -> bool {
        self.entries.contains_key(&media_pk)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.clear();
    }
}
