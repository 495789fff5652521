//
// content_cache.rs
//
// Version-gated LRU cache of rendered source text
//

use std::num::NonZeroUsize;
use std::sync::{Arc, RwLock};

use lru::LruCache;
use tower_lsp::lsp_types::Url;

use crate::types::SourceText;

/// Default capacity for the content cache
const DEFAULT_CONTENT_CACHE_CAPACITY: usize = 10;

/// Cached source text keyed by URI.
///
/// Entries are only created for sources whose line count exceeds the
/// configured threshold; small sources are always re-read, trading a
/// little I/O for freshness simplicity. A lookup hits only when the
/// stored version equals the queried version, so stale content is never
/// returned. Reads refresh recency; inserting past capacity evicts the
/// least-recently-accessed entry.
pub struct PreviewContentCache {
    inner: RwLock<LruCache<Url, Arc<SourceText>>>,
    line_threshold: usize,
}

impl std::fmt::Debug for PreviewContentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewContentCache").finish_non_exhaustive()
    }
}

impl Default for PreviewContentCache {
    fn default() -> Self {
        Self::new(DEFAULT_CONTENT_CACHE_CAPACITY, 5000)
    }
}

impl PreviewContentCache {
    pub fn new(capacity: usize, line_threshold: usize) -> Self {
        let cap = NonZeroUsize::new(capacity)
            .unwrap_or(NonZeroUsize::new(DEFAULT_CONTENT_CACHE_CAPACITY).unwrap());
        Self {
            inner: RwLock::new(LruCache::new(cap)),
            line_threshold,
        }
    }

    /// Get cached text if present at exactly the queried version.
    /// A hit refreshes recency; a miss routes the caller to a fresh read.
    pub fn get(&self, uri: &Url, version: i32) -> Option<Arc<SourceText>> {
        let mut guard = self.inner.write().ok()?;
        match guard.get(uri) {
            Some(cached) if cached.version == version => Some(cached.clone()),
            Some(_) => {
                log::trace!("content cache version mismatch for {}", uri);
                None
            }
            None => None,
        }
    }

    /// Insert or overwrite an entry, refreshing recency.
    /// Sources at or below the line threshold are never cached.
    pub fn put(&self, uri: Url, source: Arc<SourceText>) {
        if source.line_count <= self.line_threshold {
            return;
        }
        if let Ok(mut guard) = self.inner.write() {
            guard.push(uri, source);
        }
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.inner.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
