//! LRU cache of decoded payloads.
//!
//! Training consumers walk sliding windows of consecutive timesteps, so the
//! same file is requested several times in a row. The cache keeps decoded
//! payloads keyed by file path and the payload asked for.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::container::RpBinReader;
use crate::error::Result;
use crate::payload::{Payload, PayloadKind};
use crate::types::CacheStats;

/// Which payload of a file a lookup refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadQuery {
    /// The raw payload at a scaling factor.
    Raw { scale: u16 },
    /// The prepared feature payload.
    Prepared,
}

impl PayloadQuery {
    /// The query a payload answers.
    pub fn for_payload(payload: &Payload) -> Self {
        match payload {
            Payload::Raw(raw) => Self::Raw {
                scale: raw.scaling(),
            },
            Payload::Prepared(_) => Self::Prepared,
        }
    }

    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Raw { .. } => PayloadKind::Raw,
            Self::Prepared => PayloadKind::Prepared,
        }
    }
}

/// Cache key: (file path, payload query).
pub type CacheKey = (PathBuf, PayloadQuery);

/// Single-threaded LRU cache of decoded payloads.
pub struct PayloadCache {
    cache: LruCache<CacheKey, Arc<Payload>>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl PayloadCache {
    /// Create a cache holding at most `capacity` payloads.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Look up a payload without touching the file system.
    pub fn get(&mut self, path: &Path, query: PayloadQuery) -> Option<Arc<Payload>> {
        let key = (path.to_path_buf(), query);
        match self.cache.get(&key) {
            Some(payload) => {
                self.hits += 1;
                Some(Arc::clone(payload))
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Return the payload, reading the file on a miss.
    ///
    /// A miss decodes the whole file. The requested payload is cached, and
    /// the file's other payloads (the first one per query) fill whatever
    /// capacity is spare without evicting anything. `Ok(None)` means the
    /// file has no such payload.
    pub fn get_or_load(&mut self, path: &Path, query: PayloadQuery) -> Result<Option<Arc<Payload>>> {
        if let Some(payload) = self.get(path, query) {
            tracing::trace!(path = %path.display(), ?query, "Payload cache hit");
            return Ok(Some(payload));
        }

        tracing::debug!(path = %path.display(), ?query, "Payload cache miss, reading file");
        let reader = RpBinReader::open(path)?;

        let mut found = None;
        let mut seen = Vec::new();
        let mut siblings = Vec::new();
        for payload in reader.into_payloads() {
            let payload_query = PayloadQuery::for_payload(&payload);
            if seen.contains(&payload_query) {
                continue;
            }
            seen.push(payload_query);

            if payload_query == query {
                found = Some(Arc::new(payload));
            } else {
                siblings.push((payload_query, payload));
            }
        }

        // Keep one slot for the requested payload.
        let reserved = usize::from(found.is_some());
        for (sibling_query, payload) in siblings {
            let key = (path.to_path_buf(), sibling_query);
            if self.cache.contains(&key) || self.cache.len() + reserved < self.capacity() {
                self.insert(key.0, sibling_query, Arc::new(payload));
            }
        }

        if let Some(payload) = &found {
            self.insert(path.to_path_buf(), query, Arc::clone(payload));
        }
        Ok(found)
    }

    /// Insert a payload, evicting the least recently used entry if full.
    pub fn insert(&mut self, path: PathBuf, query: PayloadQuery, payload: Arc<Payload>) {
        let key = (path, query);
        if let Some((evicted, _)) = self.cache.push(key.clone(), payload) {
            if evicted != key {
                self.evictions += 1;
                tracing::trace!(path = %evicted.0.display(), query = ?evicted.1, "Evicted payload");
            }
        }
    }

    /// Check if a key exists in the cache without updating LRU order.
    pub fn contains(&self, path: &Path, query: PayloadQuery) -> bool {
        self.cache.contains(&(path.to_path_buf(), query))
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.cache.len(),
            evictions: self.evictions,
        }
    }

    /// Clear all entries from the cache.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }
}
