//! Memo cache for resolved message bodies.
//!
//! `ResolutionCache` stores resolved text keyed by body identity plus the
//! profile snapshot version it was resolved against, so views holding
//! snapshots of different ages each get a stable hit. The newest resolution
//! per body is also tracked as the base for the next version's `changed`
//! flag. Uses LRU eviction when the cache is full.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use super::ResolvedText;

/// Caches resolved text to avoid re-resolving unchanged bodies.
/// Keyed by body identity + snapshot version.
pub struct ResolutionCache {
    /// Cache entries: (identity, version) -> resolution.
    entries: LruCache<(u64, u64), Arc<ResolvedText>>,
    /// Highest cached version per identity.
    latest: HashMap<u64, u64>,
    /// Number of cache hits.
    hit_count: u64,
    /// Number of cache misses.
    miss_count: u64,
}

impl std::fmt::Debug for ResolutionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionCache")
            .field("stats", &self.stats())
            .finish()
    }
}

impl ResolutionCache {
    /// Create a cache holding at most `max_entries` resolutions (minimum 1).
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            latest: HashMap::new(),
            hit_count: 0,
            miss_count: 0,
        }
    }

    /// Look up a resolution for `identity` at exactly `version`.
    ///
    /// `source` is the body's plain text. An entry whose source differs is
    /// an identity collision and counts as a miss.
    pub fn get(
        &mut self,
        identity: u64,
        version: u64,
        source: &str,
    ) -> Option<Arc<ResolvedText>> {
        match self.entries.get(&(identity, version)) {
            Some(resolved) if resolved.run.text() == source => {
                self.hit_count += 1;
                Some(Arc::clone(resolved))
            }
            Some(_) => {
                log::warn!(
                    "Body identity {:016x} collides with a different body, re-resolving",
                    identity
                );
                self.miss_count += 1;
                None
            }
            None => {
                self.miss_count += 1;
                None
            }
        }
    }

    /// The newest cached resolution for `identity` whose source is `source`.
    ///
    /// Does not count as a hit or touch the LRU order.
    pub fn previous(&self, identity: u64, source: &str) -> Option<Arc<ResolvedText>> {
        let version = self.latest.get(&identity)?;
        self.entries
            .peek(&(identity, *version))
            .filter(|resolved| resolved.run.text() == source)
            .cloned()
    }

    /// Store a resolution under its own version.
    pub fn put(&mut self, identity: u64, resolved: Arc<ResolvedText>) {
        let key = (identity, resolved.version);
        if let Some((evicted, _)) = self.entries.push(key, resolved)
            && evicted != key
        {
            log::trace!("Evicted resolved body {:016x} v{}", evicted.0, evicted.1);
            if self.latest.get(&evicted.0) == Some(&evicted.1) {
                self.latest.remove(&evicted.0);
            }
        }

        let newest = self.latest.entry(identity).or_insert(key.1);
        if *newest < key.1 {
            *newest = key.1;
        }
    }

    /// Drop every cached version of one body.
    pub fn invalidate(&mut self, identity: u64) -> bool {
        let keys: Vec<(u64, u64)> = self
            .entries
            .iter()
            .map(|(key, _)| *key)
            .filter(|(id, _)| *id == identity)
            .collect();
        for key in &keys {
            self.entries.pop(key);
        }
        self.latest.remove(&identity);
        !keys.is_empty()
    }

    /// Clear all cached entries and reset statistics.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.latest.clear();
        self.hit_count = 0;
        self.miss_count = 0;
    }

    /// Get cache statistics (for diagnostics).
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.entries.len(),
            max_entries: self.entries.cap().get(),
            hit_count: self.hit_count,
            miss_count: self.miss_count,
        }
    }
}

/// Cache statistics for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Current number of cached entries.
    pub entry_count: usize,
    /// Maximum number of cached entries.
    pub max_entries: usize,
    /// Number of cache hits.
    pub hit_count: u64,
    /// Number of cache misses.
    pub miss_count: u64,
}
