/*!
 * Parse result caching.
 *
 * Parsing is a pure function of the text, so a result can be shared for as
 * long as the `(document, revision)` pair it came from.
 */

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use parking_lot::RwLock;
use log::debug;

use super::template::ParseResult;
use super::unit::Rev;

/// Cache key: a document at one revision
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    /// Document name
    document: String,

    /// Revision number
    revision: Rev,
}

impl CacheKey {
    /// Create a new cache key
    fn new(document: &str, revision: Rev) -> Self {
        Self {
            document: document.to_string(),
            revision,
        }
    }
}

/// Stored entries plus their insertion order for eviction
#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, Arc<ParseResult>>,
    order: VecDeque<CacheKey>,
}

/// Shared cache of parse results
pub struct ParseCache {
    /// Internal cache storage
    state: Arc<RwLock<CacheState>>,

    /// Cache hit counter
    hits: Arc<RwLock<usize>>,

    /// Cache miss counter
    misses: Arc<RwLock<usize>>,

    /// Oldest entries are dropped beyond this size
    max_entries: usize,

    /// Whether caching is enabled
    enabled: bool,
}

impl ParseCache {
    /// Create a new parse cache
    pub fn new(enabled: bool, max_entries: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(CacheState::default())),
            hits: Arc::new(RwLock::new(0)),
            misses: Arc::new(RwLock::new(0)),
            max_entries: max_entries.max(1),
            enabled,
        }
    }

    /// Get a parse result from the cache
    pub fn get(&self, document: &str, revision: Rev) -> Option<Arc<ParseResult>> {
        if !self.enabled {
            return None;
        }

        let key = CacheKey::new(document, revision);
        let state = self.state.read();

        match state.entries.get(&key) {
            Some(result) => {
                *self.hits.write() += 1;
                debug!("Parse cache hit for '{}' @ {}", document, revision);
                Some(result.clone())
            }
            None => {
                *self.misses.write() += 1;
                debug!("Parse cache miss for '{}' @ {}", document, revision);
                None
            }
        }
    }

    /// Store a parse result in the cache
    pub fn store(&self, document: &str, revision: Rev, result: Arc<ParseResult>) {
        if !self.enabled {
            return;
        }

        let key = CacheKey::new(document, revision);
        let mut state = self.state.write();

        if state.entries.insert(key.clone(), result).is_none() {
            state.order.push_back(key);
        }

        while state.entries.len() > self.max_entries {
            match state.order.pop_front() {
                Some(oldest) => {
                    state.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    /// Drop every cached revision of a document
    pub fn invalidate(&self, document: &str) {
        let mut state = self.state.write();
        state.entries.retain(|key, _| key.document != document);
        state.order.retain(|key| key.document != document);
        debug!("Parse cache invalidated for '{}'", document);
    }

    /// Get cache statistics
    pub fn stats(&self) -> (usize, usize, f64) {
        let hits = *self.hits.read();
        let misses = *self.misses.read();
        let total = hits + misses;

        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        (hits, misses, hit_rate)
    }

    /// Get the number of entries in the cache
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }

    /// Check if the cache is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::new(true, 256)
    }
}

impl Clone for ParseCache {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            hits: self.hits.clone(),
            misses: self.misses.clone(),
            max_entries: self.max_entries,
            enabled: self.enabled,
        }
    }
}
