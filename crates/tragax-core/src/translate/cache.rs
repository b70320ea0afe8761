//! Translation cache.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use serde::Serialize;

/// Cache key: normalized text plus the language pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub text: String,
    pub from: String,
    pub to: String,
}

impl CacheKey {
    pub fn new(normalized: &str, from: &str, to: &str) -> Self {
        Self {
            text: normalized.to_string(),
            from: from.to_lowercase(),
            to: to.to_lowercase(),
        }
    }
}

/// Snapshot of the cache counters.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    /// Keys rendered as `text_from_to`, sorted.
    pub keys: Vec<String>,
}

/// Resolved translations keyed by [`CacheKey`].
///
/// Owned by one resolver and shared by reference. When `capacity` entries are
/// reached the cache is emptied before the next insert.
#[derive(Debug)]
pub struct TranslationCache {
    entries: RwLock<HashMap<CacheKey, String>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

impl TranslationCache {
    pub const DEFAULT_CAPACITY: usize = 10_000;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<String> {
        let found = self
            .entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned();
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    pub fn insert(&self, key: CacheKey, translation: String) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            entries.clear();
            tracing::debug!("translation cache cleared at capacity {}", self.capacity);
        }
        entries.insert(key, translation);
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let mut keys: Vec<String> = entries
            .keys()
            .map(|k| format!("{}_{}_{}", k.text, k.from, k.to))
            .collect();
        keys.sort();
        CacheStats {
            size: entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            keys,
        }
    }
}
