//! Translation result cache.
//!
//! Keys are `(text, source | "auto", target)`. Entries are write-once: a
//! translation cached for a key is reused for the lifetime of the cache and
//! never replaced. By default the cache is unbounded, matching the site's
//! original process-lifetime behavior; a capacity can be configured to
//! bound memory in long-running processes.

use std::fmt;

use moka::future::Cache;

use crate::lang::Lang;

/// Source marker used when the source language is left to detection.
pub const AUTO_SOURCE: &str = "auto";

/// Cache key for one translation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Text as submitted.
    pub text: String,
    /// Source language code, or [`AUTO_SOURCE`].
    pub source: String,
    /// Target language.
    pub target: Lang,
}

impl CacheKey {
    /// Builds the key for translating `text` from `source` into `target`.
    #[must_use]
    pub fn new(text: &str, source: Option<Lang>, target: Lang) -> Self {
        Self {
            text: text.to_string(),
            source: source.map_or_else(|| AUTO_SOURCE.to_string(), |lang| lang.code().to_string()),
            target,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.text, self.source, self.target)
    }
}

/// In-memory translation cache.
#[derive(Clone)]
pub struct TranslationCache {
    entries: Cache<CacheKey, String>,
}

impl fmt::Debug for TranslationCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationCache").field("entries", &self.entries.entry_count()).finish()
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(None)
    }
}

impl TranslationCache {
    /// Creates a cache, unbounded when `max_capacity` is `None`.
    #[must_use]
    pub fn new(max_capacity: Option<u64>) -> Self {
        let builder = Cache::builder();
        let entries = match max_capacity {
            Some(capacity) => builder.max_capacity(capacity).build(),
            None => builder.build(),
        };
        Self { entries }
    }

    /// Returns the cached translation for `key`.
    pub async fn get(&self, key: &CacheKey) -> Option<String> {
        self.entries.get(key).await
    }

    /// Stores `translation` unless `key` already has one.
    ///
    /// Returns the value now cached for `key`.
    pub async fn insert(&self, key: CacheKey, translation: String) -> String {
        self.entries.entry(key).or_insert(translation).await.into_value()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Removes every entry whose target is `target`.
    ///
    /// Returns the number of entries removed.
    pub async fn clear_language(&self, target: Lang) -> usize {
        let keys: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(key, _)| key.target == target)
            .map(|(key, _)| CacheKey::clone(&key))
            .collect();

        for key in &keys {
            self.entries.invalidate(key).await;
        }
        keys.len()
    }

    /// Approximate number of entries. Call [`sync`](Self::sync) first for an
    /// exact count.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Applies pending maintenance so counts are exact.
    pub async fn sync(&self) {
        self.entries.run_pending_tasks().await;
    }
}
