//! Named response caches

use crate::request::Response;
use std::collections::BTreeMap;

/// One named cache of responses keyed by URL
#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
    entries: BTreeMap<String, Response>,
}

impl ResponseCache {
    pub fn get(&self, key: &str) -> Option<&Response> {
        self.entries.get(key)
    }

    pub fn put(&mut self, key: impl Into<String>, response: Response) {
        self.entries.insert(key.into(), response);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Every cache the shell has created, by name
#[derive(Debug, Clone, Default)]
pub struct CacheStorage {
    caches: BTreeMap<String, ResponseCache>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a cache, creating it when missing
    pub fn open(&mut self, name: &str) -> &mut ResponseCache {
        self.caches.entry(name.to_string()).or_default()
    }

    pub fn get(&self, name: &str) -> Option<&ResponseCache> {
        self.caches.get(name)
    }

    /// Insert a fully built cache, replacing any with the same name
    pub fn insert(&mut self, name: impl Into<String>, cache: ResponseCache) {
        self.caches.insert(name.into(), cache);
    }

    pub fn delete(&mut self, name: &str) -> bool {
        self.caches.remove(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        self.caches.keys().cloned().collect()
    }
}
