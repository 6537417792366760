//! Explicit cache port for memoizing blob fetches and fast change counts.
//!
//! Caching is a performance concern only: every operation must be safely
//! callable on every invocation with [`NoopCache`] installed, and the
//! comparison results must not depend on which implementation is in use.

use std::collections::HashMap;
use std::sync::Mutex;

/// Key identifying one blob fetch: the ref and the path within its tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobKey {
    /// Ref name the blob was resolved against.
    pub reference: String,
    /// Path of the blob within the ref's tree.
    pub path: String,
}

impl BlobKey {
    /// Build a key from the full argument tuple of a blob fetch.
    pub fn new(reference: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            path: path.into(),
        }
    }
}

/// Memoization port consumed by the comparison orchestrator.
///
/// A cached blob value of `None` records an Absent result; absence is as
/// cacheable as content. Implementations are scoped to a single repository
/// clone, matching the session lifecycle.
pub trait CompareCache: Send + Sync {
    /// Look up a previously fetched blob. The outer `Option` is a cache
    /// miss; the inner one is the fetch result itself.
    fn get_blob(&self, key: &BlobKey) -> Option<Option<String>>;

    /// Record a blob fetch result.
    fn put_blob(&self, key: BlobKey, value: Option<String>);

    /// Look up a previously computed fast change count for a content pair.
    fn get_change_count(&self, first: &str, second: &str) -> Option<u32>;

    /// Record a fast change count for a content pair.
    fn put_change_count(&self, first: &str, second: &str, count: u32);
}

/// Cache implementation that remembers nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

impl CompareCache for NoopCache {
    fn get_blob(&self, _key: &BlobKey) -> Option<Option<String>> {
        None
    }

    fn put_blob(&self, _key: BlobKey, _value: Option<String>) {}

    fn get_change_count(&self, _first: &str, _second: &str) -> Option<u32> {
        None
    }

    fn put_change_count(&self, _first: &str, _second: &str, _count: u32) {}
}

/// In-memory cache keyed by the full argument tuples.
#[derive(Debug, Default)]
pub struct MemoryCache {
    blobs: Mutex<HashMap<BlobKey, Option<String>>>,
    counts: Mutex<HashMap<(String, String), u32>>,
}

impl MemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every cached value, e.g. after the underlying clone changed.
    pub fn clear(&self) {
        if let Ok(mut blobs) = self.blobs.lock() {
            blobs.clear();
        }
        if let Ok(mut counts) = self.counts.lock() {
            counts.clear();
        }
    }
}

impl CompareCache for MemoryCache {
    fn get_blob(&self, key: &BlobKey) -> Option<Option<String>> {
        self.blobs.lock().ok()?.get(key).cloned()
    }

    fn put_blob(&self, key: BlobKey, value: Option<String>) {
        if let Ok(mut blobs) = self.blobs.lock() {
            blobs.insert(key, value);
        }
    }

    fn get_change_count(&self, first: &str, second: &str) -> Option<u32> {
        self.counts
            .lock()
            .ok()?
            .get(&(first.to_owned(), second.to_owned()))
            .copied()
    }

    fn put_change_count(&self, first: &str, second: &str, count: u32) {
        if let Ok(mut counts) = self.counts.lock() {
            counts.insert((first.to_owned(), second.to_owned()), count);
        }
    }
}
