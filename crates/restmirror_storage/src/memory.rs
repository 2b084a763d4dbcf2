//! In-memory cache backend for testing.

use crate::backend::{validate_segment, CacheBackend, CacheEntry};
use crate::error::StorageResult;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// An in-memory cache backend.
///
/// This backend keeps all entries in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Sessions that should not outlive the process
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use restmirror_storage::{CacheBackend, MemoryCache};
///
/// let cache = MemoryCache::new();
/// cache.set("tenant-1", "users", r#"[{"id":1}]"#).unwrap();
/// assert_eq!(cache.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<BTreeMap<(String, String), String>>,
}

impl MemoryCache {
    /// Creates a new empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl CacheBackend for MemoryCache {
    fn get(&self, namespace: &str, type_name: &str) -> StorageResult<Option<String>> {
        Ok(self
            .entries
            .read()
            .get(&(namespace.to_string(), type_name.to_string()))
            .cloned())
    }

    fn set(&self, namespace: &str, type_name: &str, serialized: &str) -> StorageResult<()> {
        validate_segment(namespace)?;
        validate_segment(type_name)?;
        self.entries.write().insert(
            (namespace.to_string(), type_name.to_string()),
            serialized.to_string(),
        );
        Ok(())
    }

    fn remove(&self, namespace: &str, type_name: &str) -> StorageResult<()> {
        self.entries
            .write()
            .remove(&(namespace.to_string(), type_name.to_string()));
        Ok(())
    }

    fn entries(&self) -> StorageResult<Vec<CacheEntry>> {
        Ok(self
            .entries
            .read()
            .iter()
            .map(|((namespace, type_name), text)| CacheEntry {
                namespace: namespace.clone(),
                type_name: type_name.clone(),
                len: text.len(),
            })
            .collect())
    }
}
