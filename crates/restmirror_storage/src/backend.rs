//! Cache backend trait definition.

use crate::error::{StorageError, StorageResult};

/// A persistent cache for serialized record lists.
///
/// Backends are **opaque string stores**. The engine serializes each type's
/// records to a JSON array and hands the text to the backend; the backend
/// never parses it.
///
/// # Invariants
///
/// - `get` returns exactly the text previously passed to `set` for the
///   same `(namespace, type)` pair, or `None`
/// - `set` overwrites any previous entry
/// - `remove` of an absent entry is not an error
/// - Backends must be `Send + Sync`
///
/// # Implementors
///
/// - [`super::MemoryCache`] - For testing
/// - [`super::FileCache`] - For persistence across sessions
pub trait CacheBackend: Send + Sync {
    /// Reads the serialized records of `type_name` in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry exists but cannot be read.
    fn get(&self, namespace: &str, type_name: &str) -> StorageResult<Option<String>>;

    /// Stores the serialized records of `type_name` in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the write fails.
    fn set(&self, namespace: &str, type_name: &str, serialized: &str) -> StorageResult<()>;

    /// Removes the entry for `type_name` in `namespace`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry exists but cannot be removed.
    fn remove(&self, namespace: &str, type_name: &str) -> StorageResult<()>;

    /// Lists every stored entry, ordered by namespace then type.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be enumerated.
    fn entries(&self) -> StorageResult<Vec<CacheEntry>>;
}

/// Address and size of one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CacheEntry {
    /// Namespace the entry belongs to.
    pub namespace: String,
    /// Entity type name.
    pub type_name: String,
    /// Length of the serialized text in bytes.
    pub len: usize,
}

/// Checks that a namespace or type name is usable as a cache key segment.
///
/// Segments must be non-empty and must not contain path separators or
/// start with a dot, so that file-backed caches can map them to file
/// names directly.
///
/// # Errors
///
/// Returns [`StorageError::InvalidKey`] for unusable segments.
pub fn validate_segment(segment: &str) -> StorageResult<()> {
    if segment.is_empty()
        || segment.starts_with('.')
        || segment.contains(['/', '\\', '\0'])
    {
        return Err(StorageError::invalid_key(segment));
    }
    Ok(())
}
