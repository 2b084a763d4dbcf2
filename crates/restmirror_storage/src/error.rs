//! Error types for cache operations.

use std::io;
use thiserror::Error;

/// Result type for cache operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A namespace or type name cannot be used as a cache key.
    #[error("invalid cache key segment: {segment:?}")]
    InvalidKey {
        /// The rejected segment.
        segment: String,
    },

    /// A cache entry is not valid UTF-8 text.
    #[error("cache entry corrupted: {0}")]
    Corrupted(String),
}

impl StorageError {
    /// Creates an invalid key error.
    pub fn invalid_key(segment: impl Into<String>) -> Self {
        Self::InvalidKey {
            segment: segment.into(),
        }
    }
}
