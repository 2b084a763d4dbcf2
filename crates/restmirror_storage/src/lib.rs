//! # RestMirror Storage
//!
//! Persistent cache backends for RestMirror.
//!
//! The mirror store keeps its data in memory. A cache backend lets it
//! survive process restarts: every change-notified type is written back as a
//! serialized JSON array, and a namespace is hydrated from the backend when
//! it is first activated.
//!
//! ## Design Principles
//!
//! - Backends are opaque string stores addressed by `(namespace, type)`
//! - No knowledge of records, keys or schemas
//! - Must be `Send + Sync` so a single backend can be shared by the engine
//!   and its notification hooks
//!
//! ## Available Backends
//!
//! - [`MemoryCache`] - For testing and ephemeral sessions
//! - [`FileCache`] - One JSON file per namespace/type under a directory
//!
//! ## Example
//!
//! ```rust
//! use restmirror_storage::{CacheBackend, MemoryCache};
//!
//! let cache = MemoryCache::new();
//! cache.set("base", "tasks", "[]").unwrap();
//! assert_eq!(cache.get("base", "tasks").unwrap().as_deref(), Some("[]"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::{validate_segment, CacheBackend, CacheEntry};
pub use error::{StorageError, StorageResult};
pub use file::FileCache;
pub use memory::MemoryCache;
