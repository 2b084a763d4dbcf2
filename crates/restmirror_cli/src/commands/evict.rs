//! Evict command implementation.

use restmirror_storage::{CacheBackend, FileCache};
use std::path::Path;

/// Removes one cached type. Returns false if nothing was cached.
pub fn evict(cache: &dyn CacheBackend, namespace: &str, type_name: &str) -> Result<bool, Box<dyn std::error::Error>> {
    let existed = cache.get(namespace, type_name)?.is_some();
    cache.remove(namespace, type_name)?;
    Ok(existed)
}

/// Runs the evict command.
pub fn run(path: &Path, namespace: &str, type_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let cache = FileCache::open(path)?;
    if evict(&cache, namespace, type_name)? {
        println!("Evicted {namespace}/{type_name}");
    } else {
        println!("Nothing cached for {namespace}/{type_name}");
    }
    Ok(())
}
