//! File-based cache backend for persistence across sessions.

use crate::backend::{validate_segment, CacheBackend, CacheEntry};
use crate::error::{StorageError, StorageResult};
use parking_lot::Mutex;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const ENTRY_EXTENSION: &str = "json";

/// A directory-backed cache.
///
/// Each entry lives at `<root>/<namespace>/<type>.json`. Data survives
/// process restarts.
///
/// # Durability
///
/// Writes go to a temporary sibling file which is synced and then renamed
/// over the entry, so a reader never observes a half-written entry.
///
/// # Thread Safety
///
/// Writers are serialized by an internal lock; reads are lock-free.
///
/// # Example
///
/// ```no_run
/// use restmirror_storage::{CacheBackend, FileCache};
/// use std::path::Path;
///
/// let cache = FileCache::open(Path::new("mirror-cache")).unwrap();
/// cache.set("base", "tasks", "[]").unwrap();
/// ```
#[derive(Debug)]
pub struct FileCache {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCache {
    /// Opens a cache rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: &Path) -> StorageResult<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    /// Returns the cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, namespace: &str, type_name: &str) -> StorageResult<PathBuf> {
        validate_segment(namespace)?;
        validate_segment(type_name)?;
        Ok(self
            .root
            .join(namespace)
            .join(format!("{type_name}.{ENTRY_EXTENSION}")))
    }
}

impl CacheBackend for FileCache {
    fn get(&self, namespace: &str, type_name: &str) -> StorageResult<Option<String>> {
        let path = self.entry_path(namespace, type_name)?;
        match fs::read(&path) {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| StorageError::Corrupted(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, namespace: &str, type_name: &str, serialized: &str) -> StorageResult<()> {
        let path = self.entry_path(namespace, type_name)?;
        let _guard = self.write_lock.lock();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(serialized.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &path)?;
        tracing::trace!(namespace, type_name, bytes = serialized.len(), "cache entry written");
        Ok(())
    }

    fn remove(&self, namespace: &str, type_name: &str) -> StorageResult<()> {
        let path = self.entry_path(namespace, type_name)?;
        let _guard = self.write_lock.lock();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn entries(&self) -> StorageResult<Vec<CacheEntry>> {
        let mut entries = Vec::new();
        for namespace_dir in fs::read_dir(&self.root)? {
            let namespace_dir = namespace_dir?;
            if !namespace_dir.file_type()?.is_dir() {
                continue;
            }
            let namespace = namespace_dir.file_name().to_string_lossy().into_owned();
            for file in fs::read_dir(namespace_dir.path())? {
                let file = file?;
                let path = file.path();
                if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXTENSION) {
                    continue;
                }
                let Some(type_name) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                entries.push(CacheEntry {
                    namespace: namespace.clone(),
                    type_name: type_name.to_string(),
                    len: file.metadata()?.len() as usize,
                });
            }
        }
        entries.sort();
        Ok(entries)
    }
}
