//! The [`CacheStore`] trait and its filesystem implementation.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use walkdir::WalkDir;

// ---------------------------------------------------------------------------
// CacheStore trait
// ---------------------------------------------------------------------------

/// Thread-safe interface to the pipeline's on-disk working cache.
///
/// The cache layout is one subdirectory per media item, named after the
/// item's file stem.
pub trait CacheStore: Send + Sync {
    /// Aggregate size of everything under the cache root, in bytes.
    ///
    /// A missing cache root is an empty cache, not an error.
    fn size(&self) -> io::Result<u64>;

    /// Delete the entire cache and leave an empty root behind.
    fn clear(&self) -> io::Result<()>;

    /// Delete the working directory for one item, identified by its file
    /// stem. Returns `false` when no such entry existed.
    fn evict_entry(&self, stem: &str) -> io::Result<bool>;

    /// Delete per-item directories whose modification time is older than
    /// `days` days. Returns the names of the removed entries.
    fn sweep_older_than(&self, days: u64) -> io::Result<Vec<String>>;
}

// Compile-time assertion: Box<dyn CacheStore> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn CacheStore>) {}
};

// ---------------------------------------------------------------------------
// FsCacheStore
// ---------------------------------------------------------------------------

/// Production store over the real cache directory.
#[derive(Debug, Clone)]
pub struct FsCacheStore {
    root: PathBuf,
}

impl FsCacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

impl CacheStore for FsCacheStore {
    fn size(&self) -> io::Result<u64> {
        if !self.root.exists() {
            return Ok(0);
        }

        let mut total = 0u64;
        for entry in WalkDir::new(&self.root).into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_file() {
                total += entry.metadata().map(|m| m.len()).unwrap_or(0);
            }
        }
        Ok(total)
    }

    fn clear(&self) -> io::Result<()> {
        match std::fs::remove_dir_all(&self.root) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        std::fs::create_dir_all(&self.root)
    }

    fn evict_entry(&self, stem: &str) -> io::Result<bool> {
        let entry = self.root.join(stem);
        if !entry.is_dir() {
            return Ok(false);
        }
        std::fs::remove_dir_all(&entry)?;
        Ok(true)
    }

    fn sweep_older_than(&self, days: u64) -> io::Result<Vec<String>> {
        let mut removed = Vec::new();
        if !self.root.exists() {
            return Ok(removed);
        }

        let threshold = SystemTime::now() - Duration::from_secs(days * 24 * 60 * 60);

        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let modified = match entry.metadata().and_then(|m| m.modified()) {
                Ok(t) => t,
                Err(_) => continue,
            };
            if modified < threshold {
                std::fs::remove_dir_all(entry.path())?;
                removed.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(removed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn entry_with_file(root: &std::path::Path, stem: &str, bytes: usize) {
        let dir = root.join(stem);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("raw.srt"), vec![b'x'; bytes]).unwrap();
    }

    #[test]
    fn size_of_missing_root_is_zero() {
        let dir = tempdir().unwrap();
        let store = FsCacheStore::new(dir.path().join("never-created"));
        assert_eq!(store.size().unwrap(), 0);
    }

    #[test]
    fn size_sums_nested_files() {
        let dir = tempdir().unwrap();
        let store = FsCacheStore::new(dir.path());
        entry_with_file(dir.path(), "take1", 100);
        entry_with_file(dir.path(), "take2", 50);

        assert_eq!(store.size().unwrap(), 150);
    }

    #[test]
    fn clear_empties_and_recreates_the_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("cache");
        let store = FsCacheStore::new(&root);
        entry_with_file(&root, "take1", 10);

        store.clear().unwrap();
        assert!(root.is_dir());
        assert_eq!(store.size().unwrap(), 0);
    }

    #[test]
    fn clear_on_missing_root_creates_it() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("cache");
        let store = FsCacheStore::new(&root);

        store.clear().unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn evict_entry_removes_only_that_entry() {
        let dir = tempdir().unwrap();
        let store = FsCacheStore::new(dir.path());
        entry_with_file(dir.path(), "keep", 10);
        entry_with_file(dir.path(), "drop", 20);

        assert!(store.evict_entry("drop").unwrap());
        assert!(!dir.path().join("drop").exists());
        assert!(dir.path().join("keep").exists());
    }

    #[test]
    fn evict_missing_entry_reports_false() {
        let dir = tempdir().unwrap();
        let store = FsCacheStore::new(dir.path());
        assert!(!store.evict_entry("nothing-here").unwrap());
    }

    #[test]
    fn sweep_with_long_retention_removes_nothing() {
        let dir = tempdir().unwrap();
        let store = FsCacheStore::new(dir.path());
        entry_with_file(dir.path(), "fresh", 10);

        let removed = store.sweep_older_than(3).unwrap();
        assert!(removed.is_empty());
        assert!(dir.path().join("fresh").exists());
    }

    #[test]
    fn sweep_with_zero_retention_removes_existing_entries() {
        let dir = tempdir().unwrap();
        let store = FsCacheStore::new(dir.path());
        entry_with_file(dir.path(), "old", 10);

        // Directory mtimes are strictly in the past by the time the sweep
        // computes its threshold.
        std::thread::sleep(std::time::Duration::from_millis(20));

        let removed = store.sweep_older_than(0).unwrap();
        assert_eq!(removed, vec!["old".to_string()]);
        assert!(!dir.path().join("old").exists());
    }

    #[test]
    fn sweep_on_missing_root_is_empty() {
        let dir = tempdir().unwrap();
        let store = FsCacheStore::new(dir.path().join("never-created"));
        assert!(store.sweep_older_than(0).unwrap().is_empty());
    }

    #[test]
    fn sweep_ignores_loose_files_in_the_root() {
        let dir = tempdir().unwrap();
        let store = FsCacheStore::new(dir.path());
        fs::write(dir.path().join("stray.log"), b"x").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));

        let removed = store.sweep_older_than(0).unwrap();
        assert!(removed.is_empty());
        assert!(dir.path().join("stray.log").exists());
    }
}
