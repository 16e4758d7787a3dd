//! Path resolution — raw paths in, accepted media items out.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::item::ResolvedMedia;

// ---------------------------------------------------------------------------
// PathResolver trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for turning raw filesystem paths into
/// media items.
///
/// # Contract
///
/// - Directories are expanded recursively.
/// - Non-media entries are omitted, never reported as errors.
/// - The returned list contains no two records with the same `path`.
/// - Input order is preserved for directly supplied files.
pub trait PathResolver: Send + Sync {
    /// Resolve `paths` into zero or more accepted media items.
    fn resolve(&self, paths: &[PathBuf]) -> Vec<ResolvedMedia>;
}

// Compile-time assertion: Box<dyn PathResolver> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn PathResolver>) {}
};

// ---------------------------------------------------------------------------
// FsPathResolver
// ---------------------------------------------------------------------------

/// Production resolver backed by the real filesystem.
///
/// A supplied file path is accepted as-is (display path = basename). A
/// supplied directory is walked recursively; display paths of the files
/// found inside are made relative to the directory's parent so the
/// directory name itself stays visible in the UI.
#[derive(Debug, Default, Clone)]
pub struct FsPathResolver;

impl FsPathResolver {
    pub fn new() -> Self {
        Self
    }

    fn resolve_file(&self, path: &Path) -> Option<ResolvedMedia> {
        let relative = PathBuf::from(path.file_name()?);
        ResolvedMedia::from_path(path, relative)
    }

    fn resolve_dir(&self, dir: &Path, out: &mut Vec<ResolvedMedia>, seen: &mut HashSet<PathBuf>) {
        // Display paths keep the imported directory name as their first
        // component.
        let rel_base = dir.parent().unwrap_or(dir);

        for entry in WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let relative = path.strip_prefix(rel_base).unwrap_or(path).to_path_buf();

            if let Some(item) = ResolvedMedia::from_path(path, relative) {
                if seen.insert(item.path.clone()) {
                    out.push(item);
                }
            }
        }
    }
}

impl PathResolver for FsPathResolver {
    fn resolve(&self, paths: &[PathBuf]) -> Vec<ResolvedMedia> {
        let mut out = Vec::new();
        let mut seen: HashSet<PathBuf> = HashSet::new();

        for raw in paths {
            let meta = match std::fs::metadata(raw) {
                Ok(m) => m,
                Err(e) => {
                    // Resolution errors are informational, never fatal.
                    log::debug!("import: skipping unreadable path {}: {e}", raw.display());
                    continue;
                }
            };

            if meta.is_dir() {
                self.resolve_dir(raw, &mut out, &mut seen);
            } else if let Some(item) = self.resolve_file(raw) {
                if seen.insert(item.path.clone()) {
                    out.push(item);
                }
            }
        }

        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
