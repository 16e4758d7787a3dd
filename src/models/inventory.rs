//! Artifact presence checks.

use std::path::PathBuf;

use super::registry::REQUIRED_ARTIFACTS;

// ---------------------------------------------------------------------------
// InventoryReport
// ---------------------------------------------------------------------------

/// Outcome of one artifact scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryReport {
    /// Every required artifact is present.
    Ready,
    /// These artifacts (by display name) are absent.
    Missing(Vec<String>),
}

// ---------------------------------------------------------------------------
// ModelInventory trait
// ---------------------------------------------------------------------------

/// Thread-safe interface answering "are the required model artifacts here?".
pub trait ModelInventory: Send + Sync {
    /// Scan for required artifacts. Must be cheap enough to run at every
    /// manual recheck.
    fn check(&self) -> InventoryReport;
}

// Compile-time assertion: Box<dyn ModelInventory> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn ModelInventory>) {}
};

// ---------------------------------------------------------------------------
// FsModelInventory
// ---------------------------------------------------------------------------

/// Production inventory over the real models directory.
#[derive(Debug, Clone)]
pub struct FsModelInventory {
    models_dir: PathBuf,
}

impl FsModelInventory {
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
        }
    }
}

impl ModelInventory for FsModelInventory {
    fn check(&self) -> InventoryReport {
        let missing: Vec<String> = REQUIRED_ARTIFACTS
            .iter()
            .filter(|artifact| !artifact.target_path(&self.models_dir).is_file())
            .map(|artifact| artifact.name.to_string())
            .collect();

        if missing.is_empty() {
            InventoryReport::Ready
        } else {
            InventoryReport::Missing(missing)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
