//! The cache accounting façade.

use std::path::Path;
use std::sync::Arc;

use crate::bus::EventBus;
use crate::config::{CacheStrategy, SettingsStore};

use super::store::CacheStore;

// ---------------------------------------------------------------------------
// format_size
// ---------------------------------------------------------------------------

/// Human-readable byte count, for display only — no decision logic reads
/// the formatted value.
///
/// ```
/// use subtitle_studio::cache::format_size;
///
/// assert_eq!(format_size(512), "512 B");
/// assert_eq!(format_size(2 * 1024 * 1024), "2.0 MB");
/// assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;
    const GIB: u64 = 1024 * MIB;

    if bytes >= GIB {
        format!("{:.2} GB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.0} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}

// ---------------------------------------------------------------------------
// CacheAccountant
// ---------------------------------------------------------------------------

/// Reads aggregate cache size, executes clears, and surfaces the cleanup
/// strategy choice.
///
/// All failures are reported on the event bus and degrade to "size 0" or
/// "nothing cleaned" — cache accounting must never take the orchestrator
/// down.
pub struct CacheAccountant {
    store: Arc<dyn CacheStore>,
    settings: Arc<dyn SettingsStore>,
    bus: EventBus,
}

impl CacheAccountant {
    pub fn new(store: Arc<dyn CacheStore>, settings: Arc<dyn SettingsStore>, bus: EventBus) -> Self {
        Self {
            store,
            settings,
            bus,
        }
    }

    /// Current aggregate cache size in bytes.
    pub fn refresh(&self) -> u64 {
        match self.store.size() {
            Ok(size) => size,
            Err(e) => {
                self.bus
                    .log(format!("[System] Cache size check failed: {e}"));
                0
            }
        }
    }

    /// Clear the whole cache, then report the refreshed size.
    pub fn clear(&self) -> u64 {
        match self.store.clear() {
            Ok(()) => self.bus.log("[System] Cache cleared."),
            Err(e) => self.bus.log(format!("[System] Cache clear failed: {e}")),
        }
        self.refresh()
    }

    /// The configured cleanup strategy.
    pub fn strategy(&self) -> CacheStrategy {
        self.settings.cache_strategy()
    }

    /// Persist a new cleanup strategy.
    pub fn set_strategy(&self, strategy: CacheStrategy) {
        if let Err(e) = self.settings.set_cache_strategy(strategy) {
            self.bus
                .log(format!("[System] Failed to save cache strategy: {e}"));
        }
    }

    /// Apply the time-based retention strategies once, at process start.
    pub fn startup_sweep(&self) {
        let Some(days) = self.strategy().retention_days() else {
            return;
        };

        match self.store.sweep_older_than(days) {
            Ok(removed) => {
                for name in removed {
                    self.bus.log(format!("Auto-cleaned old cache: {name}"));
                }
            }
            Err(e) => self.bus.log(format!("[System] Cache sweep failed: {e}")),
        }
    }

    /// Apply the `immediate` strategy after one item's pipeline run.
    ///
    /// The entry name is the media file's stem, matching the pipeline's
    /// per-item cache directory layout.
    pub fn after_item(&self, media_path: &Path) {
        if self.strategy() != CacheStrategy::Immediate {
            return;
        }
        let Some(stem) = media_path.file_stem().map(|s| s.to_string_lossy()) else {
            return;
        };

        match self.store.evict_entry(&stem) {
            Ok(true) => self.bus.log(format!("Auto-cleaned cache for: {stem}")),
            Ok(false) => {}
            Err(e) => self
                .bus
                .log(format!("[System] Cache eviction failed for {stem}: {e}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
