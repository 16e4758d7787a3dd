//! Application settings structs, defaults, TOML persistence and the
//! [`SettingsStore`] seam.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// CacheStrategy
// ---------------------------------------------------------------------------

/// Automatic cache cleanup policy.
///
/// The core only records the user's choice; applying time-based eviction is
/// the cache store's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheStrategy {
    /// Never clean automatically.
    #[serde(rename = "off")]
    Off,
    /// Evict an item's working cache right after its pipeline run finishes.
    #[serde(rename = "immediate")]
    Immediate,
    /// Keep per-item caches for three days, then sweep.
    #[serde(rename = "keep-3-days")]
    Keep3Days,
    /// Keep per-item caches for seven days, then sweep.
    #[serde(rename = "keep-7-days")]
    Keep7Days,
}

impl CacheStrategy {
    /// Retention window in days for the time-based strategies.
    pub fn retention_days(&self) -> Option<u64> {
        match self {
            CacheStrategy::Keep3Days => Some(3),
            CacheStrategy::Keep7Days => Some(7),
            CacheStrategy::Off | CacheStrategy::Immediate => None,
        }
    }

    /// The serialised form, for display.
    pub fn label(&self) -> &'static str {
        match self {
            CacheStrategy::Off => "off",
            CacheStrategy::Immediate => "immediate",
            CacheStrategy::Keep3Days => "keep-3-days",
            CacheStrategy::Keep7Days => "keep-7-days",
        }
    }
}

impl Default for CacheStrategy {
    fn default() -> Self {
        Self::Off
    }
}

// ---------------------------------------------------------------------------
// CacheConfig
// ---------------------------------------------------------------------------

/// Settings for the pipeline working cache.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Automatic cleanup policy.
    pub strategy: CacheStrategy,
}

// ---------------------------------------------------------------------------
// PipelineConfig
// ---------------------------------------------------------------------------

/// Location of the bundled processing engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Bundled interpreter executable.
    pub interpreter: PathBuf,
    /// Pipeline driver script handed one media path per invocation.
    pub script: PathBuf,
    /// Working directory for the driver (the scripts directory).
    pub workdir: PathBuf,
    /// Directories prepended to `PATH` for the child process (bundled
    /// ffmpeg / llama builds).
    pub tool_dirs: Vec<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let core = AppPaths::new().core_dir;

        let interpreter = if cfg!(windows) {
            core.join("python").join("python.exe")
        } else {
            core.join("python").join("bin").join("python3")
        };

        Self {
            interpreter,
            script: core.join("scripts").join("run.py"),
            workdir: core.join("scripts"),
            tool_dirs: vec![
                core.join("bin").join("ffmpeg"),
                core.join("bin").join("llama"),
                core.join("bin"),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use subtitle_studio::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Cache cleanup settings.
    pub cache: CacheConfig,
    /// Bundled engine location.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SettingsStore
// ---------------------------------------------------------------------------

/// Thread-safe interface for reading and persisting the cache strategy.
///
/// The cache façade goes through this seam so tests can swap in an
/// in-memory store.
pub trait SettingsStore: Send + Sync {
    /// The currently configured cleanup strategy.
    fn cache_strategy(&self) -> CacheStrategy;

    /// Persist a new cleanup strategy.
    fn set_cache_strategy(&self, strategy: CacheStrategy) -> Result<()>;
}

// Compile-time assertion: Box<dyn SettingsStore> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SettingsStore>) {}
};

/// Production [`SettingsStore`] backed by `settings.toml`.
pub struct TomlSettingsStore {
    path: PathBuf,
    current: Mutex<AppConfig>,
}

impl TomlSettingsStore {
    /// Open (or initialise) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let current = AppConfig::load_from(&path)?;
        Ok(Self {
            path,
            current: Mutex::new(current),
        })
    }

    /// Snapshot of the full configuration.
    pub fn config(&self) -> AppConfig {
        self.current.lock().unwrap().clone()
    }
}

impl SettingsStore for TomlSettingsStore {
    fn cache_strategy(&self) -> CacheStrategy {
        self.current.lock().unwrap().cache.strategy
    }

    fn set_cache_strategy(&self, strategy: CacheStrategy) -> Result<()> {
        let mut current = self.current.lock().unwrap();
        current.cache.strategy = strategy;
        current.save_to(&self.path)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
