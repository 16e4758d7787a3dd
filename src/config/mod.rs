//! Configuration module.
//!
//! Provides `AppConfig` (top-level settings), `AppPaths` for cross-platform
//! directories, TOML persistence via `AppConfig::load` / `AppConfig::save`,
//! and the [`SettingsStore`] seam the cache façade persists the cleanup
//! strategy through.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, CacheConfig, CacheStrategy, PipelineConfig, SettingsStore, TomlSettingsStore,
};
