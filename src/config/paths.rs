//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\subtitle-studio\
//!   macOS:   ~/Library/Application Support/subtitle-studio/
//!   Linux:   ~/.config/subtitle-studio/
//!
//! Data dir (bundled engine, models, cache):
//!   Windows: %LOCALAPPDATA%\subtitle-studio\
//!   macOS:   ~/Library/Application Support/subtitle-studio/
//!   Linux:   ~/.local/share/subtitle-studio/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Bundled engine root (interpreter, pipeline scripts, tool binaries).
    pub core_dir: PathBuf,
    /// Directory for downloaded model artifacts.
    pub models_dir: PathBuf,
    /// Per-item pipeline working cache.
    pub cache_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "subtitle-studio";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path (should be extremely rare in practice).
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let core_dir = data_dir.join("core");
        let models_dir = data_dir.join("models");
        let cache_dir = data_dir.join("cache");

        Self {
            config_dir,
            settings_file,
            core_dir,
            models_dir,
            cache_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_non_empty() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths.models_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths.cache_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
    }

    #[test]
    fn data_subdirectories_are_distinct() {
        let paths = AppPaths::new();
        assert_ne!(paths.core_dir, paths.models_dir);
        assert_ne!(paths.models_dir, paths.cache_dir);
    }
}
