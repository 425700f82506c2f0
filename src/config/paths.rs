//! Cross-platform application paths using the `dirs` crate.
//!
//! Config dir (settings + persisted cache store):
//!   Windows: %APPDATA%\hanzi-ruby\
//!   macOS:   ~/Library/Application Support/hanzi-ruby/
//!   Linux:   ~/.config/hanzi-ruby/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml` and `store.json`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Full path to the key/value store holding the lookup cache.
    pub store_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "hanzi-ruby";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        Self {
            settings_file: config_dir.join("settings.toml"),
            store_file: config_dir.join("store.json"),
            config_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
