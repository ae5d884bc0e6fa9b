//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::PathBuf;

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `REDRAFT_*` environment variables (`__` separates nesting, e.g.
    ///    `REDRAFT_PIPELINE__MAX_ROUNDS`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./redraft.toml` or `./.redraft.toml`
    /// 4. XDG config: `$XDG_CONFIG_HOME/redraft/config.toml`
    /// 5. Fallback: `~/.config/redraft/config.toml`
    /// 6. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        // Add global config (XDG or fallback)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(&global_path));
            }
        }

        // Add project-level config files (check both names)
        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&path));
        }

        // Add explicit config path
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Environment overrides win over every file. Double underscore keeps
        // keys like `max_rounds` intact while still reaching nested sections.
        figment = figment.merge(Env::prefixed("REDRAFT_").split("__"));

        figment.extract().map_err(Box::new)
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/redraft/config.toml if set,
    /// otherwise falls back to ~/.config/redraft/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("redraft").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        for filename in &["redraft.toml", ".redraft.toml"] {
            let path = PathBuf::from(filename);
            if path.exists() {
                return Some(path);
            }
        }
        None
    }
}
