//! RON config loader
//!
//! Loads the realm config from an external RON file, with fallback to the
//! built-in defaults.

use std::fs;
use std::path::Path;

use super::config::RealmConfig;
use crate::error::ConfigError;

/// Where the binary looks for its config by default
pub const DEFAULT_CONFIG_PATH: &str = "assets/data/realm.ron";

/// Load a config file
pub fn load_config(path: &Path) -> Result<RealmConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(ron::from_str(&content)?)
}

/// Load a config file, falling back to defaults if it is missing or broken
pub fn load_config_or_default(path: &Path) -> RealmConfig {
    if !path.exists() {
        log::info!("No config at {:?}, using defaults", path);
        return RealmConfig::default();
    }
    match load_config(path) {
        Ok(config) => {
            log::info!("Config loaded from {:?}", path);
            config
        }
        Err(e) => {
            log::warn!("Failed to load config from {:?}: {}. Using defaults.", path, e);
            RealmConfig::default()
        }
    }
}

/// Write the default config as pretty RON (useful for modding)
pub fn export_default_config(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = ron::ser::to_string_pretty(&RealmConfig::default(), ron::ser::PrettyConfig::default())?;
    fs::write(path, text)?;
    Ok(())
}
