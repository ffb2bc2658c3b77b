//! Data and configuration
//!
//! Weighted tables shared by the generator and population code, plus the
//! RON-backed realm config.

pub mod config;
pub mod loader;
pub mod weighted;

pub use config::{GenerationConfig, RealmConfig, RegenerationConfig};
pub use loader::{export_default_config, load_config, load_config_or_default, DEFAULT_CONFIG_PATH};
pub use weighted::{roll_chance, Amount, Roll, WeightedEntry, WeightedTable};
