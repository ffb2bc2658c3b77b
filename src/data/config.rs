//! Realm configuration
//!
//! Tunables for generation and live regeneration. Every field has a
//! default, so a config file only needs the values it changes.

use serde::{Deserialize, Serialize};

/// All tunables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealmConfig {
    pub generation: GenerationConfig,
    pub regeneration: RegenerationConfig,
}

/// Layout generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Extra flood-fill passes after a floor stalls short of its room target
    pub expansion_retries: u32,
    /// Fixed RNG seed for reproducible dungeons
    pub seed: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            expansion_retries: 5,
            seed: None,
        }
    }
}

/// Live regeneration settings. Chances are per room per second and are
/// scaled by the tick's elapsed time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegenerationConfig {
    pub full_enabled: bool,
    /// Seconds between full rebuilds
    pub full_interval_secs: f64,
    /// Remaining-time marks at which players are warned, in seconds
    pub warning_thresholds_secs: Vec<f64>,
    pub incremental_enabled: bool,
    pub room_deletion_chance: f64,
    pub exit_deletion_chance: f64,
    pub new_room_chance: f64,
    pub new_exit_chance: f64,
}

impl Default for RegenerationConfig {
    fn default() -> Self {
        Self {
            full_enabled: true,
            full_interval_secs: 30.0 * 60.0,
            warning_thresholds_secs: vec![5.0 * 60.0, 60.0],
            incremental_enabled: true,
            room_deletion_chance: 0.0005,
            exit_deletion_chance: 0.0005,
            new_room_chance: 0.001,
            new_exit_chance: 0.001,
        }
    }
}
