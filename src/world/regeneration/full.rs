//! Periodic full rebuild
//!
//! Counts down to the next rebuild, warning players at configured marks,
//! then swaps in a freshly generated dungeon.

use std::time::Duration;

use rand::Rng;

use crate::data::RegenerationConfig;
use crate::error::DungeonError;
use crate::game::RegenTimer;
use crate::world::dungeon::DungeonStats;
use crate::world::realm::Realm;

/// Countdown and warning state for full rebuilds
#[derive(Debug, Clone)]
pub struct FullRegeneration {
    timer: RegenTimer,
    /// Remaining-time marks, largest first
    thresholds: Vec<f64>,
    /// Index of the next mark to announce
    next_warning: usize,
}

impl FullRegeneration {
    pub fn new(config: &RegenerationConfig) -> Self {
        let mut thresholds = config.warning_thresholds_secs.clone();
        thresholds.retain(|secs| *secs > 0.0);
        thresholds.sort_by(|a, b| b.total_cmp(a));
        Self {
            timer: RegenTimer::new(config.full_interval_secs),
            thresholds,
            next_warning: 0,
        }
    }

    /// Seconds until the next rebuild
    pub fn remaining(&self) -> f64 {
        self.timer.remaining()
    }

    /// Advance the countdown. Returns the new dungeon's stats if a rebuild
    /// ran this tick.
    pub fn tick<R: Rng>(
        &mut self,
        realm: &mut Realm,
        dt: Duration,
        rng: &mut R,
    ) -> Result<Option<DungeonStats>, DungeonError> {
        if self.timer.update(dt) {
            self.next_warning = 0;
            return regenerate_dungeon(realm, rng).map(Some);
        }

        let remaining = self.timer.remaining();
        while let Some(&mark) = self.thresholds.get(self.next_warning) {
            if remaining > mark {
                break;
            }
            self.next_warning += 1;
            // Several marks crossed in one tick only announce the closest
            if self.thresholds.get(self.next_warning).is_some_and(|&next| remaining <= next) {
                continue;
            }
            realm.broadcast(format!(
                "The dungeon will shift in {}. Make for the surface!",
                describe_secs(remaining)
            ));
        }
        Ok(None)
    }
}

/// Build a new dungeon and swap it in. The old dungeon is only torn down
/// once the new one generated and populated, so a failure leaves it serving.
pub fn regenerate_dungeon<R: Rng>(realm: &mut Realm, rng: &mut R) -> Result<DungeonStats, DungeonError> {
    log::info!("Full dungeon regeneration started");
    let dungeon = realm.build_dungeon(rng)?;

    let relocated = realm.clear_dungeon();
    realm.install_dungeon(dungeon);
    realm.reset_map_memory();
    realm.broadcast("The ground heaves as the dungeon reshapes itself.");

    let stats = realm.dungeon.stats();
    log::info!(
        "Full dungeon regeneration finished: {} ({} players sent to the entrance)",
        stats,
        relocated
    );
    Ok(stats)
}

fn describe_secs(secs: f64) -> String {
    let secs = secs.ceil().max(0.0) as u64;
    match (secs / 60, secs % 60) {
        (0, s) => format!("{} second{}", s, if s == 1 { "" } else { "s" }),
        (m, 0) => format!("{} minute{}", m, if m == 1 { "" } else { "s" }),
        (m, s) => format!("{}m {}s", m, s),
    }
}
