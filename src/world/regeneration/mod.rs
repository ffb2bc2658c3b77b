//! Live dungeon regeneration
//!
//! Two processes share the tick clock: the periodic full rebuild and the
//! per-tick incremental mutator. A tick that rebuilds skips mutation.

pub mod full;
pub mod incremental;

pub use full::{regenerate_dungeon, FullRegeneration};
pub use incremental::{mutate_dungeon, MutationReport};

use std::time::Duration;

use rand::Rng;

use crate::data::RegenerationConfig;
use crate::error::DungeonError;
use crate::world::dungeon::DungeonStats;
use crate::world::realm::Realm;

/// What a driver tick did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Stats of the new dungeon if a full rebuild ran
    pub regenerated: Option<DungeonStats>,
    pub mutation: Option<MutationReport>,
}

/// Runs both regeneration processes from the scheduler's tick
#[derive(Debug, Clone)]
pub struct RegenerationDriver {
    full: FullRegeneration,
}

impl RegenerationDriver {
    pub fn new(config: &RegenerationConfig) -> Self {
        Self {
            full: FullRegeneration::new(config),
        }
    }

    /// Seconds until the next full rebuild
    pub fn until_rebuild(&self) -> f64 {
        self.full.remaining()
    }

    /// Advance by `dt`. A failed rebuild is returned to the caller with the
    /// previous dungeon still installed.
    pub fn tick<R: Rng>(&mut self, realm: &mut Realm, dt: Duration, rng: &mut R) -> Result<TickOutcome, DungeonError> {
        let mut outcome = TickOutcome::default();

        if realm.config.regeneration.full_enabled {
            outcome.regenerated = self.full.tick(realm, dt, rng)?;
            if outcome.regenerated.is_some() {
                return Ok(outcome);
            }
        }

        if realm.config.regeneration.incremental_enabled {
            outcome.mutation = Some(mutate_dungeon(realm, dt.as_secs_f64(), rng));
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RealmConfig;
    use crate::world::generation::FloorCatalogue;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn realm(config: RealmConfig, rng: &mut StdRng) -> Realm {
        let mut realm = Realm::new(FloorCatalogue::standard(), config);
        let dungeon = realm.build_dungeon(rng).unwrap();
        realm.install_dungeon(dungeon);
        realm
    }

    #[test]
    fn test_rebuild_tick_skips_mutation() {
        let mut rng = StdRng::seed_from_u64(20);
        let mut config = RealmConfig::default();
        config.regeneration.full_interval_secs = 10.0;
        let mut realm = realm(config.clone(), &mut rng);
        let mut driver = RegenerationDriver::new(&config.regeneration);

        let quiet = driver.tick(&mut realm, Duration::from_secs(5), &mut rng).unwrap();
        assert!(quiet.regenerated.is_none());
        assert!(quiet.mutation.is_some());

        let rebuild = driver.tick(&mut realm, Duration::from_secs(5), &mut rng).unwrap();
        assert!(rebuild.regenerated.is_some());
        assert!(rebuild.mutation.is_none());
        assert_eq!(driver.until_rebuild(), 10.0);
    }

    #[test]
    fn test_disabled_processes_do_nothing() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut config = RealmConfig::default();
        config.regeneration.full_enabled = false;
        config.regeneration.incremental_enabled = false;
        config.regeneration.full_interval_secs = 1.0;
        let mut realm = realm(config.clone(), &mut rng);
        let mut driver = RegenerationDriver::new(&config.regeneration);

        let outcome = driver.tick(&mut realm, Duration::from_secs(60), &mut rng).unwrap();
        assert_eq!(outcome, TickOutcome::default());
    }
}
