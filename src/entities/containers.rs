//! Container spawn functions
//!
//! Plugged into encounter tables as custom spawns so floors can place "a
//! chest with loot" instead of a creature.

use hecs::{Entity, World};
use rand::RngCore;

use crate::error::DungeonError;
use crate::items::{mineral_loot, remains_loot, supply_loot, treasure_loot};
use crate::world::generation::random_container;
use crate::world::{LocationId, Range};

/// A mouldering crate of delving supplies
pub fn spawn_supply_crate(
    world: &mut World,
    room: &LocationId,
    rng: &mut dyn RngCore,
) -> Result<Entity, DungeonError> {
    random_container(world, room, "Mouldering Crate", &supply_loot(), Range::new(1, 3), rng)
}

/// An ore seam worth chipping at
pub fn spawn_ore_seam(
    world: &mut World,
    room: &LocationId,
    rng: &mut dyn RngCore,
) -> Result<Entity, DungeonError> {
    random_container(world, room, "Glittering Ore Seam", &mineral_loot(), Range::new(1, 2), rng)
}

/// A sealed burial urn
pub fn spawn_burial_urn(
    world: &mut World,
    room: &LocationId,
    rng: &mut dyn RngCore,
) -> Result<Entity, DungeonError> {
    random_container(world, room, "Sealed Burial Urn", &remains_loot(), Range::new(1, 3), rng)
}

/// A rare iron-bound chest
pub fn spawn_treasure_chest(
    world: &mut World,
    room: &LocationId,
    rng: &mut dyn RngCore,
) -> Result<Entity, DungeonError> {
    random_container(world, room, "Iron-Bound Chest", &treasure_loot(), Range::new(2, 4), rng)
}
