//! Entity creation

pub mod containers;
pub mod creatures;
pub mod player;

pub use containers::{spawn_burial_urn, spawn_ore_seam, spawn_supply_crate, spawn_treasure_chest};
pub use creatures::{spawn_creature, CreatureDef, CreatureKind};
pub use player::spawn_player;
