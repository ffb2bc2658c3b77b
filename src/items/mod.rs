//! Item system

pub mod item;
pub mod loot;

pub use item::{ItemKind, ItemStack, Rarity};
pub use loot::{mineral_loot, remains_loot, supply_loot, treasure_loot};
