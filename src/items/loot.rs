//! Container loot tables
//!
//! Each table is rolled a few times to fill a freshly spawned container.

use crate::data::WeightedTable;
use crate::world::Range;

use super::ItemKind;

/// Everyday supplies left behind by earlier delvers
pub fn supply_loot() -> WeightedTable<ItemKind> {
    WeightedTable::new()
        .with_amount(ItemKind::Torch, Range::new(1, 3), 30.0)
        .with_amount(ItemKind::Rations, Range::new(1, 4), 30.0)
        .with(ItemKind::Rope, 15.0)
        .with_amount(ItemKind::Gold, Range::new(3, 15), 20.0)
        .with(ItemKind::HealingDraught, 5.0)
}

/// Ore and crystal veins chipped out of cave walls
pub fn mineral_loot() -> WeightedTable<ItemKind> {
    WeightedTable::new()
        .with_amount(ItemKind::IronOre, Range::new(1, 5), 50.0)
        .with_amount(ItemKind::SilverOre, Range::new(1, 3), 25.0)
        .with(ItemKind::MoonCrystal, 8.0)
        .with_amount(ItemKind::Gold, Range::new(5, 20), 17.0)
}

/// Grave goods and offerings
pub fn treasure_loot() -> WeightedTable<ItemKind> {
    WeightedTable::new()
        .with_amount(ItemKind::Gold, Range::new(20, 80), 40.0)
        .with_amount(ItemKind::AncientCoin, Range::new(1, 3), 20.0)
        .with_amount(ItemKind::HealingDraught, Range::new(1, 2), 20.0)
        .with(ItemKind::MoonCrystal, 10.0)
        .with(ItemKind::EmberShard, 8.0)
        .with(ItemKind::VoidPearl, 2.0)
}

/// Remains found in ossuaries and nests
pub fn remains_loot() -> WeightedTable<ItemKind> {
    WeightedTable::new()
        .with_amount(ItemKind::BoneDust, Range::new(1, 6), 50.0)
        .with_amount(ItemKind::Gold, Range::new(1, 10), 30.0)
        .with(ItemKind::AncientCoin, 15.0)
        .with(ItemKind::Torch, 5.0)
}
