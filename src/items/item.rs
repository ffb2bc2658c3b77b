//! Item definitions
//!
//! Items only exist as container contents here; the economy and crafting
//! systems give them meaning.

use serde::{Deserialize, Serialize};

/// Item rarity tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
}

/// Every kind of item a container can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Gold,
    Torch,
    Rations,
    HealingDraught,
    Rope,
    IronOre,
    SilverOre,
    GlowcapSpore,
    SlimeJelly,
    BoneDust,
    MoonCrystal,
    EmberShard,
    AncientCoin,
    VoidPearl,
}

impl ItemKind {
    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::Gold => "gold coins",
            ItemKind::Torch => "torch",
            ItemKind::Rations => "rations",
            ItemKind::HealingDraught => "healing draught",
            ItemKind::Rope => "coil of rope",
            ItemKind::IronOre => "iron ore",
            ItemKind::SilverOre => "silver ore",
            ItemKind::GlowcapSpore => "glowcap spore",
            ItemKind::SlimeJelly => "slime jelly",
            ItemKind::BoneDust => "bone dust",
            ItemKind::MoonCrystal => "moon crystal",
            ItemKind::EmberShard => "ember shard",
            ItemKind::AncientCoin => "ancient coin",
            ItemKind::VoidPearl => "void pearl",
        }
    }

    pub fn rarity(&self) -> Rarity {
        match self {
            ItemKind::Gold
            | ItemKind::Torch
            | ItemKind::Rations
            | ItemKind::Rope
            | ItemKind::IronOre
            | ItemKind::GlowcapSpore
            | ItemKind::SlimeJelly
            | ItemKind::BoneDust => Rarity::Common,
            ItemKind::HealingDraught | ItemKind::SilverOre => Rarity::Uncommon,
            ItemKind::MoonCrystal | ItemKind::EmberShard | ItemKind::AncientCoin => Rarity::Rare,
            ItemKind::VoidPearl => Rarity::Epic,
        }
    }
}

/// A quantity of one item kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub kind: ItemKind,
    pub quantity: u32,
}

impl ItemStack {
    pub fn new(kind: ItemKind, quantity: u32) -> Self {
        Self { kind, quantity }
    }
}
