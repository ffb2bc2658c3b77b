//! Creature definitions and spawning
//!
//! Encounter tables refer to creatures by [`CreatureKind`]; combat reads the
//! stats off the spawned components.

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use crate::ecs::{Creature, Health, InRoom, Name};
use crate::world::LocationId;

/// Creature definition: name, map glyph and base health
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatureDef {
    pub name: &'static str,
    pub glyph: char,
    pub hp: i32,
}

/// Every creature an encounter table can spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreatureKind {
    // Shallow caves
    GreenSlime,
    GiantRat,
    CaveBat,
    GlowcapSpriggan,
    // Warrens
    Goblin,
    GoblinShaman,
    CaveSpider,
    // Ossuary
    Skeleton,
    Ghoul,
    Wraith,
    // Deep caverns
    CrystalGolem,
    EmberImp,
    MagmaHound,
    VoidSpawn,
}

// =============================================================================
// Shallow caves
// =============================================================================

const GREEN_SLIME: CreatureDef = CreatureDef {
    name: "Green Slime",
    glyph: 'j',
    hp: 12,
};

const GIANT_RAT: CreatureDef = CreatureDef {
    name: "Giant Rat",
    glyph: 'r',
    hp: 8,
};

const CAVE_BAT: CreatureDef = CreatureDef {
    name: "Cave Bat",
    glyph: 'b',
    hp: 6,
};

const GLOWCAP_SPRIGGAN: CreatureDef = CreatureDef {
    name: "Glowcap Spriggan",
    glyph: 'f',
    hp: 15,
};

// =============================================================================
// Warrens
// =============================================================================

const GOBLIN: CreatureDef = CreatureDef {
    name: "Goblin",
    glyph: 'g',
    hp: 18,
};

const GOBLIN_SHAMAN: CreatureDef = CreatureDef {
    name: "Goblin Shaman",
    glyph: 'G',
    hp: 16,
};

const CAVE_SPIDER: CreatureDef = CreatureDef {
    name: "Cave Spider",
    glyph: 's',
    hp: 14,
};

// =============================================================================
// Ossuary
// =============================================================================

const SKELETON: CreatureDef = CreatureDef {
    name: "Skeleton",
    glyph: 'z',
    hp: 25,
};

const GHOUL: CreatureDef = CreatureDef {
    name: "Ghoul",
    glyph: 'Z',
    hp: 35,
};

const WRAITH: CreatureDef = CreatureDef {
    name: "Wraith",
    glyph: 'W',
    hp: 30,
};

// =============================================================================
// Deep caverns
// =============================================================================

const CRYSTAL_GOLEM: CreatureDef = CreatureDef {
    name: "Crystal Golem",
    glyph: 'C',
    hp: 70,
};

const EMBER_IMP: CreatureDef = CreatureDef {
    name: "Ember Imp",
    glyph: 'i',
    hp: 22,
};

const MAGMA_HOUND: CreatureDef = CreatureDef {
    name: "Magma Hound",
    glyph: 'h',
    hp: 45,
};

const VOID_SPAWN: CreatureDef = CreatureDef {
    name: "Void Spawn",
    glyph: 'V',
    hp: 60,
};

impl CreatureKind {
    pub fn def(&self) -> &'static CreatureDef {
        match self {
            CreatureKind::GreenSlime => &GREEN_SLIME,
            CreatureKind::GiantRat => &GIANT_RAT,
            CreatureKind::CaveBat => &CAVE_BAT,
            CreatureKind::GlowcapSpriggan => &GLOWCAP_SPRIGGAN,
            CreatureKind::Goblin => &GOBLIN,
            CreatureKind::GoblinShaman => &GOBLIN_SHAMAN,
            CreatureKind::CaveSpider => &CAVE_SPIDER,
            CreatureKind::Skeleton => &SKELETON,
            CreatureKind::Ghoul => &GHOUL,
            CreatureKind::Wraith => &WRAITH,
            CreatureKind::CrystalGolem => &CRYSTAL_GOLEM,
            CreatureKind::EmberImp => &EMBER_IMP,
            CreatureKind::MagmaHound => &MAGMA_HOUND,
            CreatureKind::VoidSpawn => &VOID_SPAWN,
        }
    }

    pub fn name(&self) -> &'static str {
        self.def().name
    }
}

/// Spawn a creature into a room. The caller records the entity in the
/// room's entity set.
pub fn spawn_creature(world: &mut World, kind: CreatureKind, room: &LocationId) -> Entity {
    let def = kind.def();
    world.spawn((
        Name::new(def.name),
        Creature { kind },
        Health::new(def.hp),
        InRoom(room.clone()),
    ))
}
