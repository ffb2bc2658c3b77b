//! Floor definitions
//!
//! Each definition is a theme that may appear at a set of depths, with
//! its own layout parameters and encounter table. Several definitions can
//! blend into the same depth.

use std::fmt;
use std::sync::Arc;

use hecs::{Entity, World};
use rand::RngCore;

use crate::data::{Amount, WeightedTable};
use crate::entities::{self, CreatureKind};
use crate::error::DungeonError;
use crate::world::{LocationId, Range};

/// Custom spawn: builds one entity in the given room
pub type SpawnFn = fn(&mut World, &LocationId, &mut dyn RngCore) -> Result<Entity, DungeonError>;

/// What a single encounter group spawns
#[derive(Clone, Copy)]
pub enum Spawnable {
    Creature(CreatureKind),
    Custom(SpawnFn),
}

impl fmt::Debug for Spawnable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Spawnable::Creature(kind) => f.debug_tuple("Creature").field(kind).finish(),
            Spawnable::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// One entry of a composite encounter
#[derive(Debug, Clone, Copy)]
pub struct EncounterGroup {
    pub spawn: Spawnable,
    pub amount: Amount,
}

impl EncounterGroup {
    pub fn creature(kind: CreatureKind, amount: impl Into<Amount>) -> Self {
        Self {
            spawn: Spawnable::Creature(kind),
            amount: amount.into(),
        }
    }

    pub fn custom(spawn: SpawnFn, amount: impl Into<Amount>) -> Self {
        Self {
            spawn: Spawnable::Custom(spawn),
            amount: amount.into(),
        }
    }
}

/// An encounter rolled from a floor's table
#[derive(Clone)]
pub enum Encounter {
    /// A single creature
    Creature(CreatureKind),
    /// A custom spawn function (containers, set pieces)
    Custom(SpawnFn),
    /// Several groups, each with its own rolled amount
    Groups(Vec<EncounterGroup>),
}

impl fmt::Debug for Encounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encounter::Creature(kind) => f.debug_tuple("Creature").field(kind).finish(),
            Encounter::Custom(_) => f.write_str("Custom(..)"),
            Encounter::Groups(groups) => f.debug_tuple("Groups").field(groups).finish(),
        }
    }
}

/// Parameters of the flood-fill layout
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Chance an empty neighbour becomes a room
    pub room_chance: f64,
    /// Chance two adjacent, unlinked rooms get an extra exit
    pub connection_chance: f64,
    pub width: Range,
    pub length: Range,
    pub room_count: Range,
    /// How many rooms lead down to the next depth
    pub exit_count: Range,
}

/// Parameters of room population
#[derive(Debug, Clone)]
pub struct PopulationOptions {
    /// Chance of each encounter roll succeeding
    pub encounter_chance: f64,
    pub max_encounters: u32,
    pub encounters: WeightedTable<Encounter>,
}

/// A themed floor type
#[derive(Debug, Clone)]
pub struct FloorDefinition {
    /// Stable id used in room ids; no hyphens
    pub id: &'static str,
    pub name: &'static str,
    pub room_names: &'static [&'static str],
    pub depths: &'static [usize],
    pub appearance_weight: f64,
    /// Chance of another definition joining this one at the same depth
    pub blend_chance: f64,
    pub color: (u8, u8, u8),
    pub layout: LayoutOptions,
    pub population: PopulationOptions,
}

impl FloorDefinition {
    pub fn appears_at(&self, depth: usize) -> bool {
        self.depths.contains(&depth)
    }
}

/// The catalogue of floor definitions
#[derive(Debug, Clone)]
pub struct FloorCatalogue {
    definitions: Vec<Arc<FloorDefinition>>,
    max_depth: usize,
}

impl FloorCatalogue {
    pub fn new(definitions: Vec<FloorDefinition>) -> Self {
        let max_depth = definitions
            .iter()
            .flat_map(|def| def.depths.iter().copied())
            .max()
            .unwrap_or(0);
        Self {
            definitions: definitions.into_iter().map(Arc::new).collect(),
            max_depth,
        }
    }

    /// The built-in catalogue
    pub fn standard() -> Self {
        Self::new(standard_definitions())
    }

    pub fn definitions(&self) -> &[Arc<FloorDefinition>] {
        &self.definitions
    }

    /// Deepest depth any definition covers
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn find(&self, id: &str) -> Option<&Arc<FloorDefinition>> {
        self.definitions.iter().find(|def| def.id == id)
    }

    /// Definitions allowed at a depth
    pub fn at_depth(&self, depth: usize) -> Vec<&Arc<FloorDefinition>> {
        self.definitions
            .iter()
            .filter(|def| def.appears_at(depth))
            .collect()
    }

    /// Check that depths are covered contiguously from 0, that every
    /// definition can roll an encounter and that every blend chain terminates
    pub fn validate(&self) -> Result<(), DungeonError> {
        if self.definitions.is_empty() {
            return Err(DungeonError::EmptyCatalogue);
        }
        for def in &self.definitions {
            if def.population.encounters.is_empty() {
                return Err(DungeonError::EmptyEncounters {
                    definition: def.id.to_string(),
                });
            }
            if def.blend_chance >= 1.0 {
                return Err(DungeonError::SaturatedBlend {
                    definition: def.id.to_string(),
                });
            }
        }
        for depth in 0..=self.max_depth {
            let covered = self
                .definitions
                .iter()
                .any(|def| def.appears_at(depth) && def.appearance_weight > 0.0);
            if !covered {
                return Err(DungeonError::DepthGap(depth));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Built-in floors
// =============================================================================

fn standard_definitions() -> Vec<FloorDefinition> {
    vec![
        FloorDefinition {
            id: "mossy_cellars",
            name: "Mossy Cellars",
            room_names: &["Damp Cellar", "Mossy Storeroom", "Collapsed Pantry", "Dripping Vault"],
            depths: &[0, 1],
            appearance_weight: 10.0,
            blend_chance: 0.3,
            color: (110, 150, 90),
            layout: LayoutOptions {
                room_chance: 0.55,
                connection_chance: 0.25,
                width: Range::new(6, 9),
                length: Range::new(6, 9),
                room_count: Range::new(12, 20),
                exit_count: Range::new(1, 2),
            },
            population: PopulationOptions {
                encounter_chance: 0.3,
                max_encounters: 2,
                encounters: WeightedTable::new()
                    .with(Encounter::Creature(CreatureKind::GiantRat), 30.0)
                    .with(
                        Encounter::Groups(vec![EncounterGroup::creature(
                            CreatureKind::GreenSlime,
                            Range::new(1, 3),
                        )]),
                        25.0,
                    )
                    .with(Encounter::Creature(CreatureKind::CaveBat), 20.0)
                    .with(Encounter::Custom(entities::spawn_supply_crate), 15.0)
                    .with(
                        Encounter::Groups(vec![
                            EncounterGroup::creature(CreatureKind::GreenSlime, Range::new(1, 3)),
                            EncounterGroup::custom(entities::spawn_treasure_chest, 1),
                        ]),
                        2.0,
                    ),
            },
        },
        FloorDefinition {
            id: "glowcap_grotto",
            name: "Glowcap Grotto",
            room_names: &["Glowcap Hollow", "Spore Chamber", "Luminous Grotto", "Fungal Gallery"],
            depths: &[0, 1, 2],
            appearance_weight: 6.0,
            blend_chance: 0.4,
            color: (120, 230, 190),
            layout: LayoutOptions {
                room_chance: 0.7,
                connection_chance: 0.4,
                width: Range::new(5, 8),
                length: Range::new(7, 11),
                room_count: Range::new(10, 18),
                exit_count: Range::new(1, 3),
            },
            population: PopulationOptions {
                encounter_chance: 0.35,
                max_encounters: 2,
                encounters: WeightedTable::new()
                    .with(Encounter::Creature(CreatureKind::GlowcapSpriggan), 30.0)
                    .with_amount(Encounter::Creature(CreatureKind::CaveBat), Range::new(1, 2), 25.0)
                    .with(Encounter::Creature(CreatureKind::GreenSlime), 20.0)
                    .with(Encounter::Custom(entities::spawn_supply_crate), 10.0),
            },
        },
        FloorDefinition {
            id: "goblin_warrens",
            name: "Goblin Warrens",
            room_names: &["Goblin Den", "Cramped Tunnel", "Refuse Pit", "War Camp", "Spit Roast"],
            depths: &[1, 2, 3],
            appearance_weight: 8.0,
            blend_chance: 0.25,
            color: (160, 130, 60),
            layout: LayoutOptions {
                room_chance: 0.5,
                connection_chance: 0.15,
                width: Range::new(7, 11),
                length: Range::new(7, 11),
                room_count: Range::new(18, 30),
                exit_count: Range::new(1, 3),
            },
            population: PopulationOptions {
                encounter_chance: 0.4,
                max_encounters: 3,
                encounters: WeightedTable::new()
                    .with(
                        Encounter::Groups(vec![EncounterGroup::creature(
                            CreatureKind::Goblin,
                            Range::new(2, 4),
                        )]),
                        35.0,
                    )
                    .with(
                        Encounter::Groups(vec![
                            EncounterGroup::creature(CreatureKind::GoblinShaman, 1),
                            EncounterGroup::creature(CreatureKind::Goblin, Range::new(1, 2)),
                        ]),
                        15.0,
                    )
                    .with(Encounter::Creature(CreatureKind::CaveSpider), 20.0)
                    .with(Encounter::Creature(CreatureKind::GiantRat), 15.0)
                    .with(Encounter::Custom(entities::spawn_supply_crate), 10.0)
                    .with(Encounter::Custom(entities::spawn_treasure_chest), 3.0),
            },
        },
        FloorDefinition {
            id: "silent_ossuary",
            name: "Silent Ossuary",
            room_names: &["Bone Gallery", "Charnel Niche", "Skull Alcove", "Burial Hall"],
            depths: &[2, 3, 4],
            appearance_weight: 7.0,
            blend_chance: 0.3,
            color: (210, 200, 170),
            layout: LayoutOptions {
                room_chance: 0.45,
                connection_chance: 0.1,
                width: Range::new(8, 12),
                length: Range::new(5, 8),
                room_count: Range::new(15, 26),
                exit_count: Range::new(1, 2),
            },
            population: PopulationOptions {
                encounter_chance: 0.35,
                max_encounters: 2,
                encounters: WeightedTable::new()
                    .with_amount(Encounter::Creature(CreatureKind::Skeleton), Range::new(1, 3), 35.0)
                    .with(Encounter::Creature(CreatureKind::Ghoul), 20.0)
                    .with(Encounter::Creature(CreatureKind::Wraith), 8.0)
                    .with(Encounter::Custom(entities::spawn_burial_urn), 20.0)
                    .with(
                        Encounter::Groups(vec![
                            EncounterGroup::creature(CreatureKind::Wraith, 1),
                            EncounterGroup::custom(entities::spawn_treasure_chest, 1),
                        ]),
                        3.0,
                    ),
            },
        },
        FloorDefinition {
            id: "crystal_hollows",
            name: "Crystal Hollows",
            room_names: &["Geode Chamber", "Prism Hall", "Singing Cavern", "Shard Field"],
            depths: &[3, 4, 5],
            appearance_weight: 6.0,
            blend_chance: 0.35,
            color: (150, 200, 255),
            layout: LayoutOptions {
                room_chance: 0.6,
                connection_chance: 0.35,
                width: Range::new(6, 10),
                length: Range::new(6, 10),
                room_count: Range::new(14, 24),
                exit_count: Range::new(1, 2),
            },
            population: PopulationOptions {
                encounter_chance: 0.3,
                max_encounters: 2,
                encounters: WeightedTable::new()
                    .with(Encounter::Creature(CreatureKind::CrystalGolem), 15.0)
                    .with_amount(Encounter::Creature(CreatureKind::CaveSpider), Range::new(1, 3), 25.0)
                    .with(Encounter::Custom(entities::spawn_ore_seam), 35.0)
                    .with(Encounter::Custom(entities::spawn_treasure_chest), 4.0),
            },
        },
        FloorDefinition {
            id: "ember_depths",
            name: "Ember Depths",
            room_names: &["Cinder Vent", "Magma Shelf", "Ashen Hall", "Smouldering Fissure"],
            depths: &[4, 5],
            appearance_weight: 8.0,
            blend_chance: 0.2,
            color: (240, 110, 40),
            layout: LayoutOptions {
                room_chance: 0.5,
                connection_chance: 0.2,
                width: Range::new(8, 12),
                length: Range::new(8, 12),
                room_count: Range::new(20, 32),
                exit_count: Range::new(1, 2),
            },
            population: PopulationOptions {
                encounter_chance: 0.45,
                max_encounters: 3,
                encounters: WeightedTable::new()
                    .with(
                        Encounter::Groups(vec![EncounterGroup::creature(
                            CreatureKind::EmberImp,
                            Range::new(1, 3),
                        )]),
                        35.0,
                    )
                    .with(Encounter::Creature(CreatureKind::MagmaHound), 25.0)
                    .with(Encounter::Custom(entities::spawn_ore_seam), 15.0)
                    .with(
                        Encounter::Groups(vec![
                            EncounterGroup::creature(CreatureKind::MagmaHound, Range::new(1, 2)),
                            EncounterGroup::custom(entities::spawn_treasure_chest, 1),
                        ]),
                        4.0,
                    ),
            },
        },
        FloorDefinition {
            id: "abyssal_rift",
            name: "Abyssal Rift",
            room_names: &["Rift Edge", "Warped Chamber", "Starless Hall"],
            depths: &[5],
            appearance_weight: 3.0,
            blend_chance: 0.1,
            color: (110, 60, 160),
            layout: LayoutOptions {
                room_chance: 0.4,
                connection_chance: 0.3,
                width: Range::new(5, 8),
                length: Range::new(5, 8),
                room_count: Range::new(8, 14),
                exit_count: Range::new(1, 1),
            },
            population: PopulationOptions {
                encounter_chance: 0.5,
                max_encounters: 2,
                encounters: WeightedTable::new()
                    .with(Encounter::Creature(CreatureKind::VoidSpawn), 30.0)
                    .with_amount(Encounter::Creature(CreatureKind::Wraith), Range::new(1, 2), 30.0)
                    .with(Encounter::Custom(entities::spawn_treasure_chest), 10.0),
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalogue_is_valid() {
        let catalogue = FloorCatalogue::standard();
        assert!(catalogue.validate().is_ok());
        assert_eq!(catalogue.max_depth(), 5);
        for depth in 0..=catalogue.max_depth() {
            assert!(!catalogue.at_depth(depth).is_empty(), "depth {} uncovered", depth);
        }
    }

    #[test]
    fn test_definitions_are_generatable() {
        for def in FloorCatalogue::standard().definitions() {
            assert!(!def.id.contains('-'), "{} would break room ids", def.id);
            assert!(!def.room_names.is_empty());
            assert!(def.layout.exit_count.min >= 1);
            assert!(def.layout.room_count.min >= 1);
            assert!(def.layout.room_count.max <= def.layout.width.min * def.layout.length.min);
            assert!(!def.population.encounters.is_empty());
        }
    }

    #[test]
    fn test_validate_rejects_gaps() {
        let mut defs = standard_definitions();
        defs.retain(|def| !def.appears_at(3));
        let catalogue = FloorCatalogue::new(defs);
        assert_eq!(catalogue.max_depth(), 5);
        assert_eq!(catalogue.validate(), Err(DungeonError::DepthGap(3)));
    }

    #[test]
    fn test_validate_rejects_empty_encounters() {
        let mut defs = standard_definitions();
        defs[2].population.encounters = WeightedTable::new();
        let id = defs[2].id.to_string();
        assert_eq!(
            FloorCatalogue::new(defs).validate(),
            Err(DungeonError::EmptyEncounters { definition: id })
        );
    }

    #[test]
    fn test_validate_rejects_saturated_blend() {
        let mut defs = standard_definitions();
        defs[0].blend_chance = 1.0;
        let catalogue = FloorCatalogue::new(defs);
        assert!(matches!(
            catalogue.validate(),
            Err(DungeonError::SaturatedBlend { .. })
        ));
        assert!(FloorCatalogue::new(Vec::new()).validate().is_err());
    }
}
