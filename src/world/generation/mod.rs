//! Procedural dungeon generation
//!
//! Builds every depth from a single seed room at the origin: definitions
//! are chosen and blended per depth, each floor flood-fills out from its
//! starting points, and the exits it selects seed the depth below.

pub mod floors;
pub mod layout;
pub mod population;

pub use floors::{
    Encounter, EncounterGroup, FloorCatalogue, FloorDefinition, LayoutOptions, PopulationOptions,
    SpawnFn, Spawnable,
};
pub use layout::{
    assign_starting_points, choose_definitions, connect_floors, ensure_generated, generate_floor,
    place_room, select_exits, GeneratedFloor,
};
pub use population::{populate_dungeon, populate_room, random_container, resolve_encounter};

use std::collections::HashSet;

use rand::Rng;

use crate::data::GenerationConfig;
use crate::error::{DungeonError, GenerationPhase};
use crate::world::dungeon::Dungeon;
use crate::world::Point;

/// Generate a complete dungeon from the catalogue
pub fn generate_dungeon<R: Rng + ?Sized>(
    catalogue: &FloorCatalogue,
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<Dungeon, DungeonError> {
    catalogue.validate()?;

    let mut dungeon = Dungeon::new();
    let mut claimed: Vec<(usize, Vec<Point>)> = Vec::new();
    let mut starting_points = vec![Point::ORIGIN];

    for depth in 0..=catalogue.max_depth() {
        if starting_points.is_empty() {
            log::warn!("No starting points left for depth {}, dungeon ends early", depth);
            break;
        }

        let definitions = choose_definitions(catalogue, depth, rng)?;
        log::debug!(
            "Depth {}: {}",
            depth,
            definitions
                .iter()
                .map(|def| def.id)
                .collect::<Vec<_>>()
                .join(" + ")
        );

        let assignments = assign_starting_points(definitions.len(), &starting_points, rng);
        let reserved: HashSet<Point> = starting_points.iter().copied().collect();
        let mut exits = Vec::new();

        for (definition, points) in definitions.iter().zip(&assignments) {
            if points.is_empty() {
                continue;
            }
            let floor = generate_floor(&mut dungeon, definition, depth, points, &reserved, config, rng)?;
            exits.extend(select_exits(&dungeon, &floor, rng)?);
            claimed.push((depth, floor.rooms));
        }

        if depth > 0 {
            connect_floors(&mut dungeon, depth - 1, &starting_points)?;
        }
        claimed.push((depth, starting_points));
        starting_points = exits;
    }

    for (depth, points) in &claimed {
        ensure_generated(&dungeon, *depth, points, GenerationPhase::Completion)?;
    }

    log::info!("Dungeon generated: {}", dungeon.stats());
    Ok(dungeon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::dungeon::RoomPos;
    use crate::world::LocationId;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    const SEEDS: u64 = 40;

    fn dungeons() -> impl Iterator<Item = Dungeon> {
        let catalogue = FloorCatalogue::standard();
        (0..SEEDS).map(move |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            generate_dungeon(&catalogue, &GenerationConfig::default(), &mut rng).unwrap()
        })
    }

    /// Room id -> position, for walking exits
    fn index(dungeon: &Dungeon) -> HashMap<LocationId, RoomPos> {
        dungeon
            .rooms()
            .map(|room| (room.id().clone(), RoomPos::new(room.depth, room.global)))
            .collect()
    }

    fn walk(dungeon: &Dungeon, start: RoomPos, vertical_only: bool) -> HashSet<RoomPos> {
        let ids = index(dungeon);
        let mut seen = HashSet::from([start]);
        let mut stack = vec![start];
        while let Some(pos) = stack.pop() {
            let Some(room) = dungeon.location(pos) else {
                continue;
            };
            for exit in room.exits() {
                let Some(&next) = ids.get(exit) else {
                    continue;
                };
                if vertical_only && next.depth == pos.depth {
                    continue;
                }
                if seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        seen
    }

    #[test]
    fn test_depth_coverage() {
        let max_depth = FloorCatalogue::standard().max_depth();
        for dungeon in dungeons() {
            let expected: Vec<usize> = (0..=max_depth).collect();
            assert_eq!(dungeon.populated_depths(), expected);
        }
    }

    #[test]
    fn test_structure_is_sound() {
        // Adjacency, bounds and exit symmetry
        for dungeon in dungeons() {
            let issues = dungeon.validate();
            assert!(issues.is_empty(), "{:?}", issues);
        }
    }

    #[test]
    fn test_floor_counters_match_rooms() {
        for dungeon in dungeons() {
            for (index, floor) in dungeon.floors.iter().enumerate() {
                assert_eq!(floor.room_count, dungeon.floor_rooms(index).len());
                assert!(floor.room_count > 0);
            }
        }
    }

    #[test]
    fn test_seed_room_at_origin() {
        for dungeon in dungeons() {
            assert!(dungeon.is_occupied(RoomPos::new(0, Point::ORIGIN)));
        }
    }

    #[test]
    fn test_reachability_floor() {
        for dungeon in dungeons() {
            let total = dungeon.room_count();
            for start in dungeon.room_positions().into_iter().step_by(7) {
                let reached = walk(&dungeon, start, false).len();
                assert!(reached * 2 >= total, "reached {} of {}", reached, total);
            }
        }
    }

    #[test]
    fn test_cross_depth_exits_visit_every_depth() {
        for dungeon in dungeons() {
            // Every depth below the first hangs off the one above it
            for depth in 1..dungeon.depth_count() {
                let linked_up = dungeon.rooms().filter(|room| room.depth == depth).any(|room| {
                    room.exits()
                        .iter()
                        .filter_map(|exit| exit.decode())
                        .any(|address| address.depth + 1 == depth)
                });
                assert!(linked_up, "depth {} has no exit up", depth);
            }

            let everything = walk(&dungeon, RoomPos::new(0, Point::ORIGIN), false);
            let depths: HashSet<usize> = everything.iter().map(|pos| pos.depth).collect();
            assert_eq!(depths.len(), dungeon.depth_count());

            // Vertical exits alone always lead straight down a shaft
            for pos in dungeon.room_positions().into_iter().filter(|pos| pos.depth == 0) {
                for reached in walk(&dungeon, pos, true) {
                    assert_eq!(reached.point, pos.point);
                }
            }
        }
    }

    #[test]
    fn test_invalid_catalogue_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let empty = FloorCatalogue::new(Vec::new());
        assert_eq!(
            generate_dungeon(&empty, &GenerationConfig::default(), &mut rng).unwrap_err(),
            DungeonError::EmptyCatalogue
        );
    }

    #[test]
    fn test_no_retries_still_generates() {
        let catalogue = FloorCatalogue::standard();
        let config = GenerationConfig {
            expansion_retries: 0,
            seed: None,
        };
        let mut rng = StdRng::seed_from_u64(77);
        let dungeon = generate_dungeon(&catalogue, &config, &mut rng).unwrap();
        assert_eq!(dungeon.populated_depths().len(), catalogue.max_depth() + 1);
    }
}
