//! Floor layout generation
//!
//! Flood-fill room expansion on a grid. A floor grows outward from its
//! starting rooms, one FIFO wave at a time, rolling `room_chance` for every
//! empty neighbour and `connection_chance` for every unlinked filled one.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use super::floors::{FloorCatalogue, FloorDefinition};
use crate::data::{roll_chance, Amount, GenerationConfig, WeightedTable};
use crate::error::{DungeonError, GenerationPhase};
use crate::world::dungeon::{Dungeon, FloorInstance, RoomPos};
use crate::world::location::{DungeonLocation, Location, LocationId};
use crate::world::Point;

/// Result of generating one floor
#[derive(Debug, Clone)]
pub struct GeneratedFloor {
    pub index: usize,
    /// Global positions of every room the floor owns
    pub rooms: Vec<Point>,
}

/// Fail with every coordinate in `points` that has no room at `depth`
pub fn ensure_generated(
    dungeon: &Dungeon,
    depth: usize,
    points: &[Point],
    phase: GenerationPhase,
) -> Result<(), DungeonError> {
    let missing: Vec<Point> = points
        .iter()
        .copied()
        .filter(|point| !dungeon.is_occupied(RoomPos::new(depth, *point)))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DungeonError::MissingRooms {
            phase,
            depth,
            missing,
        })
    }
}

/// Pick the definitions sharing a depth. The first pick is free; each
/// further pick happens with the product of the blend chances rolled so far.
pub fn choose_definitions<R: Rng + ?Sized>(
    catalogue: &FloorCatalogue,
    depth: usize,
    rng: &mut R,
) -> Result<Vec<Arc<FloorDefinition>>, DungeonError> {
    let candidates = catalogue.at_depth(depth);
    if candidates.is_empty() {
        return Err(DungeonError::DepthGap(depth));
    }

    let mut table = WeightedTable::new();
    for (index, def) in candidates.iter().enumerate() {
        table.push(index, Amount::Fixed(1), def.appearance_weight);
    }

    let mut chosen: Vec<usize> = Vec::new();
    let mut chance = 1.0;
    loop {
        let index = *table.roll(rng)?.item;
        if !chosen.contains(&index) {
            chosen.push(index);
        }
        chance *= candidates[index].blend_chance;
        if chosen.len() == candidates.len() || !roll_chance(rng, chance) {
            break;
        }
    }

    Ok(chosen
        .into_iter()
        .map(|index| Arc::clone(candidates[index]))
        .collect())
}

/// Hand starting points out to `count` definitions: one random point each,
/// then every leftover point to the definition whose first point is nearest.
/// Definitions beyond the number of points get nothing.
pub fn assign_starting_points<R: Rng + ?Sized>(
    count: usize,
    points: &[Point],
    rng: &mut R,
) -> Vec<Vec<Point>> {
    let mut shuffled = points.to_vec();
    shuffled.shuffle(rng);

    let mut assignments: Vec<Vec<Point>> = vec![Vec::new(); count];
    let mut leftovers = shuffled.into_iter();
    for slot in assignments.iter_mut() {
        match leftovers.next() {
            Some(point) => slot.push(point),
            None => break,
        }
    }

    for point in leftovers {
        let nearest = assignments
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.first().map(|first| (index, first.euclidean(&point))))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index);
        if let Some(index) = nearest {
            assignments[index].push(point);
        }
    }

    assignments
}

/// Materialize a room of `floor_index` at a global point. Returns `None` if
/// the point is outside the floor or the cell is already taken.
pub fn place_room<R: Rng + ?Sized>(
    dungeon: &mut Dungeon,
    floor_index: usize,
    global: Point,
    rng: &mut R,
) -> Option<RoomPos> {
    let floor = dungeon.floors.get(floor_index)?;
    let local = floor.to_local(global);
    if !floor.contains_local(local) {
        return None;
    }

    let depth = floor.depth;
    let definition = &floor.definition;
    let name = definition
        .room_names
        .choose(rng)
        .copied()
        .unwrap_or(definition.name);
    let location = Location::new(LocationId::dungeon(definition.id, global, depth), name);

    dungeon
        .insert(DungeonLocation {
            location,
            floor: floor_index,
            depth,
            global,
            local,
        })
        .ok()?;
    dungeon.floors[floor_index].room_count += 1;
    Some(RoomPos::new(depth, global))
}

/// Generate one floor at `depth` seeded from `starting_points` (global).
///
/// `reserved` holds every starting point of the depth; the flood fill never
/// claims another floor's starting cell, so each blended floor keeps at
/// least its starting rooms. Any other contested cell goes to whichever
/// floor reaches it first.
pub fn generate_floor<R: Rng + ?Sized>(
    dungeon: &mut Dungeon,
    definition: &Arc<FloorDefinition>,
    depth: usize,
    starting_points: &[Point],
    reserved: &HashSet<Point>,
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<GeneratedFloor, DungeonError> {
    let (min, max) = bounding_box(starting_points).ok_or_else(|| DungeonError::FloorExhausted {
        definition: definition.id.to_string(),
        depth,
        attempts: 0,
    })?;
    if min.x < 0 || min.y < 0 {
        return Err(DungeonError::OutOfBounds {
            phase: GenerationPhase::StartingRooms,
            depth,
            point: min,
        });
    }

    // Floor footprint: the sampled size, stretched to cover every starting point
    let span = max - min + Point::new(1, 1);
    let size = Point::new(
        (definition.layout.width.sample(rng) as i32).max(span.x),
        (definition.layout.length.sample(rng) as i32).max(span.y),
    );
    // Slide the starting points somewhere inside the slack, never past the origin
    let shift = Point::new(
        rng.gen_range(0..=(size.x - span.x).min(min.x)),
        rng.gen_range(0..=(size.y - span.y).min(min.y)),
    );
    let offset = min - shift;

    let preserved: Vec<Point> = dungeon
        .rooms()
        .filter(|room| room.depth == depth)
        .map(|room| room.global)
        .collect();
    dungeon.resize_depth(
        depth,
        (offset.x + size.x) as usize,
        (offset.y + size.y) as usize,
    );
    ensure_generated(dungeon, depth, &preserved, GenerationPhase::GridResize)?;

    let index = dungeon.floors.len();
    dungeon.floors.push(FloorInstance {
        definition: Arc::clone(definition),
        depth,
        size,
        offset,
        room_count: 0,
    });

    let mut rooms = Vec::new();
    for &point in starting_points {
        let pos = RoomPos::new(depth, point);
        if !dungeon.in_bounds(pos) {
            return Err(DungeonError::OutOfBounds {
                phase: GenerationPhase::StartingRooms,
                depth,
                point,
            });
        }
        if place_room(dungeon, index, point, rng).is_some() {
            rooms.push(point);
        } else {
            log::debug!("Starting point {} of '{}' already taken", pos, definition.id);
        }
    }
    ensure_generated(dungeon, depth, starting_points, GenerationPhase::StartingRooms)?;

    let target = definition.layout.room_count.sample(rng) as usize;
    let attempts = expand_floor(dungeon, index, &mut rooms, target, reserved, config.expansion_retries, rng);
    ensure_generated(dungeon, depth, &rooms, GenerationPhase::Expansion)?;

    if rooms.is_empty() {
        return Err(DungeonError::FloorExhausted {
            definition: definition.id.to_string(),
            depth,
            attempts,
        });
    }

    log::debug!(
        "Generated '{}' at depth {}: {} rooms (target {}) in {} passes, size {}x{}, offset {}",
        definition.id,
        depth,
        rooms.len(),
        target,
        attempts,
        size.x,
        size.y,
        offset
    );

    Ok(GeneratedFloor { index, rooms })
}

/// Grow a floor toward `target` rooms, re-running the flood fill from the
/// rooms placed so far whenever a pass stalls. Returns the passes used.
fn expand_floor<R: Rng + ?Sized>(
    dungeon: &mut Dungeon,
    floor_index: usize,
    rooms: &mut Vec<Point>,
    target: usize,
    reserved: &HashSet<Point>,
    retries: u32,
    rng: &mut R,
) -> u32 {
    let mut remaining = target.saturating_sub(rooms.len());
    let mut attempts = 0;

    while remaining > 0 && attempts <= retries {
        attempts += 1;
        let placed = expansion_pass(dungeon, floor_index, rooms, remaining, reserved, rng);
        remaining -= placed;
        if remaining > 0 {
            log::debug!(
                "Expansion of floor {} stalled {} rooms short (pass {}/{})",
                floor_index,
                remaining,
                attempts,
                retries + 1
            );
        }
    }

    if remaining > 0 {
        log::warn!(
            "Floor {} settled {} rooms short of its target after {} passes",
            floor_index,
            remaining,
            attempts
        );
    }
    attempts
}

/// One breadth-first wave from every current room. Returns rooms placed.
fn expansion_pass<R: Rng + ?Sized>(
    dungeon: &mut Dungeon,
    floor_index: usize,
    rooms: &mut Vec<Point>,
    remaining: usize,
    reserved: &HashSet<Point>,
    rng: &mut R,
) -> usize {
    let floor = dungeon.floors[floor_index].clone();
    let layout = &floor.definition.layout;
    let mut queue: VecDeque<Point> = rooms.iter().copied().collect();
    let mut placed = 0;

    while let Some(current) = queue.pop_front() {
        let here = RoomPos::new(floor.depth, current);
        let mut neighbors = current.neighbors4();
        neighbors.shuffle(rng);

        for neighbor in neighbors {
            if !floor.contains_global(neighbor) {
                continue;
            }
            let there = RoomPos::new(floor.depth, neighbor);

            if dungeon.is_occupied(there) {
                if !dungeon.is_linked(here, there) && roll_chance(rng, layout.connection_chance) {
                    dungeon.link(here, there);
                }
                continue;
            }

            if reserved.contains(&neighbor) || !roll_chance(rng, layout.room_chance) {
                continue;
            }
            if place_room(dungeon, floor_index, neighbor, rng).is_some() {
                dungeon.link(here, there);
                rooms.push(neighbor);
                queue.push_back(neighbor);
                placed += 1;
                if placed == remaining {
                    return placed;
                }
            }
        }
    }

    placed
}

/// Sample the rooms that lead down to the next depth
pub fn select_exits<R: Rng + ?Sized>(
    dungeon: &Dungeon,
    floor: &GeneratedFloor,
    rng: &mut R,
) -> Result<Vec<Point>, DungeonError> {
    let instance = &dungeon.floors[floor.index];
    let count = (instance.definition.layout.exit_count.sample(rng) as usize).min(floor.rooms.len());
    let exits: Vec<Point> = floor.rooms.choose_multiple(rng, count).copied().collect();
    ensure_generated(dungeon, instance.depth, &exits, GenerationPhase::ExitSelection)?;
    Ok(exits)
}

/// Link every exit room at `depth` to the room directly beneath it
pub fn connect_floors(dungeon: &mut Dungeon, depth: usize, exits: &[Point]) -> Result<(), DungeonError> {
    ensure_generated(dungeon, depth, exits, GenerationPhase::FloorStitching)?;
    ensure_generated(dungeon, depth + 1, exits, GenerationPhase::FloorStitching)?;
    for &point in exits {
        dungeon.link(RoomPos::new(depth, point), RoomPos::new(depth + 1, point));
    }
    Ok(())
}

fn bounding_box(points: &[Point]) -> Option<(Point, Point)> {
    let first = *points.first()?;
    Some(points.iter().fold((first, first), |(min, max), p| {
        (
            Point::new(min.x.min(p.x), min.y.min(p.y)),
            Point::new(max.x.max(p.x), max.y.max(p.y)),
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn definition(id: &str) -> Arc<FloorDefinition> {
        Arc::clone(FloorCatalogue::standard().find(id).unwrap())
    }

    #[test]
    fn test_ensure_generated_names_missing_points() {
        let dungeon = Dungeon::new();
        let err = ensure_generated(
            &dungeon,
            0,
            &[Point::new(1, 2), Point::new(3, 4)],
            GenerationPhase::ExitSelection,
        )
        .unwrap_err();
        assert_eq!(
            err,
            DungeonError::MissingRooms {
                phase: GenerationPhase::ExitSelection,
                depth: 0,
                missing: vec![Point::new(1, 2), Point::new(3, 4)],
            }
        );
        assert!(ensure_generated(&dungeon, 0, &[], GenerationPhase::Expansion).is_ok());
    }

    #[test]
    fn test_assign_starting_points() {
        let mut rng = StdRng::seed_from_u64(11);
        let points = [
            Point::new(0, 0),
            Point::new(1, 0),
            Point::new(10, 10),
            Point::new(11, 10),
        ];
        let assignments = assign_starting_points(2, &points, &mut rng);

        assert_eq!(assignments.len(), 2);
        let total: usize = assignments.iter().map(Vec::len).sum();
        assert_eq!(total, points.len());
        assert!(assignments.iter().all(|slot| !slot.is_empty()));

        // More definitions than points: the extras get nothing
        let sparse = assign_starting_points(3, &points[..1], &mut rng);
        assert_eq!(sparse.iter().filter(|slot| slot.is_empty()).count(), 2);
    }

    #[test]
    fn test_leftovers_join_nearest_first_point() {
        let mut rng = StdRng::seed_from_u64(2);
        let points = [Point::new(0, 0), Point::new(20, 20), Point::new(1, 1)];
        for _ in 0..20 {
            let assignments = assign_starting_points(2, &points, &mut rng);
            for slot in &assignments {
                if slot.len() == 2 {
                    assert!(slot[0].euclidean(&slot[1]) < 20.0);
                }
            }
        }
    }

    #[test]
    fn test_choose_definitions_valid_for_depth() {
        let catalogue = FloorCatalogue::standard();
        let mut rng = StdRng::seed_from_u64(5);
        for depth in 0..=catalogue.max_depth() {
            for _ in 0..20 {
                let chosen = choose_definitions(&catalogue, depth, &mut rng).unwrap();
                assert!(!chosen.is_empty());
                assert!(chosen.iter().all(|def| def.appears_at(depth)));
                let ids: HashSet<&str> = chosen.iter().map(|def| def.id).collect();
                assert_eq!(ids.len(), chosen.len());
            }
        }
        assert_eq!(
            choose_definitions(&catalogue, 99, &mut rng).unwrap_err(),
            DungeonError::DepthGap(99)
        );
    }

    #[test]
    fn test_generate_floor_from_origin() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut dungeon = Dungeon::new();
        let def = definition("mossy_cellars");
        let reserved = HashSet::from([Point::ORIGIN]);

        let floor = generate_floor(
            &mut dungeon,
            &def,
            0,
            &[Point::ORIGIN],
            &reserved,
            &GenerationConfig::default(),
            &mut rng,
        )
        .unwrap();

        let instance = &dungeon.floors[floor.index];
        assert_eq!(instance.offset, Point::ORIGIN);
        assert_eq!(instance.room_count, floor.rooms.len());
        assert!(floor.rooms.len() <= def.layout.room_count.max as usize);
        assert!(floor.rooms.contains(&Point::ORIGIN));
        for point in &floor.rooms {
            let room = dungeon.location(RoomPos::new(0, *point)).unwrap();
            assert!(instance.contains_local(room.local));
            assert_eq!(room.floor, floor.index);
        }
        assert!(dungeon.validate().is_empty());
    }

    #[test]
    fn test_blended_floor_keeps_reserved_start() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut dungeon = Dungeon::new();
        let starts = [Point::new(4, 4), Point::new(5, 4)];
        let reserved: HashSet<Point> = starts.iter().copied().collect();
        let config = GenerationConfig::default();

        let first = generate_floor(
            &mut dungeon,
            &definition("mossy_cellars"),
            0,
            &starts[..1],
            &reserved,
            &config,
            &mut rng,
        )
        .unwrap();
        assert!(!first.rooms.contains(&starts[1]));

        let second = generate_floor(
            &mut dungeon,
            &definition("glowcap_grotto"),
            0,
            &starts[1..],
            &reserved,
            &config,
            &mut rng,
        )
        .unwrap();
        assert!(second.rooms.contains(&starts[1]));
        assert_eq!(
            dungeon.location(RoomPos::new(0, starts[1])).unwrap().floor,
            second.index
        );
        assert!(dungeon.validate().is_empty());
    }

    #[test]
    fn test_starting_point_out_of_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut dungeon = Dungeon::new();
        let result = generate_floor(
            &mut dungeon,
            &definition("mossy_cellars"),
            0,
            &[Point::new(-1, 0)],
            &HashSet::new(),
            &GenerationConfig::default(),
            &mut rng,
        );
        assert!(matches!(
            result,
            Err(DungeonError::OutOfBounds {
                phase: GenerationPhase::StartingRooms,
                ..
            })
        ));
    }

    #[test]
    fn test_exits_and_stitching() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut dungeon = Dungeon::new();
        let config = GenerationConfig::default();
        let reserved = HashSet::from([Point::ORIGIN]);

        let top = generate_floor(
            &mut dungeon,
            &definition("mossy_cellars"),
            0,
            &[Point::ORIGIN],
            &reserved,
            &config,
            &mut rng,
        )
        .unwrap();
        let exits = select_exits(&dungeon, &top, &mut rng).unwrap();
        assert!(!exits.is_empty() && exits.len() <= 2);

        // Stitching before the next depth exists is an invariant violation
        let err = connect_floors(&mut dungeon, 0, &exits).unwrap_err();
        assert!(matches!(
            err,
            DungeonError::MissingRooms {
                phase: GenerationPhase::FloorStitching,
                depth: 1,
                ..
            }
        ));

        let reserved: HashSet<Point> = exits.iter().copied().collect();
        generate_floor(
            &mut dungeon,
            &definition("goblin_warrens"),
            1,
            &exits,
            &reserved,
            &config,
            &mut rng,
        )
        .unwrap();
        connect_floors(&mut dungeon, 0, &exits).unwrap();
        for point in &exits {
            assert!(dungeon.is_linked(RoomPos::new(0, *point), RoomPos::new(1, *point)));
        }
        assert!(dungeon.validate().is_empty());
    }

    #[test]
    fn test_place_room_outside_floor() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut dungeon = Dungeon::new();
        generate_floor(
            &mut dungeon,
            &definition("abyssal_rift"),
            0,
            &[Point::ORIGIN],
            &HashSet::from([Point::ORIGIN]),
            &GenerationConfig::default(),
            &mut rng,
        )
        .unwrap();
        let before = dungeon.floors[0].room_count;
        assert!(place_room(&mut dungeon, 0, Point::new(50, 50), &mut rng).is_none());
        assert!(place_room(&mut dungeon, 0, Point::ORIGIN, &mut rng).is_none());
        assert_eq!(dungeon.floors[0].room_count, before);
    }
}
