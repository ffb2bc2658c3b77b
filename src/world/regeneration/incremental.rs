//! Incremental dungeon mutation
//!
//! Every tick each room may lose itself or some exits, sprout a new
//! neighbour, or gain an exit. Rates are per second and scale with the
//! tick's elapsed time. Rooms with a player in them or next to them are
//! left alone, both as the room being mutated and as the far end of an
//! exit being added or removed.

use std::fmt;

use rand::Rng;

use crate::data::{roll_chance, RegenerationConfig};
use crate::world::dungeon::RoomPos;
use crate::world::generation::{place_room, populate_room};
use crate::world::realm::Realm;
use crate::world::LocationId;

/// What one mutation tick changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationReport {
    pub rooms_deleted: usize,
    pub exits_deleted: usize,
    pub rooms_created: usize,
    pub exits_created: usize,
    /// Rooms skipped because a player was close
    pub guarded: usize,
}

impl MutationReport {
    pub fn is_empty(&self) -> bool {
        self.rooms_deleted + self.exits_deleted + self.rooms_created + self.exits_created == 0
    }
}

impl fmt::Display for MutationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "-{} rooms, -{} exits, +{} rooms, +{} exits ({} guarded)",
            self.rooms_deleted, self.exits_deleted, self.rooms_created, self.exits_created, self.guarded
        )
    }
}

/// Run one mutation tick over every room present at its start
pub fn mutate_dungeon<R: Rng>(realm: &mut Realm, dt_secs: f64, rng: &mut R) -> MutationReport {
    let config = realm.config.regeneration.clone();
    let mut report = MutationReport::default();

    for pos in realm.dungeon.room_positions() {
        if !realm.dungeon.is_occupied(pos) {
            continue;
        }
        if realm.has_player_near(pos) {
            report.guarded += 1;
            continue;
        }

        if try_delete_room(realm, pos, &config, dt_secs, rng) {
            report.rooms_deleted += 1;
            continue;
        }
        report.exits_deleted += delete_exits(realm, pos, &config, dt_secs, rng);
        report.rooms_created += create_rooms(realm, pos, &config, dt_secs, rng);
        report.exits_created += create_exits(realm, pos, &config, dt_secs, rng);
    }

    if !report.is_empty() {
        log::debug!("Dungeon mutation: {}", report);
    }
    report
}

/// Whether a change at `pos` would touch the exits of a guarded room
fn touches_guarded(realm: &Realm, pos: RoomPos) -> bool {
    pos.neighbors6()
        .into_iter()
        .any(|n| realm.dungeon.is_occupied(n) && realm.has_player_near(n))
}

/// Delete the room unless its floor is at minimum size, it holds the
/// entrance link, or a neighbour it would drop exits from is guarded
fn try_delete_room<R: Rng>(
    realm: &mut Realm,
    pos: RoomPos,
    config: &RegenerationConfig,
    dt_secs: f64,
    rng: &mut R,
) -> bool {
    let Some(room) = realm.dungeon.location(pos) else {
        return false;
    };
    let Some(floor) = realm.dungeon.floors.get(room.floor) else {
        return false;
    };
    if floor.room_count <= floor.min_rooms() || room.exits().contains(&Realm::entrance_id()) {
        return false;
    }
    if touches_guarded(realm, pos) {
        return false;
    }
    if !roll_chance(rng, config.room_deletion_chance * dt_secs) {
        return false;
    }

    log::trace!("Deleting room {}", room.id());
    realm.delete_room(pos)
}

/// Drop dungeon-side exits, both ends at once. Exits into guarded rooms stay.
fn delete_exits<R: Rng>(
    realm: &mut Realm,
    pos: RoomPos,
    config: &RegenerationConfig,
    dt_secs: f64,
    rng: &mut R,
) -> usize {
    let Some(room) = realm.dungeon.location(pos) else {
        return 0;
    };
    let id = room.id().clone();
    let entrance = Realm::entrance_id();
    let candidates: Vec<LocationId> = room
        .exits()
        .iter()
        .filter(|exit| **exit != entrance)
        .filter(|exit| {
            exit.decode()
                .is_some_and(|addr| !realm.has_player_near(RoomPos::new(addr.depth, addr.global)))
        })
        .cloned()
        .collect();

    let mut deleted = 0;
    for exit in candidates {
        if roll_chance(rng, config.exit_deletion_chance * dt_secs) {
            log::trace!("Deleting exit {} <-> {}", id, exit);
            realm.unlink(&id, &exit);
            deleted += 1;
        }
    }
    deleted
}

/// Grow new rooms into empty cells of the room's floor
fn create_rooms<R: Rng>(
    realm: &mut Realm,
    pos: RoomPos,
    config: &RegenerationConfig,
    dt_secs: f64,
    rng: &mut R,
) -> usize {
    let Some(room) = realm.dungeon.location(pos) else {
        return 0;
    };
    let floor_index = room.floor;
    let Some(floor) = realm.dungeon.floors.get(floor_index) else {
        return 0;
    };
    let layout = floor.definition.layout.clone();
    let targets: Vec<RoomPos> = pos
        .neighbors4()
        .filter(|cell| floor.contains_global(cell.point) && !realm.dungeon.is_occupied(*cell))
        .collect();

    let mut created = 0;
    for cell in targets {
        if !roll_chance(rng, config.new_room_chance * dt_secs) || !roll_chance(rng, layout.room_chance) {
            continue;
        }
        // The new room's own neighbours may hold a player
        if realm.has_player_near(cell) {
            continue;
        }
        let Some(new_pos) = place_room(&mut realm.dungeon, floor_index, cell.point, rng) else {
            continue;
        };

        let neighbours: Vec<RoomPos> = new_pos
            .neighbors4()
            .filter(|n| realm.dungeon.is_occupied(*n))
            .collect();
        for neighbour in neighbours {
            if realm.has_player_near(neighbour) {
                continue;
            }
            if roll_chance(rng, layout.connection_chance) {
                realm.dungeon.link(new_pos, neighbour);
            }
        }

        if let Err(e) = populate_room(&mut realm.dungeon, &mut realm.entities, new_pos, rng) {
            log::warn!("Could not populate new room at {}: {}", new_pos, e);
        }
        log::trace!("Created room at {}", new_pos);
        created += 1;
    }
    created
}

/// Link the room to existing unguarded neighbours, including the cells
/// directly above and below. Links crossing into another floor are half as
/// likely.
fn create_exits<R: Rng>(
    realm: &mut Realm,
    pos: RoomPos,
    config: &RegenerationConfig,
    dt_secs: f64,
    rng: &mut R,
) -> usize {
    let Some(room) = realm.dungeon.location(pos) else {
        return 0;
    };
    let Some(floor) = realm.dungeon.floors.get(room.floor) else {
        return 0;
    };
    let connection_chance = floor.definition.layout.connection_chance;
    let candidates: Vec<(RoomPos, bool)> = pos
        .neighbors6()
        .into_iter()
        .filter_map(|n| {
            let neighbour = realm.dungeon.location(n)?;
            if room.exits().contains(neighbour.id()) || realm.has_player_near(n) {
                return None;
            }
            Some((n, neighbour.floor != room.floor))
        })
        .collect();

    let mut created = 0;
    for (neighbour, cross_floor) in candidates {
        let scale = if cross_floor { 0.5 } else { 1.0 };
        if roll_chance(rng, config.new_exit_chance * dt_secs * scale)
            && roll_chance(rng, connection_chance)
            && realm.dungeon.link(pos, neighbour)
        {
            log::trace!("Created exit {} <-> {}", pos, neighbour);
            created += 1;
        }
    }
    created
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RealmConfig;
    use crate::world::generation::FloorCatalogue;
    use crate::world::Point;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn realm_with_chances(seed: u64, chances: [f64; 4]) -> (Realm, StdRng) {
        let mut config = RealmConfig::default();
        let regeneration = &mut config.regeneration;
        regeneration.room_deletion_chance = chances[0];
        regeneration.exit_deletion_chance = chances[1];
        regeneration.new_room_chance = chances[2];
        regeneration.new_exit_chance = chances[3];

        let mut rng = StdRng::seed_from_u64(seed);
        let mut realm = Realm::new(FloorCatalogue::standard(), config);
        let dungeon = realm.build_dungeon(&mut rng).unwrap();
        realm.install_dungeon(dungeon);
        (realm, rng)
    }

    fn exits_of(realm: &Realm, pos: RoomPos) -> BTreeSet<LocationId> {
        realm.dungeon.location(pos).unwrap().exits().clone()
    }

    #[test]
    fn test_entrance_room_on_minimum_floor_survives() {
        let origin = RoomPos::new(0, Point::ORIGIN);
        for seed in 0..10 {
            let (mut realm, mut rng) = realm_with_chances(seed, [1.0, 0.0, 0.0, 0.0]);
            let floor = realm.dungeon.location(origin).unwrap().floor;
            let min = realm.dungeon.floors[floor].min_rooms();
            realm.dungeon.floors[floor].room_count = min;

            for _ in 0..5 {
                mutate_dungeon(&mut realm, 1.0, &mut rng);
            }
            assert!(realm.dungeon.is_occupied(origin));
            assert!(exits_of(&realm, origin).contains(&Realm::entrance_id()));
        }
    }

    #[test]
    fn test_deletion_stops_at_floor_minimum() {
        let (mut realm, mut rng) = realm_with_chances(5, [1.0, 0.0, 0.0, 0.0]);
        let before: Vec<usize> = realm.dungeon.floors.iter().map(|f| f.room_count).collect();

        let report = mutate_dungeon(&mut realm, 1.0, &mut rng);
        assert!(report.rooms_deleted > 0);

        for (floor, count) in realm.dungeon.floors.iter().zip(before) {
            assert!(floor.room_count >= count.min(floor.min_rooms()));
        }
        // Surviving exits still point at live rooms
        assert!(realm.dungeon.validate().is_empty());
    }

    #[test]
    fn test_player_guard_covers_all_passes() {
        for seed in 0..10 {
            let (mut realm, mut rng) = realm_with_chances(seed, [1.0, 1.0, 1.0, 1.0]);
            // Alternate between the seed room and a room one level down
            let depth = (seed % 2) as usize;
            let at = realm
                .dungeon
                .room_positions()
                .into_iter()
                .find(|pos| pos.depth == depth)
                .unwrap();
            let session = realm.connect_player("Dov");
            let player = realm.session(session).unwrap().player;
            let room_id = realm.dungeon.location(at).unwrap().id().clone();
            assert!(realm.move_entity(player, &room_id));

            let guarded: Vec<(RoomPos, BTreeSet<LocationId>)> = std::iter::once(at)
                .chain(at.neighbors6())
                .filter(|pos| realm.dungeon.is_occupied(*pos))
                .map(|pos| (pos, exits_of(&realm, pos)))
                .collect();

            let mut report = MutationReport::default();
            for _ in 0..3 {
                let tick = mutate_dungeon(&mut realm, 1.0, &mut rng);
                assert!(tick.guarded >= guarded.len());
                report.rooms_deleted += tick.rooms_deleted;
                report.exits_deleted += tick.exits_deleted;
            }
            assert!(report.rooms_deleted + report.exits_deleted > 0);

            // Neither the player's room nor any neighbour gained or lost an exit
            for (pos, exits) in &guarded {
                assert!(realm.dungeon.is_occupied(*pos), "guarded room {} deleted", pos);
                assert_eq!(&exits_of(&realm, *pos), exits, "exits of guarded room {} changed", pos);
            }
            // No room was grown next to the player
            for cell in at.neighbors6() {
                let was_there = guarded.iter().any(|(pos, _)| *pos == cell);
                assert_eq!(realm.dungeon.is_occupied(cell), was_there);
            }
            assert_eq!(realm.players_in(&room_id), vec![player]);
            assert!(realm.dungeon.validate().is_empty());
        }
    }

    #[test]
    fn test_entrance_link_never_deleted() {
        let origin = RoomPos::new(0, Point::ORIGIN);
        for seed in 0..5 {
            let (mut realm, mut rng) = realm_with_chances(seed, [0.0, 1.0, 0.0, 0.0]);
            let seed_id = realm.dungeon.location(origin).unwrap().id().clone();

            let mut deleted = 0;
            for _ in 0..5 {
                deleted += mutate_dungeon(&mut realm, 1.0, &mut rng).exits_deleted;
            }
            assert!(deleted > 0);

            assert!(exits_of(&realm, origin).contains(&Realm::entrance_id()));
            let entrance = realm.location(&Realm::entrance_id()).unwrap();
            assert!(entrance.exits.contains(&seed_id));
        }
    }

    #[test]
    fn test_growth_respects_floor_bounds() {
        let (mut realm, mut rng) = realm_with_chances(8, [0.0, 0.0, 1.0, 1.0]);
        let before = realm.dungeon.room_count();
        let entities_before = realm.entities.len();

        let mut created = 0;
        for _ in 0..3 {
            created += mutate_dungeon(&mut realm, 1.0, &mut rng).rooms_created;
        }
        assert!(created > 0);
        assert_eq!(realm.dungeon.room_count(), before + created);
        assert!(realm.entities.len() >= entities_before);
        assert!(realm.dungeon.validate().is_empty());
        for (index, floor) in realm.dungeon.floors.iter().enumerate() {
            assert_eq!(floor.room_count, realm.dungeon.floor_rooms(index).len());
        }
    }

    #[test]
    fn test_zero_rates_change_nothing() {
        let (mut realm, mut rng) = realm_with_chances(9, [0.0, 0.0, 0.0, 0.0]);
        let stats = realm.dungeon.stats();
        let report = mutate_dungeon(&mut realm, 5.0, &mut rng);
        assert!(report.is_empty());
        assert_eq!(realm.dungeon.stats(), stats);
    }
}
