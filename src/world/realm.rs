//! The realm: every room, entity and session in one owned registry
//!
//! Town rooms are hand-built and permanent; dungeon rooms live in the
//! active [`Dungeon`] and are swapped out wholesale on a full rebuild.

use std::collections::{BTreeMap, HashSet};

use hecs::{Entity, World};
use rand::Rng;

use super::dungeon::{Dungeon, RoomPos};
use super::generation::{generate_dungeon, populate_dungeon, FloorCatalogue};
use super::location::{Location, LocationId};
use super::Point;
use crate::data::RealmConfig;
use crate::ecs::{InRoom, Player, SessionId};
use crate::entities::spawn_player;
use crate::error::DungeonError;

/// The fixed room connecting the town to the dungeon
pub const ENTRANCE_ID: &str = "dungeon_entrance";
pub const TOWN_SQUARE_ID: &str = "town_square";

/// Outgoing text for the session layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// To every connected session
    Global(String),
    /// To whoever is in one room
    Room { room: LocationId, text: String },
}

/// A connected player
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub player: Entity,
    /// Rooms this player has seen
    pub map_memory: HashSet<LocationId>,
}

pub struct Realm {
    pub catalogue: FloorCatalogue,
    pub config: RealmConfig,
    town: BTreeMap<LocationId, Location>,
    pub dungeon: Dungeon,
    pub entities: World,
    sessions: BTreeMap<SessionId, Session>,
    notices: Vec<Notice>,
    next_session: u32,
}

impl Realm {
    /// A realm with the town built and no dungeon yet
    pub fn new(catalogue: FloorCatalogue, config: RealmConfig) -> Self {
        let square = LocationId::named(TOWN_SQUARE_ID);
        let entrance = LocationId::named(ENTRANCE_ID);

        let mut town = BTreeMap::new();
        let mut square_room = Location::new(square.clone(), "Town Square");
        square_room.exits.insert(entrance.clone());
        let mut entrance_room = Location::new(entrance.clone(), "Dungeon Entrance");
        entrance_room.exits.insert(square.clone());
        town.insert(square, square_room);
        town.insert(entrance, entrance_room);

        Self {
            catalogue,
            config,
            town,
            dungeon: Dungeon::new(),
            entities: World::new(),
            sessions: BTreeMap::new(),
            notices: Vec::new(),
            next_session: 1,
        }
    }

    pub fn entrance_id() -> LocationId {
        LocationId::named(ENTRANCE_ID)
    }

    pub fn town_square_id() -> LocationId {
        LocationId::named(TOWN_SQUARE_ID)
    }

    // =========================================================================
    // Rooms
    // =========================================================================

    pub fn location(&self, id: &LocationId) -> Option<&Location> {
        match self.town.get(id) {
            Some(room) => Some(room),
            None => self.dungeon.find(id).map(|room| &room.location),
        }
    }

    pub fn location_mut(&mut self, id: &LocationId) -> Option<&mut Location> {
        match self.town.get_mut(id) {
            Some(room) => Some(room),
            None => self.dungeon.find_mut(id).map(|room| &mut room.location),
        }
    }

    /// Add an exit both ways between any two rooms
    pub fn link(&mut self, a: &LocationId, b: &LocationId) -> bool {
        if self.location(a).is_none() || self.location(b).is_none() {
            return false;
        }
        if let Some(room) = self.location_mut(a) {
            room.exits.insert(b.clone());
        }
        if let Some(room) = self.location_mut(b) {
            room.exits.insert(a.clone());
        }
        true
    }

    pub fn unlink(&mut self, a: &LocationId, b: &LocationId) {
        if let Some(room) = self.location_mut(a) {
            room.exits.remove(b);
        }
        if let Some(room) = self.location_mut(b) {
            room.exits.remove(a);
        }
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Player entities present in a room
    pub fn players_in(&self, id: &LocationId) -> Vec<Entity> {
        self.location(id)
            .map(|room| {
                room.entities
                    .iter()
                    .copied()
                    .filter(|&entity| self.entities.get::<&Player>(entity).is_ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether a player stands in the room or any of its six neighbours
    pub fn has_player_near(&self, pos: RoomPos) -> bool {
        std::iter::once(pos)
            .chain(pos.neighbors6())
            .filter_map(|p| self.dungeon.location(p))
            .any(|room| !self.players_in(room.id()).is_empty())
    }

    /// Move an entity into a room, updating both membership sets. Fails if
    /// the destination does not exist.
    pub fn move_entity(&mut self, entity: Entity, to: &LocationId) -> bool {
        if self.location(to).is_none() {
            return false;
        }
        let from = self
            .entities
            .get::<&InRoom>(entity)
            .ok()
            .map(|in_room| in_room.0.clone());
        if let Some(from) = from {
            if let Some(room) = self.location_mut(&from) {
                room.entities.remove(&entity);
            }
        }
        if let Some(room) = self.location_mut(to) {
            room.entities.insert(entity);
        }
        if let Ok(mut in_room) = self.entities.get::<&mut InRoom>(entity) {
            in_room.0 = to.clone();
        }
        true
    }

    /// Despawn an entity and drop it from its room
    pub fn despawn(&mut self, entity: Entity) {
        let room = self
            .entities
            .get::<&InRoom>(entity)
            .ok()
            .map(|in_room| in_room.0.clone());
        if let Some(id) = room {
            if let Some(room) = self.location_mut(&id) {
                room.entities.remove(&entity);
            }
        }
        let _ = self.entities.despawn(entity);
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Spawn a player in the town square and open a session for it
    pub fn connect_player(&mut self, name: &str) -> SessionId {
        let id = SessionId(self.next_session);
        self.next_session += 1;

        let square = Self::town_square_id();
        let player = spawn_player(&mut self.entities, name, id, &square);
        if let Some(room) = self.location_mut(&square) {
            room.entities.insert(player);
        }
        self.sessions.insert(
            id,
            Session {
                id,
                player,
                map_memory: HashSet::from([square]),
            },
        );
        log::info!("{} connected as session {}", name, id.0);
        id
    }

    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    /// Record a room in a session's map memory
    pub fn remember(&mut self, id: SessionId, room: &LocationId) {
        if let Some(session) = self.sessions.get_mut(&id) {
            session.map_memory.insert(room.clone());
        }
    }

    /// Every session forgets the dungeon; town rooms stay known
    pub fn reset_map_memory(&mut self) {
        for session in self.sessions.values_mut() {
            session.map_memory.retain(|room| !room.is_dungeon());
        }
    }

    // =========================================================================
    // Notices
    // =========================================================================

    pub fn broadcast(&mut self, text: impl Into<String>) {
        self.notices.push(Notice::Global(text.into()));
    }

    pub fn broadcast_to(&mut self, room: &LocationId, text: impl Into<String>) {
        self.notices.push(Notice::Room {
            room: room.clone(),
            text: text.into(),
        });
    }

    /// Hand queued notices to the session layer
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // =========================================================================
    // Dungeon lifecycle
    // =========================================================================

    /// Generate and populate a dungeon without touching the active one.
    /// On failure nothing it spawned is left behind.
    pub fn build_dungeon<R: Rng>(&mut self, rng: &mut R) -> Result<Dungeon, DungeonError> {
        let mut dungeon = generate_dungeon(&self.catalogue, &self.config.generation, rng)?;
        if let Err(e) = populate_dungeon(&mut dungeon, &mut self.entities, rng) {
            self.discard_dungeon(dungeon);
            return Err(e);
        }
        Ok(dungeon)
    }

    /// Despawn every entity of a dungeon that was never installed
    pub fn discard_dungeon(&mut self, dungeon: Dungeon) {
        for room in dungeon.rooms() {
            for &entity in &room.location.entities {
                let _ = self.entities.despawn(entity);
            }
        }
    }

    /// Make a dungeon the active one and open the entrance to its seed room
    pub fn install_dungeon(&mut self, dungeon: Dungeon) {
        self.dungeon = dungeon;
        let seed_room = self
            .dungeon
            .location(RoomPos::new(0, Point::ORIGIN))
            .map(|room| room.id().clone());
        match seed_room {
            Some(id) => {
                self.link(&Self::entrance_id(), &id);
            }
            None => log::warn!("Installed dungeon has no seed room, entrance leads nowhere"),
        }
    }

    /// Tear the active dungeon down: players go to the entrance, everything
    /// else in it is despawned and the entrance keeps only its town exits.
    /// Returns the number of players relocated.
    pub fn clear_dungeon(&mut self) -> usize {
        let entrance = Self::entrance_id();
        let mut relocated = 0;

        for pos in self.dungeon.room_positions() {
            relocated += self.evacuate_room(pos, &entrance);
        }
        self.dungeon = Dungeon::new();

        if let Some(room) = self.town.get_mut(&entrance) {
            room.exits.retain(|exit| !exit.is_dungeon());
        }
        relocated
    }

    /// Delete one dungeon room: inbound exits are removed, players move to
    /// the entrance, other entities are despawned and the floor counter
    /// drops. Returns false if there was no room.
    pub fn delete_room(&mut self, pos: RoomPos) -> bool {
        let Some(room) = self.dungeon.location(pos) else {
            return false;
        };
        let id = room.id().clone();
        let floor = room.floor;
        let exits: Vec<LocationId> = room.exits().iter().cloned().collect();

        for exit in &exits {
            if let Some(neighbor) = self.location_mut(exit) {
                neighbor.exits.remove(&id);
            }
        }
        self.evacuate_room(pos, &Self::entrance_id());
        self.dungeon.remove(pos);
        if let Some(floor) = self.dungeon.floors.get_mut(floor) {
            floor.room_count = floor.room_count.saturating_sub(1);
        }
        true
    }

    /// Empty a room ahead of its removal
    fn evacuate_room(&mut self, pos: RoomPos, refuge: &LocationId) -> usize {
        let Some(room) = self.dungeon.location(pos) else {
            return 0;
        };
        let entities: Vec<Entity> = room.location.entities.iter().copied().collect();
        let mut relocated = 0;
        for entity in entities {
            if self.entities.get::<&Player>(entity).is_ok() {
                self.move_entity(entity, refuge);
                relocated += 1;
            } else {
                self.despawn(entity);
            }
        }
        relocated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn realm_with_dungeon(seed: u64) -> (Realm, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut realm = Realm::new(FloorCatalogue::standard(), RealmConfig::default());
        let dungeon = realm.build_dungeon(&mut rng).unwrap();
        realm.install_dungeon(dungeon);
        (realm, rng)
    }

    fn seed_room_id(realm: &Realm) -> LocationId {
        realm
            .dungeon
            .location(RoomPos::new(0, Point::ORIGIN))
            .unwrap()
            .id()
            .clone()
    }

    #[test]
    fn test_town_is_linked() {
        let realm = Realm::new(FloorCatalogue::standard(), RealmConfig::default());
        let square = realm.location(&Realm::town_square_id()).unwrap();
        assert!(square.exits.contains(&Realm::entrance_id()));
        let entrance = realm.location(&Realm::entrance_id()).unwrap();
        assert!(entrance.exits.contains(&Realm::town_square_id()));
    }

    #[test]
    fn test_install_links_entrance_to_seed_room() {
        let (realm, _) = realm_with_dungeon(1);
        let seed = seed_room_id(&realm);
        assert!(realm.location(&Realm::entrance_id()).unwrap().exits.contains(&seed));
        assert!(realm.location(&seed).unwrap().exits.contains(&Realm::entrance_id()));
    }

    #[test]
    fn test_move_and_presence() {
        let (mut realm, _) = realm_with_dungeon(2);
        let session = realm.connect_player("Ada");
        let player = realm.session(session).unwrap().player;
        let seed = seed_room_id(&realm);

        assert_eq!(realm.players_in(&Realm::town_square_id()), vec![player]);
        assert!(!realm.has_player_near(RoomPos::new(0, Point::ORIGIN)));

        assert!(realm.move_entity(player, &seed));
        assert!(realm.players_in(&Realm::town_square_id()).is_empty());
        assert_eq!(realm.players_in(&seed), vec![player]);
        assert_eq!(realm.entities.get::<&InRoom>(player).unwrap().0, seed);
        assert!(realm.has_player_near(RoomPos::new(0, Point::ORIGIN)));
        assert!(realm.has_player_near(RoomPos::new(0, Point::new(1, 0))));
        assert!(realm.has_player_near(RoomPos::new(1, Point::ORIGIN)));
        assert!(!realm.has_player_near(RoomPos::new(0, Point::new(2, 0))));

        assert!(!realm.move_entity(player, &LocationId::named("nowhere")));
    }

    #[test]
    fn test_clear_dungeon_relocates_players() {
        let (mut realm, _) = realm_with_dungeon(3);
        let session = realm.connect_player("Bram");
        let player = realm.session(session).unwrap().player;
        let seed = seed_room_id(&realm);
        realm.move_entity(player, &seed);
        realm.remember(session, &seed);

        let creatures_before = realm.entities.len();
        assert_eq!(realm.clear_dungeon(), 1);
        realm.reset_map_memory();

        assert_eq!(realm.dungeon.room_count(), 0);
        assert_eq!(realm.entities.len(), 1, "{} entities before", creatures_before);
        assert_eq!(realm.players_in(&Realm::entrance_id()), vec![player]);
        let entrance = realm.location(&Realm::entrance_id()).unwrap();
        assert!(entrance.exits.iter().all(|exit| !exit.is_dungeon()));
        let memory = &realm.session(session).unwrap().map_memory;
        assert!(!memory.contains(&seed));
        assert!(memory.contains(&Realm::town_square_id()));
    }

    #[test]
    fn test_delete_room_cleans_up() {
        let (mut realm, _) = realm_with_dungeon(4);
        let pos = RoomPos::new(0, Point::ORIGIN);
        let seed = seed_room_id(&realm);
        let floor = realm.dungeon.location(pos).unwrap().floor;
        let count = realm.dungeon.floors[floor].room_count;
        let neighbours: Vec<LocationId> = realm.location(&seed).unwrap().exits.iter().cloned().collect();

        assert!(realm.delete_room(pos));
        assert!(!realm.dungeon.is_occupied(pos));
        assert_eq!(realm.dungeon.floors[floor].room_count, count - 1);
        for id in neighbours {
            assert!(!realm.location(&id).unwrap().exits.contains(&seed));
        }
        assert!(realm.dungeon.validate().is_empty());
        assert!(!realm.delete_room(pos));
    }

    #[test]
    fn test_notices_drain() {
        let mut realm = Realm::new(FloorCatalogue::standard(), RealmConfig::default());
        realm.broadcast("The earth trembles.");
        realm.broadcast_to(&Realm::entrance_id(), "A draft rises from below.");
        let notices = realm.drain_notices();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0], Notice::Global("The earth trembles.".to_string()));
        assert!(realm.drain_notices().is_empty());
    }
}
