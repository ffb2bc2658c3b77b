//! Rooms and their identifiers
//!
//! Dungeon room ids are derived deterministically from
//! `{floor definition}-{x}-{y}-{depth}` so other rooms and sessions can
//! refer to a room by id alone.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use hecs::Entity;
use serde::{Deserialize, Serialize};

use super::coords::Point;

/// Identifier of any room in the realm
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationId(String);

/// The parts encoded in a dungeon room id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DungeonAddress {
    pub definition: String,
    pub global: Point,
    pub depth: usize,
}

impl LocationId {
    /// Id for a hand-authored (town) room
    pub fn named(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Deterministic id for a generated dungeon room
    pub fn dungeon(definition: &str, global: Point, depth: usize) -> Self {
        Self(format!("{}-{}-{}-{}", definition, global.x, global.y, depth))
    }

    /// Decode a dungeon id. Returns `None` for ids not produced by [`LocationId::dungeon`].
    pub fn decode(&self) -> Option<DungeonAddress> {
        let mut parts = self.0.rsplitn(4, '-');
        let depth = parts.next()?.parse().ok()?;
        let y = parts.next()?.parse().ok()?;
        let x = parts.next()?.parse().ok()?;
        let definition = parts.next()?;
        if definition.is_empty() {
            return None;
        }
        Some(DungeonAddress {
            definition: definition.to_string(),
            global: Point::new(x, y),
            depth,
        })
    }

    /// Whether this id addresses a generated dungeon room
    pub fn is_dungeon(&self) -> bool {
        self.decode().is_some()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single addressable room
#[derive(Debug, Clone)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    /// Ids of rooms reachable from here
    pub exits: BTreeSet<LocationId>,
    /// Entities currently present (owned by the entity world)
    pub entities: HashSet<Entity>,
}

impl Location {
    pub fn new(id: LocationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            exits: BTreeSet::new(),
            entities: HashSet::new(),
        }
    }
}

/// A generated dungeon room
#[derive(Debug, Clone)]
pub struct DungeonLocation {
    pub location: Location,
    /// Index of the owning floor in [`super::Dungeon::floors`]
    pub floor: usize,
    pub depth: usize,
    pub global: Point,
    pub local: Point,
}

impl DungeonLocation {
    pub fn id(&self) -> &LocationId {
        &self.location.id
    }

    pub fn exits(&self) -> &BTreeSet<LocationId> {
        &self.location.exits
    }
}
