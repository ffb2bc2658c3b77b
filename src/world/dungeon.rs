//! Dungeon data structure
//!
//! The per-depth grids own every room; floors only record where their
//! window sits in the shared grid and rooms point back at their floor by
//! index.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::coords::{grid_dims, resize_grid, Grid, Point};
use super::generation::FloorDefinition;
use super::location::{DungeonLocation, LocationId};

/// A room address in dungeon-global space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomPos {
    pub depth: usize,
    pub point: Point,
}

impl RoomPos {
    pub const fn new(depth: usize, point: Point) -> Self {
        Self { depth, point }
    }

    /// Same-depth orthogonal neighbours
    pub fn neighbors4(&self) -> impl Iterator<Item = RoomPos> {
        let depth = self.depth;
        self.point
            .neighbors4()
            .into_iter()
            .map(move |point| RoomPos::new(depth, point))
    }

    /// Orthogonal neighbours plus the cells directly above and below
    pub fn neighbors6(&self) -> Vec<RoomPos> {
        let mut neighbors: Vec<RoomPos> = self.neighbors4().collect();
        if self.depth > 0 {
            neighbors.push(RoomPos::new(self.depth - 1, self.point));
        }
        neighbors.push(RoomPos::new(self.depth + 1, self.point));
        neighbors
    }
}

impl fmt::Display for RoomPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ depth {}", self.point, self.depth)
    }
}

/// One themed floor occupying a window of a depth's grid
#[derive(Debug, Clone)]
pub struct FloorInstance {
    pub definition: Arc<FloorDefinition>,
    pub depth: usize,
    /// Floor-local grid dimensions (width, length)
    pub size: Point,
    /// Floor-local to dungeon-global translation
    pub offset: Point,
    /// Live room counter
    pub room_count: usize,
}

impl FloorInstance {
    pub fn to_global(&self, local: Point) -> Point {
        local + self.offset
    }

    pub fn to_local(&self, global: Point) -> Point {
        global - self.offset
    }

    /// Whether a floor-local point lies inside the floor
    pub fn contains_local(&self, local: Point) -> bool {
        local.x >= 0 && local.y >= 0 && local.x < self.size.x && local.y < self.size.y
    }

    pub fn contains_global(&self, global: Point) -> bool {
        self.contains_local(self.to_local(global))
    }

    /// The fewest rooms incremental deletion may leave behind
    pub fn min_rooms(&self) -> usize {
        self.definition.layout.room_count.min as usize
    }
}

/// Summary counts for logging
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DungeonStats {
    pub floors: usize,
    pub rooms: usize,
    pub exits: usize,
    pub rooms_per_depth: BTreeMap<usize, usize>,
}

impl fmt::Display for DungeonStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} depths, {} floors, {} rooms, {} exits",
            self.rooms_per_depth.len(),
            self.floors,
            self.rooms,
            self.exits
        )
    }
}

/// A structural problem found by [`Dungeon::validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureIssue {
    LocalOutOfBounds(RoomPos),
    GlobalOutOfBounds(RoomPos),
    DanglingExit { from: RoomPos, to: LocationId },
    OneWayExit { from: RoomPos, to: LocationId },
    NotAdjacent { from: RoomPos, to: LocationId },
}

/// The multi-level dungeon: `locations[depth][x][y]`
#[derive(Debug, Clone, Default)]
pub struct Dungeon {
    pub locations: Vec<Grid<DungeonLocation>>,
    pub floors: Vec<FloorInstance>,
}

impl Dungeon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth_count(&self) -> usize {
        self.locations.len()
    }

    /// Grid dimensions of a depth; `(0, 0)` if the depth has no grid yet
    pub fn dims(&self, depth: usize) -> (usize, usize) {
        self.locations.get(depth).map_or((0, 0), grid_dims)
    }

    pub fn in_bounds(&self, pos: RoomPos) -> bool {
        let (width, height) = self.dims(pos.depth);
        match pos.point.as_index() {
            Some((x, y)) => x < width && y < height,
            None => false,
        }
    }

    /// Grow the grid of `depth` (and any missing shallower depths)
    pub fn resize_depth(&mut self, depth: usize, width: usize, height: usize) {
        while self.locations.len() <= depth {
            self.locations.push(Vec::new());
        }
        let grid = std::mem::take(&mut self.locations[depth]);
        self.locations[depth] = resize_grid(grid, width, height);
    }

    pub fn location(&self, pos: RoomPos) -> Option<&DungeonLocation> {
        let (x, y) = pos.point.as_index()?;
        self.locations.get(pos.depth)?.get(x)?.get(y)?.as_ref()
    }

    pub fn location_mut(&mut self, pos: RoomPos) -> Option<&mut DungeonLocation> {
        let (x, y) = pos.point.as_index()?;
        self.locations.get_mut(pos.depth)?.get_mut(x)?.get_mut(y)?.as_mut()
    }

    pub fn is_occupied(&self, pos: RoomPos) -> bool {
        self.location(pos).is_some()
    }

    /// Look a room up by id
    pub fn find(&self, id: &LocationId) -> Option<&DungeonLocation> {
        let address = id.decode()?;
        self.location(RoomPos::new(address.depth, address.global))
            .filter(|location| location.id() == id)
    }

    pub fn find_mut(&mut self, id: &LocationId) -> Option<&mut DungeonLocation> {
        let address = id.decode()?;
        self.location_mut(RoomPos::new(address.depth, address.global))
            .filter(|location| location.id() == id)
    }

    /// Place a room in its cell. Hands the room back if the cell is taken or
    /// out of bounds.
    pub fn insert(&mut self, location: DungeonLocation) -> Result<(), DungeonLocation> {
        let pos = RoomPos::new(location.depth, location.global);
        if !self.in_bounds(pos) || self.is_occupied(pos) {
            return Err(location);
        }
        let (x, y) = (pos.point.x as usize, pos.point.y as usize);
        self.locations[pos.depth][x][y] = Some(location);
        Ok(())
    }

    pub fn remove(&mut self, pos: RoomPos) -> Option<DungeonLocation> {
        let (x, y) = pos.point.as_index()?;
        self.locations.get_mut(pos.depth)?.get_mut(x)?.get_mut(y)?.take()
    }

    /// Add a bidirectional exit between two rooms. Returns false if either
    /// room is missing.
    pub fn link(&mut self, a: RoomPos, b: RoomPos) -> bool {
        let (Some(id_a), Some(id_b)) = (
            self.location(a).map(|l| l.id().clone()),
            self.location(b).map(|l| l.id().clone()),
        ) else {
            return false;
        };
        if let Some(room) = self.location_mut(a) {
            room.location.exits.insert(id_b);
        }
        if let Some(room) = self.location_mut(b) {
            room.location.exits.insert(id_a);
        }
        true
    }

    /// Remove the exit between two rooms on both ends
    pub fn unlink(&mut self, a: RoomPos, b: RoomPos) {
        let id_a = self.location(a).map(|l| l.id().clone());
        let id_b = self.location(b).map(|l| l.id().clone());
        if let (Some(room), Some(id_b)) = (self.location_mut(a), id_b.as_ref()) {
            room.location.exits.remove(id_b);
        }
        if let (Some(room), Some(id_a)) = (self.location_mut(b), id_a.as_ref()) {
            room.location.exits.remove(id_a);
        }
    }

    pub fn is_linked(&self, a: RoomPos, b: RoomPos) -> bool {
        match (self.location(a), self.location(b)) {
            (Some(room), Some(other)) => room.exits().contains(other.id()),
            _ => false,
        }
    }

    /// Every room, depth by depth
    pub fn rooms(&self) -> impl Iterator<Item = &DungeonLocation> {
        self.locations
            .iter()
            .flat_map(|grid| grid.iter().flat_map(|column| column.iter().flatten()))
    }

    /// Address of every room
    pub fn room_positions(&self) -> Vec<RoomPos> {
        self.rooms()
            .map(|room| RoomPos::new(room.depth, room.global))
            .collect()
    }

    pub fn room_count(&self) -> usize {
        self.rooms().count()
    }

    /// Global positions of every room owned by a floor
    pub fn floor_rooms(&self, floor_index: usize) -> Vec<Point> {
        let Some(floor) = self.floors.get(floor_index) else {
            return Vec::new();
        };
        let mut points = Vec::with_capacity(floor.room_count);
        for x in 0..floor.size.x {
            for y in 0..floor.size.y {
                let global = floor.to_global(Point::new(x, y));
                if let Some(room) = self.location(RoomPos::new(floor.depth, global)) {
                    if room.floor == floor_index {
                        points.push(global);
                    }
                }
            }
        }
        points
    }

    /// Floor-local lookup
    pub fn floor_location(&self, floor_index: usize, local: Point) -> Option<&DungeonLocation> {
        let floor = self.floors.get(floor_index)?;
        if !floor.contains_local(local) {
            return None;
        }
        self.location(RoomPos::new(floor.depth, floor.to_global(local)))
            .filter(|room| room.floor == floor_index)
    }

    /// Depths holding at least one room
    pub fn populated_depths(&self) -> Vec<usize> {
        (0..self.depth_count())
            .filter(|&depth| {
                self.locations[depth]
                    .iter()
                    .any(|column| column.iter().any(Option::is_some))
            })
            .collect()
    }

    pub fn stats(&self) -> DungeonStats {
        let mut stats = DungeonStats {
            floors: self.floors.len(),
            ..Default::default()
        };
        for room in self.rooms() {
            stats.rooms += 1;
            stats.exits += room.exits().len();
            *stats.rooms_per_depth.entry(room.depth).or_insert(0) += 1;
        }
        stats
    }

    /// Check bounds, exit symmetry and same-depth adjacency for every room.
    /// Exits to rooms outside the dungeon (the town side) are ignored.
    pub fn validate(&self) -> Vec<StructureIssue> {
        let mut issues = Vec::new();
        for room in self.rooms() {
            let pos = RoomPos::new(room.depth, room.global);
            if !self.in_bounds(pos) {
                issues.push(StructureIssue::GlobalOutOfBounds(pos));
            }
            let local_ok = self
                .floors
                .get(room.floor)
                .is_some_and(|floor| floor.contains_local(room.local));
            if !local_ok {
                issues.push(StructureIssue::LocalOutOfBounds(pos));
            }

            for exit in room.exits() {
                if !exit.is_dungeon() {
                    continue;
                }
                let Some(target) = self.find(exit) else {
                    issues.push(StructureIssue::DanglingExit {
                        from: pos,
                        to: exit.clone(),
                    });
                    continue;
                };
                if !target.exits().contains(room.id()) {
                    issues.push(StructureIssue::OneWayExit {
                        from: pos,
                        to: exit.clone(),
                    });
                }
                let adjacent = if target.depth == room.depth {
                    target.global.manhattan(&room.global) == 1
                } else {
                    target.depth.abs_diff(room.depth) == 1 && target.global == room.global
                };
                if !adjacent {
                    issues.push(StructureIssue::NotAdjacent {
                        from: pos,
                        to: exit.clone(),
                    });
                }
            }
        }
        issues
    }
}
