//! World module
//!
//! Rooms, the multi-level dungeon, its generator and the live
//! regeneration that keeps reshaping it.

pub mod coords;
pub mod dungeon;
pub mod generation;
pub mod location;
pub mod realm;
pub mod regeneration;
pub mod render;

pub use coords::{grid_dims, resize_grid, Grid, Point, Range};
pub use dungeon::{Dungeon, DungeonStats, FloorInstance, RoomPos, StructureIssue};
pub use location::{DungeonAddress, DungeonLocation, Location, LocationId};
pub use realm::{Notice, Realm, Session, ENTRANCE_ID, TOWN_SQUARE_ID};
pub use regeneration::{MutationReport, RegenerationDriver, TickOutcome};
pub use render::{render_depth, render_floor};
