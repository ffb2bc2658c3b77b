//! Deepwarren - a living multi-level dungeon
//!
//! Generates themed, blended dungeon floors, fills them with creatures
//! and loot, and keeps reshaping them while players roam the town above.

pub mod data;
pub mod ecs;
pub mod entities;
pub mod error;
pub mod game;
pub mod items;
pub mod world;

// Re-export commonly used types
pub use data::RealmConfig;
pub use error::{ConfigError, DungeonError, GenerationPhase};
pub use world::generation::{generate_dungeon, populate_dungeon, FloorCatalogue};
pub use world::{Dungeon, Realm, RegenerationDriver};
