//! Entity Component System module
//!
//! Rooms only record which entities they hold; the entities themselves
//! live in a `hecs::World` owned by the realm.

pub mod components;

pub use components::*;
