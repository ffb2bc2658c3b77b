//! ECS Components
//!
//! Components attached to the entities that inhabit dungeon and town rooms.

use serde::{Deserialize, Serialize};

use crate::entities::CreatureKind;
use crate::items::ItemStack;
use crate::world::LocationId;

// ============================================================================
// Identity & Placement
// ============================================================================

/// Display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// The room an entity currently occupies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InRoom(pub LocationId);

// ============================================================================
// Actors
// ============================================================================

/// Session handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u32);

/// Marks a player-controlled entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub session: SessionId,
}

/// A spawned creature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creature {
    pub kind: CreatureKind,
}

/// Health pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }
}

// ============================================================================
// Containers
// ============================================================================

/// A lootable container (chest, crate, cache)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub items: Vec<ItemStack>,
}

impl Container {
    /// Add a stack, merging with an existing stack of the same kind
    pub fn add(&mut self, stack: ItemStack) {
        if stack.quantity == 0 {
            return;
        }
        match self.items.iter_mut().find(|s| s.kind == stack.kind) {
            Some(existing) => existing.quantity += stack.quantity,
            None => self.items.push(stack),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
