//! Player entity creation

use hecs::World;

use crate::ecs::{Health, InRoom, Name, Player, SessionId};
use crate::world::LocationId;

/// Spawn a player avatar for a session
pub fn spawn_player(world: &mut World, name: &str, session: SessionId, room: &LocationId) -> hecs::Entity {
    world.spawn((
        Player { session },
        Name::new(name),
        Health::new(100),
        InRoom(room.clone()),
    ))
}
