//! Room population
//!
//! Rolls each room's encounter table and spawns the results into the
//! entity world. Purely additive: existing room entities are never touched.

use hecs::{Entity, World};
use rand::Rng;

use super::floors::{Encounter, Spawnable};
use crate::data::{roll_chance, WeightedTable};
use crate::ecs::{Container, InRoom, Name};
use crate::entities::spawn_creature;
use crate::error::DungeonError;
use crate::items::{ItemKind, ItemStack};
use crate::world::dungeon::{Dungeon, RoomPos};
use crate::world::{LocationId, Range};

/// Populate every room of a freshly generated dungeon. Returns the number
/// of entities spawned.
pub fn populate_dungeon<R: Rng>(
    dungeon: &mut Dungeon,
    world: &mut World,
    rng: &mut R,
) -> Result<usize, DungeonError> {
    let mut spawned = 0;
    for pos in dungeon.room_positions() {
        spawned += populate_room(dungeon, world, pos, rng)?;
    }
    log::debug!("Populated {} rooms with {} entities", dungeon.room_count(), spawned);
    Ok(spawned)
}

/// Roll `max_encounters` times at the floor's encounter chance and spawn
/// every hit into the room. Whatever spawned before an error is still
/// recorded in the room.
pub fn populate_room<R: Rng>(
    dungeon: &mut Dungeon,
    world: &mut World,
    pos: RoomPos,
    rng: &mut R,
) -> Result<usize, DungeonError> {
    let Some(room) = dungeon.location(pos) else {
        return Ok(0);
    };
    let Some(floor) = dungeon.floors.get(room.floor) else {
        return Ok(0);
    };
    let population = &floor.definition.population;
    let room_id = room.id().clone();

    let mut spawned = Vec::new();
    let mut result = Ok(());
    'rolls: for _ in 0..population.max_encounters {
        if !roll_chance(rng, population.encounter_chance) {
            continue;
        }
        let roll = match population.encounters.roll(rng) {
            Ok(roll) => roll,
            Err(e) => {
                result = Err(e);
                break;
            }
        };
        for _ in 0..roll.amount {
            if let Err(e) = resolve_encounter(roll.item, world, &room_id, rng, &mut spawned) {
                result = Err(e);
                break 'rolls;
            }
        }
    }

    let count = spawned.len();
    if let Some(room) = dungeon.location_mut(pos) {
        room.location.entities.extend(spawned);
    }
    result.map(|()| count)
}

/// Turn one encounter into concrete entities, appending them to `spawned`
pub fn resolve_encounter<R: Rng>(
    encounter: &Encounter,
    world: &mut World,
    room: &LocationId,
    rng: &mut R,
    spawned: &mut Vec<Entity>,
) -> Result<(), DungeonError> {
    match encounter {
        Encounter::Creature(kind) => spawned.push(spawn_creature(world, *kind, room)),
        Encounter::Custom(spawn) => spawned.push(spawn(world, room, rng)?),
        Encounter::Groups(groups) => {
            for group in groups {
                for _ in 0..group.amount.resolve(rng) {
                    let entity = match group.spawn {
                        Spawnable::Creature(kind) => spawn_creature(world, kind, room),
                        Spawnable::Custom(spawn) => spawn(world, room, rng)?,
                    };
                    spawned.push(entity);
                }
            }
        }
    }
    Ok(())
}

/// Spawn a container holding `rolls` draws from a loot table. An empty
/// table is a configuration error even when zero draws are rolled.
pub fn random_container<R: Rng + ?Sized>(
    world: &mut World,
    room: &LocationId,
    name: &str,
    loot: &WeightedTable<ItemKind>,
    rolls: Range,
    rng: &mut R,
) -> Result<Entity, DungeonError> {
    if loot.is_empty() {
        return Err(DungeonError::EmptyTable);
    }
    let mut container = Container::default();
    for _ in 0..rolls.sample(rng) {
        let roll = loot.roll(rng)?;
        container.add(ItemStack::new(*roll.item, roll.amount));
    }
    Ok(world.spawn((Name::new(name), container, InRoom(room.clone()))))
}
