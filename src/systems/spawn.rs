//! Spawn systems - Create and remove world entities from messages

use bevy::prelude::*;

use crate::components::Particle;
use crate::messages::*;
use crate::world::GameWorld;

/// Process spawn messages. Entities that cannot be indexed are dropped.
pub fn spawn_system(
    mut world: ResMut<GameWorld>,
    mut events: MessageReader<SpawnMsg>,
) {
    for event in events.read() {
        let (x, y) = (event.x, event.y);
        let spawned = match event.kind {
            SpawnKind::Villager { color } => world.spawn_villager(x, y, color),
            SpawnKind::Resource { kind } => world.spawn_resource(x, y, kind),
            SpawnKind::Building { kind, color } => world.spawn_building(kind, x, y, color),
            SpawnKind::Debris { color } => world.spawn_particle(|id| Particle::debris(id, x, y, color)),
        };
        match spawned {
            Some(id) => debug!("spawn: {:?} {:?} at ({}, {})", id, event.kind, x, y),
            None => warn!("spawn: {:?} at ({}, {}) rejected", event.kind, x, y),
        }
    }
}

/// Process despawn messages. The id may name a unit or a particle.
pub fn despawn_system(
    mut world: ResMut<GameWorld>,
    mut events: MessageReader<DespawnMsg>,
) {
    for event in events.read() {
        let removed = if world.unit(event.id).is_some() {
            world.erase(event.id)
        } else {
            world.erase_particle(event.id)
        };
        if !removed {
            debug!("despawn: unknown {:?}", event.id);
        }
    }
}
