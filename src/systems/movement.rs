//! Movement systems - Move orders, damage, and the per-frame tick

use bevy::prelude::*;

use crate::messages::*;
use crate::resources::{FrameCounter, FrameStats};
use crate::world::GameWorld;

/// Apply move orders. Orders for unknown or immobile units are ignored.
pub fn move_order_system(
    mut world: ResMut<GameWorld>,
    mut events: MessageReader<MoveOrderMsg>,
) {
    for event in events.read() {
        if !world.move_unit(event.id, event.x, event.y, event.dx, event.dy) {
            debug!("move: {:?} cannot move", event.id);
        }
    }
}

/// Apply damage and announce deaths. The dead stay in the world until a
/// `DespawnMsg` removes them.
pub fn damage_system(
    mut world: ResMut<GameWorld>,
    mut events: MessageReader<DamageMsg>,
    mut deaths: MessageWriter<UnitDiedMsg>,
) {
    for event in events.read() {
        match world.damage(event.id, event.amount) {
            Some(true) => {
                deaths.write(UnitDiedMsg { id: event.id });
            }
            Some(false) => {}
            None => debug!("damage: unknown {:?}", event.id),
        }
    }
}

/// Advance every dynamic unit and re-index the ones that moved.
pub fn tick_system(
    mut world: ResMut<GameWorld>,
    mut stats: ResMut<FrameStats>,
    mut counter: ResMut<FrameCounter>,
) {
    let (ticked, moved) = world.tick();
    *stats = FrameStats { ticked, moved, ..default() };
    counter.0 += 1;
}
