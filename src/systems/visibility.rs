//! Visibility systems - Viewport, selection, and the culled draw snapshot

use bevy::prelude::*;

use crate::geometry::Point;
use crate::messages::{SelectMsg, ViewportMsg};
use crate::render::RecordingCanvas;
use crate::resources::{FrameCounter, FrameStats, VisibleSet};
use crate::world::GameWorld;

/// Apply viewport changes. Only the last one in a frame matters.
pub fn viewport_system(
    mut world: ResMut<GameWorld>,
    mut events: MessageReader<ViewportMsg>,
) {
    if let Some(v) = events.read().last() {
        world.reshape_viewport(v.x, v.y, v.w, v.h);
    }
}

pub fn select_system(
    mut world: ResMut<GameWorld>,
    mut events: MessageReader<SelectMsg>,
) {
    for event in events.read() {
        let hit = world.select_at(Point::new(event.x, event.y));
        debug!("select: ({}, {}) -> {:?}", event.x, event.y, hit);
    }
}

/// Cull to the viewport and record the frame's sprites into `VisibleSet`.
/// The renderer reads the snapshot, never the world.
pub fn visibility_system(
    mut world: ResMut<GameWorld>,
    mut visible: ResMut<VisibleSet>,
    mut stats: ResMut<FrameStats>,
    counter: Res<FrameCounter>,
) {
    let list = world.cull();
    let mut canvas = RecordingCanvas {
        sprites: std::mem::take(&mut visible.sprites),
        selection: None,
    };
    canvas.clear();
    world.draw(&list, &mut canvas);

    visible.frame = counter.0;
    visible.sprites = canvas.sprites;
    visible.selection = canvas.selection;

    stats.visible_units = list.units.len();
    stats.visible_particles = list.particles.len();
    stats.dead_culled = list.dead_culled;
}
