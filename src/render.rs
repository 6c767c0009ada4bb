//! Render boundary - The draw capability consumed from the rendering layer.
//!
//! The world never touches pixels. Each visible entity turns itself into one
//! or more `Sprite` records and hands them to a `Canvas` supplied by the
//! renderer, which owns textures and the actual blitting.

use crate::animation::AnimationId;
use crate::components::EntityId;
use crate::geometry::Aabb;

/// Draw layer of a sprite. Overlays follow their base sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    Base,
    /// Construction / garrison overlay on a building.
    Overlay,
}

/// One frame of an animation placed on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sprite {
    pub entity: EntityId,
    pub animation: AnimationId,
    pub frame: u32,
    /// Screen-space box (viewport-relative).
    pub screen: Aabb,
    pub color: u32,
    pub layer: Layer,
}

/// Entities that passed culling for one frame, each list ascending by id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DrawList {
    pub particles: Vec<EntityId>,
    pub units: Vec<EntityId>,
    /// Dead units inside the viewport that were left out.
    pub dead_culled: usize,
}

/// Draw capability supplied by the renderer. Must not mutate world state.
pub trait Canvas {
    fn draw_sprite(&mut self, sprite: &Sprite);

    /// Selection marker around a unit. Renderers without one can ignore it.
    fn draw_selection(&mut self, _entity: EntityId, _screen: Aabb) {}
}

/// Canvas that records what it was asked to draw.
/// Backs the `VisibleSet` snapshot and the tests.
#[derive(Clone, Debug, Default)]
pub struct RecordingCanvas {
    pub sprites: Vec<Sprite>,
    pub selection: Option<(EntityId, Aabb)>,
}

impl RecordingCanvas {
    pub fn clear(&mut self) {
        self.sprites.clear();
        self.selection = None;
    }

    /// Entity ids in draw order, one per base sprite.
    pub fn entity_order(&self) -> Vec<EntityId> {
        self.sprites.iter()
            .filter(|s| s.layer == Layer::Base)
            .map(|s| s.entity)
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn draw_sprite(&mut self, sprite: &Sprite) {
        self.sprites.push(*sprite);
    }

    fn draw_selection(&mut self, entity: EntityId, screen: Aabb) {
        self.selection = Some((entity, screen));
    }
}
