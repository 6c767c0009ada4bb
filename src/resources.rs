//! ECS Resources - Shared state read by the render layer and debug UI

use bevy::prelude::Resource;

use crate::components::EntityId;
use crate::geometry::Aabb;
use crate::render::Sprite;

/// Counters for one frame of the world driver.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Dynamic units ticked.
    pub ticked: usize,
    /// Units whose position changed and were re-indexed.
    pub moved: usize,
    pub visible_units: usize,
    pub visible_particles: usize,
    /// Dead units inside the viewport that were not drawn.
    pub dead_culled: usize,
}

/// Snapshot of what the last frame drew, copied out of the world so a
/// renderer can consume it after simulation resumes.
#[derive(Resource, Clone, Debug, Default)]
pub struct VisibleSet {
    pub frame: u64,
    pub sprites: Vec<Sprite>,
    pub selection: Option<(EntityId, Aabb)>,
}

/// Frames simulated since the match started.
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct FrameCounter(pub u64);
