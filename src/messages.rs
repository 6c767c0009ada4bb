//! ECS Messages - Commands sent from the input/UI layer to the world.
//! Drained once per frame in `Step::Drain`, before the world ticks.

use bevy::prelude::Message;

use crate::components::{BuildingType, EntityId, ResourceKind};

// ============================================================================
// MESSAGE TYPES
// ============================================================================

/// What to create. Positions are world units; the world clamps them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpawnKind {
    Villager { color: u32 },
    Resource { kind: ResourceKind },
    Building { kind: BuildingType, color: u32 },
    /// Debris particle.
    Debris { color: u32 },
}

#[derive(Message, Clone, Debug)]
pub struct SpawnMsg {
    pub x: i32,
    pub y: i32,
    pub kind: SpawnKind,
}

/// Straight-line move order. `dx`/`dy` displace the sprite relative to the
/// unit position (tile offset).
#[derive(Message, Clone, Debug)]
pub struct MoveOrderMsg {
    pub id: EntityId,
    pub x: i32,
    pub y: i32,
    pub dx: i32,
    pub dy: i32,
}

#[derive(Message, Clone, Debug)]
pub struct DamageMsg {
    pub id: EntityId,
    pub amount: u32,
}

/// Remove a unit (or particle) from the world.
#[derive(Message, Clone, Debug)]
pub struct DespawnMsg {
    pub id: EntityId,
}

/// Viewport moved or resized (world units).
#[derive(Message, Clone, Debug)]
pub struct ViewportMsg {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// Click at a screen position. Selects the unit under it, or clears.
#[derive(Message, Clone, Debug)]
pub struct SelectMsg {
    pub x: i32,
    pub y: i32,
}

/// Written when damage brings a unit to zero hit points.
#[derive(Message, Clone, Debug)]
pub struct UnitDiedMsg {
    pub id: EntityId,
}
