//! Empires world model - Map, units, quadtree index and the frame driver,
//! wired into Bevy as a resource plus message-driven systems.

// ============================================================================
// MODULES
// ============================================================================

pub mod animation;
pub mod arena;
pub mod components;
pub mod constants;
pub mod geometry;
pub mod map;
pub mod messages;
pub mod quadtree;
pub mod render;
pub mod resources;
pub mod settings;
pub mod systems;
pub mod world;

#[cfg(test)]
mod tests;

// ============================================================================
// IMPORTS
// ============================================================================

use bevy::prelude::*;

use messages::*;
use resources::*;
use systems::*;
use world::GameWorld;

// ============================================================================
// BEVY APP - Registers messages, resources and the frame pipeline
// ============================================================================

/// Frame phases. Chained so every order lands before the world ticks and
/// culling sees final positions.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Drain, // Spawn, despawn, orders, damage, viewport, selection
    Tick,  // Movement + re-index
    Cull,  // Viewport query + draw snapshot
}

/// Build the Bevy application. The caller inserts a `GameWorld`; until it
/// exists the pipeline does not run.
pub fn build_app(app: &mut App) {
    app.add_message::<SpawnMsg>()
       .add_message::<MoveOrderMsg>()
       .add_message::<DamageMsg>()
       .add_message::<DespawnMsg>()
       .add_message::<ViewportMsg>()
       .add_message::<SelectMsg>()
       .add_message::<UnitDiedMsg>()
       .init_resource::<VisibleSet>()
       .init_resource::<FrameStats>()
       .init_resource::<FrameCounter>()
       .configure_sets(Update, (Step::Drain, Step::Tick, Step::Cull).chain())
       .configure_sets(Update, Step::Drain.run_if(resource_exists::<GameWorld>))
       .configure_sets(Update, Step::Tick.run_if(resource_exists::<GameWorld>))
       .configure_sets(Update, Step::Cull.run_if(resource_exists::<GameWorld>))
       // Drain: despawn before spawn so a freed area can be refilled the same frame
       .add_systems(Update, (
           despawn_system,
           spawn_system,
           move_order_system,
           damage_system,
           viewport_system,
           select_system,
       ).chain().in_set(Step::Drain))
       .add_systems(Update, tick_system.in_set(Step::Tick))
       .add_systems(Update, visibility_system.in_set(Step::Cull));
}
