//! Bevy ECS Systems - Thin wrappers that feed messages into the GameWorld

mod spawn;
mod movement;
mod visibility;

pub use spawn::*;
pub use movement::*;
pub use visibility::*;
