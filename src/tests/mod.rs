//! Scenario tests - Whole-world behavior across map, arena, quadtree and driver.
//!
//! Each file covers one scenario. Unit-level checks live next to the code
//! in each module's `tests` block.


use crate::constants::QUADTREE_CAPACITY;
use crate::geometry::Aabb;
use crate::map::MapSize;
use crate::world::GameWorld;
use crate::components::EntityId;

/// Empty world with the viewport covering the whole map.
pub fn open_world(size: MapSize) -> GameWorld {
    let mut world = GameWorld::with_size(size, QUADTREE_CAPACITY).expect("map allocation");
    let b = world.map.bounds();
    world.reshape_viewport(b.min().x, b.min().y, b.width(), b.height());
    world
}

/// Ground truth for a region: every owned unit whose box intersects it.
pub fn brute_force(world: &GameWorld, region: Aabb) -> Vec<EntityId> {
    let mut ids: Vec<EntityId> = world.arena().units()
        .filter(|u| u.bounds().intersects(&region))
        .map(|u| u.id())
        .collect();
    ids.sort_unstable();
    ids
}
