//! Entity arena - Owns every unit and particle, keyed by stable id.
//!
//! The quadtree and any outside holder (selection, UI) store `EntityId`s.
//! Removing an entity here makes those ids resolve to `None` instead of
//! leaving a dangling reference.

use hashbrown::HashMap;

use crate::components::{EntityId, Particle, Unit};

/// Owner of all world entities plus the id counter.
#[derive(Debug)]
pub struct EntityArena {
    units: HashMap<EntityId, Unit>,
    particles: HashMap<EntityId, Particle>,
    /// Next id to hand out. Only grows; ids are never reused.
    next: u32,
}

impl Default for EntityArena {
    fn default() -> Self {
        Self { units: HashMap::new(), particles: HashMap::new(), next: 1 }
    }
}

impl EntityArena {
    /// Reserve a fresh id.
    pub fn alloc_id(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// Build a unit with a fresh id and take ownership of it.
    pub fn spawn_unit(&mut self, build: impl FnOnce(EntityId) -> Unit) -> EntityId {
        let id = self.alloc_id();
        let unit = build(id);
        debug_assert_eq!(unit.id(), id, "unit built with a foreign id");
        self.units.insert(id, unit);
        id
    }

    /// Build a particle with a fresh id and take ownership of it.
    pub fn spawn_particle(&mut self, build: impl FnOnce(EntityId) -> Particle) -> EntityId {
        let id = self.alloc_id();
        let particle = build(id);
        debug_assert_eq!(particle.id, id, "particle built with a foreign id");
        self.particles.insert(id, particle);
        id
    }

    pub fn unit(&self, id: EntityId) -> Option<&Unit> { self.units.get(&id) }
    pub fn unit_mut(&mut self, id: EntityId) -> Option<&mut Unit> { self.units.get_mut(&id) }
    pub fn remove_unit(&mut self, id: EntityId) -> Option<Unit> { self.units.remove(&id) }

    pub fn particle(&self, id: EntityId) -> Option<&Particle> { self.particles.get(&id) }
    pub fn particle_mut(&mut self, id: EntityId) -> Option<&mut Particle> { self.particles.get_mut(&id) }
    pub fn remove_particle(&mut self, id: EntityId) -> Option<Particle> { self.particles.remove(&id) }

    pub fn units(&self) -> impl Iterator<Item = &Unit> { self.units.values() }
    pub fn particles(&self) -> impl Iterator<Item = &Particle> { self.particles.values() }

    pub fn unit_count(&self) -> usize { self.units.len() }
    pub fn particle_count(&self) -> usize { self.particles.len() }

    /// Drop every entity. The id counter keeps running.
    pub fn clear(&mut self) {
        self.units.clear();
        self.particles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ResourceKind;

    #[test]
    fn ids_are_monotonic_across_kinds() {
        let mut arena = EntityArena::default();
        let a = arena.spawn_unit(|id| Unit::villager(id, 0, 0, 1));
        let b = arena.spawn_particle(|id| Particle::debris(id, 0, 0, 1));
        let c = arena.spawn_unit(|id| Unit::resource(id, 5, 5, ResourceKind::Food));
        assert!(a < b && b < c);
        assert_eq!(arena.unit_count(), 2);
        assert_eq!(arena.particle_count(), 1);
    }

    #[test]
    fn removed_ids_are_not_reused() {
        let mut arena = EntityArena::default();
        let a = arena.spawn_unit(|id| Unit::villager(id, 0, 0, 1));
        assert!(arena.remove_unit(a).is_some());
        assert!(arena.unit(a).is_none());
        assert!(arena.remove_unit(a).is_none());
        arena.clear();
        let b = arena.spawn_unit(|id| Unit::villager(id, 0, 0, 1));
        assert_ne!(a, b);
    }
}
