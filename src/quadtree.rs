//! Quadtree - Spatial index over units and particles.
//!
//! Nodes live in a flat `Vec`; a split node points at four consecutive
//! children (SW, SE, NW, NE) that exactly tile its bounds. An entry is stored
//! in the deepest node whose bounds fully contain its box, so entries that
//! straddle a split line stay in the parent. Every indexed id therefore lives
//! in exactly one node and a query never reports it twice.
//!
//! The tree stores ids and a copy of each entry's box, never the entities
//! themselves. Callers must `update` after moving an entity.

use hashbrown::HashMap;
use bevy::log::debug;

use crate::components::{EntityId, Particle, Unit};
use crate::constants::{QUADTREE_CAPACITY, QUADTREE_MAX_DEPTH, QUADTREE_MIN_HALF};
use crate::geometry::Aabb;

/// One indexed entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry {
    pub id: EntityId,
    pub bounds: Aabb,
    pub dynamic: bool,
}

/// Which list of a node an entry belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Unit,
    Particle,
}

#[derive(Clone, Debug)]
struct Node {
    bounds: Aabb,
    depth: u32,
    units: Vec<Entry>,
    particles: Vec<Entry>,
    /// Ids of the dynamic units in `units`.
    dynamic: Vec<EntityId>,
    /// Index of the first of four children, if split.
    children: Option<usize>,
}

impl Node {
    fn new(bounds: Aabb, depth: u32) -> Self {
        Self {
            bounds, depth,
            units: Vec::new(),
            particles: Vec::new(),
            dynamic: Vec::new(),
            children: None,
        }
    }

    fn len(&self) -> usize { self.units.len() + self.particles.len() }

    fn entries(&self, slot: Slot) -> &[Entry] {
        match slot {
            Slot::Unit => &self.units,
            Slot::Particle => &self.particles,
        }
    }

    fn push(&mut self, slot: Slot, entry: Entry) {
        match slot {
            Slot::Unit => {
                if entry.dynamic {
                    self.dynamic.push(entry.id);
                }
                self.units.push(entry);
            }
            Slot::Particle => self.particles.push(entry),
        }
    }

    fn remove(&mut self, slot: Slot, id: EntityId) -> Option<Entry> {
        let list = match slot {
            Slot::Unit => &mut self.units,
            Slot::Particle => &mut self.particles,
        };
        let i = list.iter().position(|e| e.id == id)?;
        let entry = list.swap_remove(i);
        if entry.dynamic {
            self.dynamic.retain(|d| *d != id);
        }
        Some(entry)
    }
}

/// Region quadtree over units (owned by the arena, indexed here) and particles.
#[derive(Clone, Debug)]
pub struct Quadtree {
    nodes: Vec<Node>,
    capacity: usize,
    max_depth: u32,
    unit_loc: HashMap<EntityId, usize>,
    particle_loc: HashMap<EntityId, usize>,
}

impl Default for Quadtree {
    fn default() -> Self {
        Self::new(Aabb::default())
    }
}

impl Quadtree {
    pub fn new(bounds: Aabb) -> Self {
        Self::with_capacity(bounds, QUADTREE_CAPACITY)
    }

    /// Tree whose leaves split once they hold `capacity` entries.
    pub fn with_capacity(bounds: Aabb, capacity: usize) -> Self {
        Self {
            nodes: vec![Node::new(bounds, 0)],
            capacity: capacity.max(1),
            max_depth: QUADTREE_MAX_DEPTH,
            unit_loc: HashMap::new(),
            particle_loc: HashMap::new(),
        }
    }

    pub fn bounds(&self) -> Aabb { self.nodes[0].bounds }
    pub fn capacity(&self) -> usize { self.capacity }

    // ========================================================================
    // INSERTION
    // ========================================================================

    /// Index a unit. Returns false (and indexes nothing) if its box is not
    /// inside the tree bounds.
    pub fn put(&mut self, unit: &Unit) -> bool {
        let entry = Entry { id: unit.id(), bounds: unit.bounds(), dynamic: unit.is_dynamic() };
        self.put_entry(Slot::Unit, entry)
    }

    /// Index a particle reference. The arena keeps ownership.
    pub fn put_particle(&mut self, particle: &Particle) -> bool {
        let entry = Entry { id: particle.id, bounds: particle.bounds(), dynamic: false };
        self.put_entry(Slot::Particle, entry)
    }

    fn put_entry(&mut self, slot: Slot, entry: Entry) -> bool {
        if !self.bounds().contains_box(&entry.bounds) {
            debug!("quadtree: {:?} {:?} outside {:?}", entry.id, entry.bounds, self.bounds());
            return false;
        }
        let duplicate = self.locations(slot).contains_key(&entry.id);
        debug_assert!(!duplicate, "{:?} indexed twice", entry.id);
        if duplicate {
            return false;
        }

        let mut idx = 0;
        loop {
            if let Some(first) = self.nodes[idx].children {
                match self.child_containing(first, &entry.bounds) {
                    Some(child) => {
                        idx = child;
                        continue;
                    }
                    // Straddles a split line: stays here
                    None => break,
                }
            }
            if self.nodes[idx].len() >= self.capacity && self.split(idx) {
                continue;
            }
            break;
        }

        self.nodes[idx].push(slot, entry);
        self.locations_mut(slot).insert(entry.id, idx);
        true
    }

    fn child_containing(&self, first: usize, bounds: &Aabb) -> Option<usize> {
        (first..first + 4).find(|&c| self.nodes[c].bounds.contains_box(bounds))
    }

    /// Turn a leaf into four children and push down every entry that fits
    /// entirely inside one of them. Returns false if the node cannot split.
    fn split(&mut self, idx: usize) -> bool {
        let node = &self.nodes[idx];
        if node.children.is_some()
            || node.depth >= self.max_depth
            || node.bounds.hbounds.x < QUADTREE_MIN_HALF
            || node.bounds.hbounds.y < QUADTREE_MIN_HALF
        {
            return false;
        }
        let Some(quads) = node.bounds.quadrants() else { return false };
        let depth = node.depth + 1;

        let first = self.nodes.len();
        self.nodes.extend(quads.iter().map(|q| Node::new(*q, depth)));
        self.nodes[idx].children = Some(first);

        let units = std::mem::take(&mut self.nodes[idx].units);
        let particles = std::mem::take(&mut self.nodes[idx].particles);
        self.nodes[idx].dynamic.clear();

        for (slot, entries) in [(Slot::Unit, units), (Slot::Particle, particles)] {
            for entry in entries {
                let target = self.child_containing(first, &entry.bounds).unwrap_or(idx);
                self.nodes[target].push(slot, entry);
                self.locations_mut(slot).insert(entry.id, target);
            }
        }
        true
    }

    // ========================================================================
    // REMOVAL / RELOCATION
    // ========================================================================

    /// Remove a unit by id. Returns false if it was not indexed.
    pub fn erase(&mut self, id: EntityId) -> bool {
        self.erase_entry(Slot::Unit, id).is_some()
    }

    pub fn erase_particle(&mut self, id: EntityId) -> bool {
        self.erase_entry(Slot::Particle, id).is_some()
    }

    fn erase_entry(&mut self, slot: Slot, id: EntityId) -> Option<Entry> {
        let idx = self.locations_mut(slot).remove(&id)?;
        let entry = self.nodes[idx].remove(slot, id);
        debug_assert!(entry.is_some(), "location map out of sync for {:?}", id);
        entry
    }

    /// Re-index a unit after its position changed. Equivalent to `erase` then
    /// `put`; skips both when the unit still fits the leaf that holds it.
    /// Returns false if the unit was not indexed or no longer fits the tree.
    pub fn update(&mut self, unit: &Unit) -> bool {
        self.update_entry(Slot::Unit, unit.id(), unit.bounds())
    }

    pub fn update_particle(&mut self, particle: &Particle) -> bool {
        self.update_entry(Slot::Particle, particle.id, particle.bounds())
    }

    fn update_entry(&mut self, slot: Slot, id: EntityId, bounds: Aabb) -> bool {
        let Some(&idx) = self.locations(slot).get(&id) else { return false };

        let node = &mut self.nodes[idx];
        if node.children.is_none() && node.bounds.contains_box(&bounds) {
            let list = match slot {
                Slot::Unit => &mut node.units,
                Slot::Particle => &mut node.particles,
            };
            if let Some(e) = list.iter_mut().find(|e| e.id == id) {
                e.bounds = bounds;
                return true;
            }
        }

        let Some(mut entry) = self.erase_entry(slot, id) else { return false };
        entry.bounds = bounds;
        self.put_entry(slot, entry)
    }

    /// Empty the tree back to a single leaf.
    pub fn clear(&mut self) {
        let bounds = self.bounds();
        self.nodes.clear();
        self.nodes.push(Node::new(bounds, 0));
        self.unit_loc.clear();
        self.particle_loc.clear();
    }

    /// Reinsert everything into a fresh tree. The tree never merges children
    /// on erase; this reclaims the nodes left empty by departed entities.
    pub fn rebuild(&mut self) {
        let mut units: Vec<Entry> = self.nodes.iter().flat_map(|n| n.units.iter().copied()).collect();
        let mut particles: Vec<Entry> = self.nodes.iter().flat_map(|n| n.particles.iter().copied()).collect();
        units.sort_by_key(|e| e.id);
        particles.sort_by_key(|e| e.id);

        let before = self.nodes.len();
        self.clear();
        for e in units {
            self.put_entry(Slot::Unit, e);
        }
        for e in particles {
            self.put_entry(Slot::Particle, e);
        }
        debug!("quadtree rebuilt: {} -> {} nodes", before, self.nodes.len());
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Append the ids of all units whose box intersects `region`.
    pub fn query(&self, out: &mut Vec<EntityId>, region: Aabb) {
        self.query_slot(Slot::Unit, out, region);
    }

    /// Append the ids of all particles whose box intersects `region`.
    pub fn query_particles(&self, out: &mut Vec<EntityId>, region: Aabb) {
        self.query_slot(Slot::Particle, out, region);
    }

    fn query_slot(&self, slot: Slot, out: &mut Vec<EntityId>, region: Aabb) {
        if region.is_empty() {
            return;
        }
        let mut stack = vec![0usize];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if !node.bounds.intersects(&region) {
                continue;
            }
            out.extend(node.entries(slot).iter().filter(|e| e.bounds.intersects(&region)).map(|e| e.id));
            if let Some(first) = node.children {
                stack.extend(first..first + 4);
            }
        }
    }

    /// Every indexed dynamic unit, ascending by id.
    pub fn dynamic_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.nodes.iter().flat_map(|n| n.dynamic.iter().copied()).collect();
        ids.sort_unstable();
        ids
    }

    // ========================================================================
    // DIAGNOSTICS
    // ========================================================================

    pub fn contains(&self, id: EntityId) -> bool { self.unit_loc.contains_key(&id) }
    pub fn contains_particle(&self, id: EntityId) -> bool { self.particle_loc.contains_key(&id) }

    /// Number of indexed units.
    pub fn len(&self) -> usize { self.unit_loc.len() }
    pub fn is_empty(&self) -> bool { self.unit_loc.is_empty() && self.particle_loc.is_empty() }
    pub fn particle_len(&self) -> usize { self.particle_loc.len() }

    pub fn node_count(&self) -> usize { self.nodes.len() }

    /// Deepest level in use (root = 0).
    pub fn depth(&self) -> u32 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Bounds of the node currently holding a unit.
    pub fn node_bounds_of(&self, id: EntityId) -> Option<Aabb> {
        self.unit_loc.get(&id).map(|&i| self.nodes[i].bounds)
    }

    /// Whether the node holding a unit is a leaf.
    pub fn is_in_leaf(&self, id: EntityId) -> Option<bool> {
        self.unit_loc.get(&id).map(|&i| self.nodes[i].children.is_none())
    }

    fn locations(&self, slot: Slot) -> &HashMap<EntityId, usize> {
        match slot {
            Slot::Unit => &self.unit_loc,
            Slot::Particle => &self.particle_loc,
        }
    }

    fn locations_mut(&mut self, slot: Slot) -> &mut HashMap<EntityId, usize> {
        match slot {
            Slot::Unit => &mut self.unit_loc,
            Slot::Particle => &mut self.particle_loc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{BuildingType, ResourceKind};
    use crate::geometry::Point;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const WORLD: Aabb = Aabb::centered(1024, 1024, 1024, 1024);

    fn villager(id: u32, x: i32, y: i32) -> Unit {
        Unit::villager(EntityId(id), x, y, 1)
    }

    fn sorted(mut ids: Vec<EntityId>) -> Vec<EntityId> {
        ids.sort_unstable();
        ids
    }

    fn query_all(tree: &Quadtree, region: Aabb) -> Vec<EntityId> {
        let mut out = Vec::new();
        tree.query(&mut out, region);
        out
    }

    #[test]
    fn put_then_query_own_box() {
        let mut tree = Quadtree::new(WORLD);
        let v = villager(1, 100, 100);
        assert!(tree.put(&v));
        assert_eq!(query_all(&tree, v.bounds()), vec![EntityId(1)]);
    }

    #[test]
    fn put_outside_bounds_is_rejected() {
        let mut tree = Quadtree::new(WORLD);
        assert!(!tree.put(&villager(1, -50, 100)));
        // Overhangs the right edge
        assert!(!tree.put(&villager(2, 2045, 100)));
        assert!(tree.is_empty());
        assert!(query_all(&tree, WORLD).is_empty());
    }

    #[test]
    fn leaf_splits_past_capacity() {
        let mut tree = Quadtree::new(WORLD);
        for i in 0..QUADTREE_CAPACITY as u32 {
            assert!(tree.put(&villager(i + 1, 100 + i as i32 * 20, 100)));
        }
        assert_eq!(tree.node_count(), 1);
        assert!(tree.put(&villager(100, 1500, 1500)));
        assert!(tree.node_count() > 1);
        assert!(tree.depth() >= 1);
        // All small villagers fit a quadrant, so none stay at the root
        for i in 0..QUADTREE_CAPACITY as u32 {
            assert_ne!(tree.node_bounds_of(EntityId(i + 1)), Some(WORLD));
        }
        assert_eq!(tree.len(), QUADTREE_CAPACITY + 1);
    }

    #[test]
    fn straddling_entity_stays_in_parent() {
        let mut tree = Quadtree::with_capacity(WORLD, 1);
        // Sits on both split lines of the root
        let center = Unit::building(EntityId(1), BuildingType::TownCenter, 1024, 1024, 1);
        assert!(tree.put(&villager(2, 100, 100)));
        assert!(tree.put(&center));
        assert_eq!(tree.node_bounds_of(EntityId(1)), Some(WORLD));
        assert_eq!(tree.is_in_leaf(EntityId(1)), Some(false));
        assert_eq!(query_all(&tree, center.bounds()), vec![EntityId(1)]);
        // Exactly once from a full-map query
        assert_eq!(sorted(query_all(&tree, WORLD)), vec![EntityId(1), EntityId(2)]);
    }

    #[test]
    fn full_query_returns_each_unit_once() {
        let mut tree = Quadtree::with_capacity(WORLD, 2);
        let mut rng = StdRng::seed_from_u64(7);
        let mut ids = Vec::new();
        for i in 1..=300u32 {
            let v = villager(i, rng.random_range(8..2040), rng.random_range(8..2040));
            if tree.put(&v) {
                ids.push(v.id());
            }
        }
        assert_eq!(ids.len(), 300);
        assert_eq!(sorted(query_all(&tree, WORLD)), ids);
        assert!(tree.depth() > 2);
    }

    #[test]
    fn query_matches_brute_force() {
        let mut tree = Quadtree::new(WORLD);
        let mut rng = StdRng::seed_from_u64(1234);
        let mut units = Vec::new();
        for i in 1..=200u32 {
            let kind = ResourceKind::ALL[i as usize % 4];
            let u = Unit::resource(EntityId(i), rng.random_range(16..2032), rng.random_range(16..2032), kind);
            assert!(tree.put(&u));
            units.push(u);
        }
        for _ in 0..50 {
            let region = Aabb::centered(
                rng.random_range(0..2048), rng.random_range(0..2048),
                rng.random_range(1..400), rng.random_range(1..400),
            );
            let expected: Vec<EntityId> = units.iter()
                .filter(|u| u.bounds().intersects(&region))
                .map(|u| u.id())
                .collect();
            assert_eq!(sorted(query_all(&tree, region)), sorted(expected));
        }
    }

    #[test]
    fn touching_region_is_excluded() {
        let mut tree = Quadtree::new(WORLD);
        let v = villager(1, 100, 100); // covers [93, 107)
        tree.put(&v);
        assert!(query_all(&tree, Aabb::from_corners(107, 0, 200, 200)).is_empty());
        assert_eq!(query_all(&tree, Aabb::from_corners(106, 0, 200, 200)), vec![EntityId(1)]);
    }

    #[test]
    fn erase_is_complete() {
        let mut tree = Quadtree::with_capacity(WORLD, 2);
        for i in 1..=20u32 {
            tree.put(&villager(i, 50 * i as i32, 60 * i as i32));
        }
        assert!(tree.erase(EntityId(5)));
        assert!(!tree.contains(EntityId(5)));
        assert!(!query_all(&tree, WORLD).contains(&EntityId(5)));
        assert!(!tree.erase(EntityId(5)));
        assert!(!tree.dynamic_ids().contains(&EntityId(5)));
        assert_eq!(tree.len(), 19);
    }

    #[test]
    fn update_moves_across_leaves() {
        let mut tree = Quadtree::with_capacity(WORLD, 1);
        let mut a = villager(1, 100, 100);
        tree.put(&a);
        tree.put(&villager(2, 1900, 1900));
        let before = tree.node_bounds_of(a.id()).unwrap();

        a.set_pos(Point::new(1800, 200));
        assert!(tree.update(&a));
        let after = tree.node_bounds_of(a.id()).unwrap();
        assert_ne!(before, after);
        assert!(after.contains_box(&a.bounds()));
        assert!(query_all(&tree, Aabb::centered(100, 100, 10, 10)).is_empty());
        assert_eq!(query_all(&tree, a.bounds()), vec![EntityId(1)]);
    }

    #[test]
    fn update_within_leaf_keeps_node() {
        let mut tree = Quadtree::new(WORLD);
        let mut a = villager(1, 100, 100);
        tree.put(&a);
        let nodes = tree.node_count();
        a.set_pos(Point::new(120, 110));
        assert!(tree.update(&a));
        assert_eq!(tree.node_count(), nodes);
        assert_eq!(query_all(&tree, Aabb::centered(120, 110, 1, 1)), vec![EntityId(1)]);
        assert!(query_all(&tree, Aabb::centered(100, 100, 1, 1)).is_empty());
    }

    #[test]
    fn update_is_idempotent() {
        let mut tree = Quadtree::with_capacity(WORLD, 2);
        let units: Vec<Unit> = (1..=30u32).map(|i| villager(i, 30 * i as i32, 2000 - 40 * i as i32)).collect();
        for u in &units {
            tree.put(u);
        }
        let region = Aabb::centered(500, 1200, 400, 400);
        let first = sorted(query_all(&tree, region));
        assert!(tree.update(&units[10]));
        assert!(tree.update(&units[10]));
        assert_eq!(sorted(query_all(&tree, region)), first);
        assert_eq!(sorted(query_all(&tree, WORLD)).len(), 30);
    }

    #[test]
    fn update_unknown_unit_fails() {
        let mut tree = Quadtree::new(WORLD);
        assert!(!tree.update(&villager(1, 10, 10)));
        assert!(tree.is_empty());
    }

    #[test]
    fn dynamic_subset_tracks_moves_and_splits() {
        let mut tree = Quadtree::with_capacity(WORLD, 1);
        tree.put(&Unit::resource(EntityId(1), 300, 300, ResourceKind::Gold));
        tree.put(&villager(2, 100, 100));
        tree.put(&villager(3, 1500, 1500));
        tree.put(&Unit::building(EntityId(4), BuildingType::House, 800, 800, 1));
        assert_eq!(tree.dynamic_ids(), vec![EntityId(2), EntityId(3)]);
        tree.erase(EntityId(2));
        assert_eq!(tree.dynamic_ids(), vec![EntityId(3)]);
    }

    #[test]
    fn particles_are_indexed_separately() {
        let mut tree = Quadtree::new(WORLD);
        let p = Particle::debris(EntityId(1), 400, 400, 0);
        tree.put(&villager(2, 400, 400));
        assert!(tree.put_particle(&p));
        let mut parts = Vec::new();
        tree.query_particles(&mut parts, Aabb::centered(400, 400, 5, 5));
        assert_eq!(parts, vec![EntityId(1)]);
        assert_eq!(query_all(&tree, Aabb::centered(400, 400, 5, 5)), vec![EntityId(2)]);
        assert!(tree.erase_particle(EntityId(1)));
        assert!(!tree.erase_particle(EntityId(1)));
        assert!(!tree.erase(EntityId(1)), "not a unit");
    }

    #[test]
    fn split_stops_at_minimum_size() {
        let mut tree = Quadtree::with_capacity(Aabb::centered(16, 16, 16, 16), 1);
        for i in 1..=40u32 {
            assert!(tree.put(&Unit::resource(EntityId(i), 16, 16, ResourceKind::Food)));
        }
        assert_eq!(tree.len(), 40);
        assert!(tree.node_count() <= 5);
    }

    #[test]
    fn clear_and_rebuild() {
        let mut tree = Quadtree::with_capacity(WORLD, 2);
        for i in 1..=50u32 {
            tree.put(&villager(i, 20 * i as i32, 20 * i as i32));
        }
        for i in 1..=45u32 {
            tree.erase(EntityId(i));
        }
        let grown = tree.node_count();
        tree.rebuild();
        assert!(tree.node_count() < grown);
        assert_eq!(sorted(query_all(&tree, WORLD)), (46..=50).map(EntityId).collect::<Vec<_>>());
        assert_eq!(tree.dynamic_ids().len(), 5);

        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.bounds(), WORLD);
    }

    #[test]
    fn empty_region_returns_nothing() {
        let mut tree = Quadtree::new(WORLD);
        tree.put(&villager(1, 100, 100));
        assert!(query_all(&tree, Aabb::centered(100, 100, 0, 0)).is_empty());
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "indexed twice")]
    fn double_put_asserts() {
        let mut tree = Quadtree::new(WORLD);
        let v = villager(1, 100, 100);
        tree.put(&v);
        tree.put(&v);
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn double_put_is_refused() {
        let mut tree = Quadtree::new(WORLD);
        let v = villager(1, 100, 100);
        assert!(tree.put(&v));
        assert!(!tree.put(&v));
        assert_eq!(tree.len(), 1);
        assert_eq!(query_all(&tree, WORLD), vec![EntityId(1)]);
    }

    #[test]
    fn particle_update_moves_between_leaves() {
        let mut tree = Quadtree::with_capacity(WORLD, 2);
        for i in 1..=12u32 {
            tree.put(&villager(i, 150 * i as i32, 150 * i as i32));
        }
        let mut debris = Particle::debris(EntityId(20), 100, 1900, 0);
        assert!(tree.put_particle(&debris));

        debris.pos = Point::new(1900, 100);
        assert!(tree.update_particle(&debris));
        let mut found = Vec::new();
        tree.query_particles(&mut found, Aabb::centered(1900, 100, 2, 2));
        assert_eq!(found, vec![EntityId(20)]);
        found.clear();
        tree.query_particles(&mut found, Aabb::centered(100, 1900, 2, 2));
        assert!(found.is_empty());
        assert_eq!(tree.particle_len(), 1);
        assert!(!tree.update_particle(&Particle::debris(EntityId(21), 50, 50, 0)));
    }
}
