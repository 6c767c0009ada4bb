//! Game world - Map, entity arena and quadtree behind one context object.
//! Frame driver - tick, re-index, cull, draw.
//! World generation - Seeded resource scatter and starting town layout.

use bevy::log::{debug, info, warn};
use bevy::prelude::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::arena::EntityArena;
use crate::components::{BuildingType, EntityId, Particle, ResourceKind, Unit};
use crate::constants::{CELL_SIZE, PLAYER_COLORS};
use crate::geometry::{Aabb, Point};
use crate::map::{Map, MapSize, Terrain};
use crate::quadtree::Quadtree;
use crate::render::{Canvas, DrawList};
use crate::resources::FrameStats;
use crate::settings::WorldSettings;

/// Everything the simulation owns: map, entities, spatial index, selection.
/// No process-wide state; systems and tests pass this around explicitly.
#[derive(Resource, Debug)]
pub struct GameWorld {
    pub map: Map,
    arena: EntityArena,
    tree: Quadtree,
    /// Unit picked by the input layer. Stored as an id so it cannot dangle.
    selected: Option<EntityId>,
}

impl GameWorld {
    /// World over an already allocated map, viewport left as is.
    pub fn new(map: Map, quadtree_capacity: usize) -> Self {
        let tree = Quadtree::with_capacity(map.bounds(), quadtree_capacity);
        Self { map, arena: EntityArena::default(), tree, selected: None }
    }

    /// Empty world for a size class.
    pub fn with_size(size: MapSize, quadtree_capacity: usize) -> Result<Self, &'static str> {
        let mut map = Map::default();
        map.resize(size)?;
        Ok(Self::new(map, quadtree_capacity))
    }

    pub fn arena(&self) -> &EntityArena { &self.arena }
    pub fn tree(&self) -> &Quadtree { &self.tree }

    pub fn unit(&self, id: EntityId) -> Option<&Unit> { self.arena.unit(id) }
    pub fn particle(&self, id: EntityId) -> Option<&Particle> { self.arena.particle(id) }

    // ========================================================================
    // SPAWN API
    // ========================================================================

    /// Take ownership of a unit, confine it to the map and index it.
    /// Returns None if it could not be indexed.
    pub fn spawn_unit(&mut self, build: impl FnOnce(EntityId) -> Unit) -> Option<EntityId> {
        let id = self.arena.spawn_unit(build);
        let unit = self.arena.unit_mut(id)?;
        let clamped = self.map.clamp(unit.bounds());
        if clamped.pos != unit.pos() {
            unit.set_pos(clamped.pos);
        }
        unit.to_screen(&self.map);
        if self.tree.put(unit) {
            Some(id)
        } else {
            warn!("spawn: {:?} does not fit the map, discarded", id);
            self.arena.remove_unit(id);
            None
        }
    }

    pub fn spawn_villager(&mut self, x: i32, y: i32, color: u32) -> Option<EntityId> {
        self.spawn_unit(|id| Unit::villager(id, x, y, color))
    }

    pub fn spawn_resource(&mut self, x: i32, y: i32, kind: ResourceKind) -> Option<EntityId> {
        self.spawn_unit(|id| Unit::resource(id, x, y, kind))
    }

    pub fn spawn_building(&mut self, kind: BuildingType, x: i32, y: i32, color: u32) -> Option<EntityId> {
        self.spawn_unit(|id| Unit::building(id, kind, x, y, color))
    }

    /// Take ownership of a particle and index it.
    pub fn spawn_particle(&mut self, build: impl FnOnce(EntityId) -> Particle) -> Option<EntityId> {
        let id = self.arena.spawn_particle(build);
        let particle = self.arena.particle_mut(id)?;
        let clamped = self.map.clamp(particle.bounds());
        particle.pos = clamped.pos;
        particle.to_screen(&self.map);
        if self.tree.put_particle(particle) {
            Some(id)
        } else {
            self.arena.remove_particle(id);
            None
        }
    }

    /// Drop a unit from the index and the arena. Clears a matching selection
    /// first. Returns false if the id was unknown.
    pub fn erase(&mut self, id: EntityId) -> bool {
        if self.selected == Some(id) {
            self.selected = None;
        }
        let indexed = self.tree.erase(id);
        let owned = self.arena.remove_unit(id).is_some();
        if !indexed && !owned {
            debug!("erase: unknown {:?}", id);
        }
        indexed || owned
    }

    pub fn erase_particle(&mut self, id: EntityId) -> bool {
        let indexed = self.tree.erase_particle(id);
        self.arena.remove_particle(id).is_some() || indexed
    }

    // ========================================================================
    // ORDERS
    // ========================================================================

    /// Send a dynamic unit toward `(tx, ty)`. The target is pulled inside the
    /// map so the unit can always reach it. Returns false for unknown or
    /// immobile units.
    pub fn move_unit(&mut self, id: EntityId, tx: i32, ty: i32, dx: i32, dy: i32) -> bool {
        let Some(unit) = self.arena.unit_mut(id) else { return false };
        let target = self.map.clamp(unit.bounds().with_pos(Point::new(tx, ty))).pos;
        unit.move_to(target.x, target.y, dx, dy)
    }

    /// Teleport a unit and re-index it.
    pub fn relocate(&mut self, id: EntityId, to: Point) -> bool {
        let Some(unit) = self.arena.unit_mut(id) else { return false };
        let pos = self.map.clamp(unit.bounds().with_pos(to)).pos;
        unit.set_pos(pos);
        unit.to_screen(&self.map);
        self.tree.update(unit)
    }

    /// Teleport a particle and re-index it.
    pub fn relocate_particle(&mut self, id: EntityId, to: Point) -> bool {
        let Some(particle) = self.arena.particle_mut(id) else { return false };
        particle.pos = self.map.clamp(particle.bounds().with_pos(to)).pos;
        particle.to_screen(&self.map);
        self.tree.update_particle(particle)
    }

    /// Apply damage. Returns Some(true) if this killed the unit. Dead units
    /// stay indexed until someone erases them.
    pub fn damage(&mut self, id: EntityId, amount: u32) -> Option<bool> {
        self.arena.unit_mut(id).map(|u| u.damage(amount))
    }

    /// Take from a resource node. Returns the amount taken, None if `id` is
    /// not a resource.
    pub fn harvest(&mut self, id: EntityId, amount: u32) -> Option<u32> {
        self.arena.unit_mut(id)?.resource_stock_mut().map(|s| s.harvest(amount))
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Units intersecting `region`, ascending by id.
    pub fn query_units(&self, region: Aabb) -> Vec<EntityId> {
        let mut out = Vec::new();
        self.tree.query(&mut out, region);
        out.sort_unstable();
        out
    }

    /// Particles intersecting `region`, ascending by id.
    pub fn query_particles(&self, region: Aabb) -> Vec<EntityId> {
        let mut out = Vec::new();
        self.tree.query_particles(&mut out, region);
        out.sort_unstable();
        out
    }

    /// Reclaim empty index nodes. Maintenance only; queries are unaffected.
    pub fn rebuild_index(&mut self) {
        self.tree.rebuild();
    }

    // ========================================================================
    // VIEWPORT / SELECTION
    // ========================================================================

    pub fn reshape_viewport(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.map.reshape(x, y, w, h);
    }

    /// Pick the live unit under a screen point (highest id wins) and make it
    /// the selection. Clears the selection when nothing is hit.
    pub fn select_at(&mut self, screen: Point) -> Option<EntityId> {
        let mut candidates = Vec::new();
        self.tree.query(&mut candidates, self.map.viewport());
        let mut hit = None;
        for id in candidates {
            let Some(unit) = self.arena.unit_mut(id) else { continue };
            unit.to_screen(&self.map);
            if !unit.is_dead() && unit.particle.scr.contains(screen) {
                hit = hit.max(Some(id));
            }
        }
        self.selected = hit;
        hit
    }

    pub fn select(&mut self, id: Option<EntityId>) {
        self.selected = id.filter(|id| self.arena.unit(*id).is_some());
    }

    /// The selected unit, if it still exists.
    pub fn selected(&self) -> Option<&Unit> {
        self.selected.and_then(|id| self.arena.unit(id))
    }

    // ========================================================================
    // FRAME DRIVER
    // ========================================================================

    /// Advance every indexed dynamic unit one tick and re-index the ones that
    /// moved. Returns (ticked, moved).
    pub fn tick(&mut self) -> (usize, usize) {
        let mut ticked = 0;
        let mut moved = 0;
        for id in self.tree.dynamic_ids() {
            let Some(unit) = self.arena.unit_mut(id) else {
                warn!("tick: indexed {:?} missing from arena", id);
                continue;
            };
            ticked += 1;
            if !unit.tick() {
                continue;
            }
            let clamped = self.map.clamp(unit.bounds());
            if clamped.pos != unit.pos() {
                unit.set_pos(clamped.pos);
            }
            unit.to_screen(&self.map);
            if !self.tree.update(unit) {
                warn!("tick: {:?} fell out of the index", id);
            }
            moved += 1;
        }
        (ticked, moved)
    }

    /// Query the viewport and refresh screen boxes of what it contains.
    /// Dead units are counted but left out.
    pub fn cull(&mut self) -> DrawList {
        let view = self.map.viewport();
        let mut list = DrawList::default();

        self.tree.query_particles(&mut list.particles, view);
        list.particles.sort_unstable();
        for id in &list.particles {
            if let Some(p) = self.arena.particle_mut(*id) {
                p.to_screen(&self.map);
            }
        }

        let mut units = Vec::new();
        self.tree.query(&mut units, view);
        units.sort_unstable();
        for id in units {
            let Some(unit) = self.arena.unit_mut(id) else { continue };
            if unit.is_dead() {
                list.dead_culled += 1;
                continue;
            }
            unit.to_screen(&self.map);
            list.units.push(id);
        }
        list
    }

    /// Hand a culled list to the renderer: particles, then units, each by
    /// ascending id, then the selection marker.
    pub fn draw(&self, list: &DrawList, canvas: &mut impl Canvas) {
        for id in &list.particles {
            if let Some(p) = self.arena.particle(*id) {
                p.draw(&self.map, canvas);
            }
        }
        for id in &list.units {
            if let Some(u) = self.arena.unit(*id) {
                u.draw(&self.map, canvas);
            }
        }
        if let Some(sel) = self.selected.filter(|id| list.units.contains(id)) {
            if let Some(u) = self.arena.unit(sel) {
                u.draw_selection(&self.map, canvas);
            }
        }
    }

    /// One full frame: tick, re-index, cull, draw.
    pub fn frame(&mut self, canvas: &mut impl Canvas) -> FrameStats {
        let (ticked, moved) = self.tick();
        let list = self.cull();
        self.draw(&list, canvas);
        FrameStats {
            ticked,
            moved,
            visible_units: list.units.len(),
            visible_particles: list.particles.len(),
            dead_culled: list.dead_culled,
        }
    }

    // ========================================================================
    // WORLD GENERATION
    // ========================================================================

    /// Build a match from settings: terrain, a town center with houses and
    /// villagers near the map center, and resources scattered over land.
    pub fn generate(settings: &WorldSettings) -> Result<Self, &'static str> {
        let mut world = Self::with_size(settings.map_size, settings.quadtree_capacity)?;
        let mut rng = StdRng::seed_from_u64(settings.seed);
        world.map.generate_terrain(rng.random());

        let extent = world.map.bounds();
        let center = extent.pos;
        let (vw, vh) = settings.viewport;
        world.reshape_viewport(center.x - vw / 2, center.y - vh / 2, vw, vh);

        // Starting town: clear the ground under it, then place buildings
        let town_radius = 6 * CELL_SIZE;
        world.stamp_terrain(center, town_radius, Terrain::Grass);
        world.spawn_building(BuildingType::TownCenter, center.x, center.y, 1);
        for i in 0..settings.houses {
            let angle = i as f32 / settings.houses.max(1) as f32 * std::f32::consts::TAU;
            let x = center.x + (angle.cos() * 4.0 * CELL_SIZE as f32) as i32;
            let y = center.y + (angle.sin() * 4.0 * CELL_SIZE as f32) as i32;
            world.spawn_building(BuildingType::House, x, y, 1);
        }
        for i in 0..settings.villagers {
            let x = center.x - 2 * CELL_SIZE + (i as i32 % 5) * CELL_SIZE;
            let y = center.y - 3 * CELL_SIZE - (i as i32 / 5) * CELL_SIZE / 2;
            world.spawn_villager(x, y, 1 + (i as u32 % PLAYER_COLORS));
        }

        // Resources on land, away from the town
        let (min, max) = (extent.min(), extent.max());
        let mut placed = 0;
        let mut attempts = 0;
        while placed < settings.resources && attempts < settings.resources.saturating_mul(20) {
            attempts += 1;
            let x = rng.random_range(min.x + CELL_SIZE..max.x - CELL_SIZE);
            let y = rng.random_range(min.y + CELL_SIZE..max.y - CELL_SIZE);
            let p = Point::new(x, y);
            let (col, row) = world.map.world_to_cell(p);
            if world.map.terrain_at(col, row) == Some(Terrain::Water) {
                continue;
            }
            let near_town = ((x - center.x).pow(2) + (y - center.y).pow(2)) < (town_radius * 2).pow(2);
            if near_town {
                continue;
            }
            let kind = match world.map.terrain_at(col, row) {
                Some(Terrain::Forest) => ResourceKind::Wood,
                Some(Terrain::Desert) => if rng.random_bool(0.5) { ResourceKind::Gold } else { ResourceKind::Stone },
                _ => if rng.random_bool(0.6) { ResourceKind::Food } else { ResourceKind::Wood },
            };
            if world.spawn_resource(x, y, kind).is_some() {
                placed += 1;
            }
        }
        if placed < settings.resources {
            warn!("generate: only placed {}/{} resources", placed, settings.resources);
        }

        info!("generate: {:?} map {}x{}, {} units ({} resources), {} index nodes",
            settings.map_size, world.map.width(), world.map.height(),
            world.arena.unit_count(), placed, world.tree.node_count());
        Ok(world)
    }

    fn stamp_terrain(&mut self, at: Point, radius: i32, terrain: Terrain) {
        for row in 0..self.map.height() {
            for col in 0..self.map.width() {
                let c = self.map.cell_center(col, row);
                if (c.x - at.x).pow(2) + (c.y - at.y).pow(2) < radius.pow(2) {
                    self.map.set_terrain(col, row, terrain);
                }
            }
        }
    }
}
