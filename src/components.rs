//! World entities - Particles, units and their kind-specific payloads.
//!
//! Every unit is one `Unit` record: the shared particle fields, hit points,
//! and a `UnitKind` tag carrying what differs between resource nodes,
//! buildings and mobile units. `tick`/`draw`/`to_screen` match on the tag.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::animation::{self, AnimationRef};
use crate::constants::*;
use crate::geometry::{Aabb, Point};
use crate::map::Map;
use crate::render::{Canvas, Layer, Sprite};

// ============================================================================
// IDENTITY
// ============================================================================

/// Stable unique id, assigned once by the arena and never reused.
/// Entity equality is id equality.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

// ============================================================================
// PARTICLE
// ============================================================================

/// Lightest world object (debris, chunks). Visual only: no hit points, no owner.
#[derive(Clone, Debug)]
pub struct Particle {
    pub id: EntityId,
    pub pos: Point,
    /// Cached screen box, refreshed by `to_screen`.
    pub scr: Aabb,
    /// Tile displacement of the sprite relative to `pos`.
    pub dx: i32,
    pub dy: i32,
    /// Footprint in cells (0 = use `size`).
    pub w: u32,
    pub h: u32,
    pub size: u32,
    pub color: u32,
    pub animation: AnimationRef,
    pub image_index: u32,
}

impl Particle {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: EntityId, x: i32, y: i32,
        size: u32, w: u32, h: u32,
        animation: AnimationRef, color: u32,
        dx: i32, dy: i32,
    ) -> Self {
        let mut p = Self {
            id,
            pos: Point::new(x, y),
            scr: Aabb::default(),
            dx, dy, w, h, size, color,
            animation,
            image_index: 0,
        };
        p.scr = Aabb::new(p.pos, p.footprint());
        p
    }

    /// Debris preset.
    pub fn debris(id: EntityId, x: i32, y: i32, color: u32) -> Self {
        Self::new(id, x, y, 8, 0, 0, animation::DEBRIS, color, 0, 0)
    }

    /// Half-extents of the world footprint. Never zero.
    pub fn footprint(&self) -> Point {
        if self.w > 0 || self.h > 0 {
            Point::new(
                (self.w as i32 * CELL_SIZE / 2).max(1),
                (self.h as i32 * CELL_SIZE / 2).max(1),
            )
        } else {
            let half = (self.size as i32 / 2).max(1);
            Point::new(half, half)
        }
    }

    /// World-space box.
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.footprint())
    }

    /// Screen box for the current viewport, without caching.
    pub fn screen_box(&self, map: &Map) -> Aabb {
        let origin = map.viewport_origin();
        Aabb::new(
            Point::new(
                self.pos.x.saturating_sub(origin.x).saturating_add(self.dx),
                self.pos.y.saturating_sub(origin.y).saturating_add(self.dy),
            ),
            self.footprint(),
        )
    }

    /// Refresh the cached screen box. Call after the viewport or `pos` changes.
    pub fn to_screen(&mut self, map: &Map) {
        self.scr = self.screen_box(map);
    }

    pub fn advance_frame(&mut self) {
        self.image_index = self.animation.next_frame(self.image_index);
    }

    fn sprite(&self, map: &Map) -> Sprite {
        Sprite {
            entity: self.id,
            animation: self.animation.id,
            frame: self.image_index,
            screen: self.screen_box(map),
            color: self.color,
            layer: Layer::Base,
        }
    }

    /// Draw the current frame at the projected position.
    pub fn draw(&self, map: &Map, canvas: &mut impl Canvas) {
        canvas.draw_sprite(&self.sprite(map));
    }
}

impl PartialEq for Particle {
    fn eq(&self, other: &Self) -> bool { self.id == other.id }
}

impl Eq for Particle {}

// ============================================================================
// KIND PAYLOADS
// ============================================================================

/// Harvestable resource type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Food,
    Wood,
    Gold,
    Stone,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [Self::Food, Self::Wood, Self::Gold, Self::Stone];

    pub fn animation(self) -> AnimationRef {
        match self {
            Self::Food => animation::BERRY_BUSH,
            Self::Wood => animation::TREE,
            Self::Gold => animation::GOLD_MINE,
            Self::Stone => animation::STONE_MINE,
        }
    }

    pub fn default_amount(self) -> u32 {
        RESOURCE_AMOUNTS[self as usize]
    }
}

/// Remaining stock of a resource node. Drawn down by the economy layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceStock {
    pub kind: ResourceKind,
    pub amount: u32,
}

impl ResourceStock {
    /// Take up to `amount`; returns what was actually taken.
    pub fn harvest(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.amount);
        self.amount -= taken;
        taken
    }

    pub fn is_depleted(&self) -> bool { self.amount == 0 }
}

/// Straight-line movement state of a dynamic unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Movement {
    pub target: Point,
    /// Per-tick velocity (world units). Zero when idle.
    pub velocity: Vec2,
    pub movespeed: f32,
    /// Animation while idle.
    pub stand: AnimationRef,
    /// Animation while moving.
    pub walk: AnimationRef,
    /// Sub-unit position; the unit's `pos` is this rounded.
    exact: Vec2,
}

impl Movement {
    pub fn new(pos: Point, movespeed: f32, stand: AnimationRef, walk: AnimationRef) -> Self {
        Self { target: pos, velocity: Vec2::ZERO, movespeed, stand, walk, exact: pos.as_vec2() }
    }

    /// Animation matching the current state.
    pub fn gait(&self) -> AnimationRef {
        if self.is_moving() { self.walk } else { self.stand }
    }

    pub fn exact(&self) -> Vec2 { self.exact }

    pub fn is_moving(&self) -> bool { self.velocity != Vec2::ZERO }

    /// Distance from the exact position to the target.
    pub fn distance_to_target(&self) -> f32 {
        self.exact.distance(self.target.as_vec2())
    }

    fn retarget(&mut self, target: Point) {
        self.target = target;
        self.velocity = Vec2::ZERO;
    }

    fn place(&mut self, pos: Point) {
        self.exact = pos.as_vec2();
    }

    /// Advance one tick toward the target without overshooting.
    /// Returns the rounded position afterwards.
    fn step(&mut self) -> Point {
        let goal = self.target.as_vec2();
        let delta = goal - self.exact;
        let dist = delta.length();
        if dist <= self.movespeed.max(ARRIVAL_EPSILON) {
            self.exact = goal;
            self.velocity = Vec2::ZERO;
        } else {
            self.velocity = delta / dist * self.movespeed;
            self.exact += self.velocity;
        }
        Point::from_vec2(self.exact)
    }
}

/// Second animation layer drawn on top of a building.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Overlay {
    pub animation: AnimationRef,
    pub index: u32,
}

/// Building presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingType {
    TownCenter,
    House,
}

impl BuildingType {
    pub fn hp(self) -> u32 {
        match self {
            Self::TownCenter => TOWN_CENTER_HP,
            Self::House => HOUSE_HP,
        }
    }

    pub fn cells(self) -> u32 {
        match self {
            Self::TownCenter => TOWN_CENTER_CELLS,
            Self::House => HOUSE_CELLS,
        }
    }

    pub fn animations(self) -> (AnimationRef, AnimationRef) {
        match self {
            Self::TownCenter => (animation::TOWN_CENTER, animation::TOWN_CENTER_OVERLAY),
            Self::House => (animation::HOUSE, animation::HOUSE_OVERLAY),
        }
    }
}

/// What kind of unit a record is, with the kind-specific data.
#[derive(Clone, Debug, PartialEq)]
pub enum UnitKind {
    Resource(ResourceStock),
    Dynamic(Movement),
    Building(Overlay),
}

// ============================================================================
// UNIT
// ============================================================================

/// Anything that can be damaged or destroyed.
#[derive(Clone, Debug)]
pub struct Unit {
    pub particle: Particle,
    hp: u32,
    hp_max: u32,
    pub kind: UnitKind,
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool { self.particle.id == other.particle.id }
}

impl Eq for Unit {}

impl Unit {
    pub fn new(particle: Particle, hp: u32, kind: UnitKind) -> Self {
        Self { particle, hp, hp_max: hp, kind }
    }

    // ========================================================================
    // SPAWN PRESETS
    // ========================================================================

    /// Dynamic unit with an explicit footprint, stand/walk animations and speed.
    #[allow(clippy::too_many_arguments)]
    pub fn dynamic(
        id: EntityId, hp: u32, x: i32, y: i32, size: u32,
        (stand, walk): (AnimationRef, AnimationRef), color: u32, movespeed: f32,
    ) -> Self {
        let particle = Particle::new(id, x, y, size, 0, 0, stand, color, 0, 0);
        let movement = Movement::new(particle.pos, movespeed, stand, walk);
        Self::new(particle, hp, UnitKind::Dynamic(movement))
    }

    pub fn villager(id: EntityId, x: i32, y: i32, color: u32) -> Self {
        let gait = (animation::VILLAGER_STAND, animation::VILLAGER_WALK);
        Self::dynamic(id, VILLAGER_HP, x, y, VILLAGER_SIZE, gait, color, VILLAGER_SPEED)
    }

    /// Resource node with a custom animation and amount.
    pub fn static_resource(
        id: EntityId, x: i32, y: i32, size: u32,
        animation: AnimationRef, kind: ResourceKind, amount: u32,
    ) -> Self {
        let particle = Particle::new(id, x, y, size, 0, 0, animation, GAIA_COLOR, 0, 0);
        Self::new(particle, RESOURCE_HP, UnitKind::Resource(ResourceStock { kind, amount }))
    }

    /// Resource node with the default look and amount for its kind.
    pub fn resource(id: EntityId, x: i32, y: i32, kind: ResourceKind) -> Self {
        Self::static_resource(id, x, y, RESOURCE_SIZE, kind.animation(), kind, kind.default_amount())
    }

    pub fn building(id: EntityId, kind: BuildingType, x: i32, y: i32, color: u32) -> Self {
        let (base, overlay) = kind.animations();
        let cells = kind.cells();
        let particle = Particle::new(id, x, y, 0, cells, cells, base, color, 0, 0);
        Self::new(particle, kind.hp(), UnitKind::Building(Overlay { animation: overlay, index: 0 }))
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn id(&self) -> EntityId { self.particle.id }
    pub fn pos(&self) -> Point { self.particle.pos }
    pub fn bounds(&self) -> Aabb { self.particle.bounds() }
    pub fn hp(&self) -> u32 { self.hp }
    pub fn hp_max(&self) -> u32 { self.hp_max }

    pub fn is_dead(&self) -> bool { self.hp == 0 }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.kind, UnitKind::Dynamic(_))
    }

    pub fn movement(&self) -> Option<&Movement> {
        match &self.kind {
            UnitKind::Dynamic(m) => Some(m),
            _ => None,
        }
    }

    pub fn resource_stock(&self) -> Option<&ResourceStock> {
        match &self.kind {
            UnitKind::Resource(r) => Some(r),
            _ => None,
        }
    }

    pub fn resource_stock_mut(&mut self) -> Option<&mut ResourceStock> {
        match &mut self.kind {
            UnitKind::Resource(r) => Some(r),
            _ => None,
        }
    }

    // ========================================================================
    // STATE CHANGES
    // ========================================================================

    /// Subtract hit points, stopping at zero. Returns true if this killed the unit.
    pub fn damage(&mut self, amount: u32) -> bool {
        let was_alive = self.hp > 0;
        self.hp = self.hp.saturating_sub(amount);
        was_alive && self.hp == 0
    }

    /// Restore hit points up to the maximum.
    pub fn heal(&mut self, amount: u32) {
        self.hp = self.hp.saturating_add(amount).min(self.hp_max);
        debug_assert!(self.hp <= self.hp_max);
    }

    /// Teleport. Keeps the movement state in sync; clears any pending move.
    pub fn set_pos(&mut self, pos: Point) {
        self.particle.pos = pos;
        if let UnitKind::Dynamic(m) = &mut self.kind {
            m.place(pos);
            m.retarget(pos);
        }
    }

    /// Issue a straight-line move and set the sprite displacement.
    /// Returns false for units that cannot move.
    pub fn move_to(&mut self, tx: i32, ty: i32, dx: i32, dy: i32) -> bool {
        let UnitKind::Dynamic(m) = &mut self.kind else { return false };
        m.retarget(Point::new(tx, ty));
        self.particle.dx = dx;
        self.particle.dy = dy;
        true
    }

    /// Advance one simulation tick. Returns true if the position changed.
    pub fn tick(&mut self) -> bool {
        match &mut self.kind {
            UnitKind::Dynamic(m) => {
                let before = self.particle.pos;
                let was_moving = m.target != before || m.is_moving();
                if !was_moving {
                    return false;
                }
                let after = m.step();
                self.particle.pos = after;
                let gait = m.gait();
                if self.particle.animation != gait {
                    self.particle.animation = gait;
                    self.particle.image_index = 0;
                } else {
                    self.particle.advance_frame();
                }
                after != before
            }
            UnitKind::Resource(_) | UnitKind::Building(_) => false,
        }
    }

    /// Step a building's overlay (construction progress, garrison flag).
    /// Returns false for other kinds.
    pub fn advance_overlay(&mut self) -> bool {
        let UnitKind::Building(o) = &mut self.kind else { return false };
        o.index = o.animation.next_frame(o.index);
        true
    }

    pub fn to_screen(&mut self, map: &Map) {
        self.particle.to_screen(map);
    }

    /// Draw the unit; buildings add their overlay right after the base sprite.
    pub fn draw(&self, map: &Map, canvas: &mut impl Canvas) {
        let base = self.particle.sprite(map);
        canvas.draw_sprite(&base);
        if let UnitKind::Building(overlay) = &self.kind {
            canvas.draw_sprite(&Sprite {
                animation: overlay.animation.id,
                frame: overlay.index,
                layer: Layer::Overlay,
                ..base
            });
        }
    }

    pub fn draw_selection(&self, map: &Map, canvas: &mut impl Canvas) {
        canvas.draw_selection(self.id(), self.particle.screen_box(map));
    }
}
