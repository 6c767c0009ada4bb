//! Map - Terrain grid, heightmap and the viewport used for culling

use noise::{NoiseFn, Simplex};
use serde::{Deserialize, Serialize};
use bevy::log::debug;

use crate::constants::{CELL_SIZE, MAP_DIMENSIONS, MAX_HEIGHT, TERRAIN_FREQUENCY};
use crate::geometry::{Aabb, Point};

// ============================================================================
// MAP SIZE
// ============================================================================

/// Size class chosen once at match start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapSize {
    /// Debug-sized map.
    Micro,
    #[default]
    Tiny,
    Small,
    Medium,
    Large,
    Huge,
}

impl MapSize {
    pub const ALL: [MapSize; 6] = [
        MapSize::Micro, MapSize::Tiny, MapSize::Small,
        MapSize::Medium, MapSize::Large, MapSize::Huge,
    ];

    /// Square cell dimension for this size class.
    pub fn dimension(self) -> u32 {
        MAP_DIMENSIONS[self as usize]
    }
}

// ============================================================================
// TERRAIN
// ============================================================================

/// Terrain type of a single cell. Zeroed buffers read as grass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Terrain {
    #[default]
    Grass = 0,
    Forest,
    Water,
    Desert,
}

// ============================================================================
// MAP
// ============================================================================

/// Terrain grid plus heightmap, owned exclusively, and the cached viewport.
#[derive(Clone, Debug, Default)]
pub struct Map {
    terrain: Vec<Terrain>,
    heightmap: Vec<u8>,
    w: u32,
    h: u32,
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
    pub top: i32,
}

impl Map {
    /// Allocate a zeroed `w * h` grid. Fails on a zero dimension or if the
    /// buffers cannot be allocated.
    pub fn new(w: u32, h: u32) -> Result<Self, &'static str> {
        let mut map = Self::default();
        map.allocate(w, h)?;
        Ok(map)
    }

    /// One-time allocation for a size class. Replaces any previous buffers.
    pub fn resize(&mut self, size: MapSize) -> Result<(), &'static str> {
        let dim = size.dimension();
        self.allocate(dim, dim)
    }

    fn allocate(&mut self, w: u32, h: u32) -> Result<(), &'static str> {
        if w == 0 || h == 0 {
            return Err("map dimension must be non-zero");
        }
        let cells = (w as usize).checked_mul(h as usize).ok_or("map dimension overflow")?;

        let mut terrain = Vec::new();
        terrain.try_reserve_exact(cells).map_err(|_| "map allocation failed")?;
        terrain.resize(cells, Terrain::default());
        let mut heightmap = Vec::new();
        heightmap.try_reserve_exact(cells).map_err(|_| "map allocation failed")?;
        heightmap.resize(cells, 0u8);

        self.terrain = terrain;
        self.heightmap = heightmap;
        self.w = w;
        self.h = h;
        debug!("map allocated: {}x{} cells", w, h);
        Ok(())
    }

    /// Update the viewport rectangle. Does not touch the buffers.
    /// Edges past the `i32` range saturate.
    pub fn reshape(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.left = x;
        self.bottom = y;
        self.right = x.saturating_add(w);
        self.top = y.saturating_add(h);
    }

    pub fn width(&self) -> u32 { self.w }
    pub fn height(&self) -> u32 { self.h }

    /// Playable area in world units.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_corners(0, 0, self.w as i32 * CELL_SIZE, self.h as i32 * CELL_SIZE)
    }

    /// Current viewport as a world-space box.
    pub fn viewport(&self) -> Aabb {
        Aabb::from_corners(self.left, self.bottom, self.right, self.top)
    }

    /// World position of the viewport's lower-left corner.
    pub fn viewport_origin(&self) -> Point {
        Point::new(self.left, self.bottom)
    }

    /// Move `aabb` the least distance needed to keep it inside the playable
    /// area. A box larger than the map is centered on it.
    pub fn clamp(&self, aabb: Aabb) -> Aabb {
        let b = self.bounds();
        let clamp_axis = |pos: i32, half: i32, lo: i32, hi: i32| {
            if hi - lo <= half * 2 { (lo + hi) / 2 } else { pos.clamp(lo + half, hi - half) }
        };
        let (min, max) = (b.min(), b.max());
        let x = clamp_axis(aabb.pos.x, aabb.hbounds.x, min.x, max.x);
        let y = clamp_axis(aabb.pos.y, aabb.hbounds.y, min.y, max.y);
        aabb.with_pos(Point::new(x, y))
    }

    // ========================================================================
    // CELL ACCESS
    // ========================================================================

    fn index(&self, col: u32, row: u32) -> Option<usize> {
        (col < self.w && row < self.h).then(|| row as usize * self.w as usize + col as usize)
    }

    pub fn terrain_at(&self, col: u32, row: u32) -> Option<Terrain> {
        self.index(col, row).map(|i| self.terrain[i])
    }

    pub fn height_at(&self, col: u32, row: u32) -> Option<u8> {
        self.index(col, row).map(|i| self.heightmap[i])
    }

    pub fn set_terrain(&mut self, col: u32, row: u32, terrain: Terrain) -> bool {
        match self.index(col, row) {
            Some(i) => { self.terrain[i] = terrain; true }
            None => false,
        }
    }

    pub fn set_height(&mut self, col: u32, row: u32, height: u8) -> bool {
        match self.index(col, row) {
            Some(i) => { self.heightmap[i] = height.min(MAX_HEIGHT); true }
            None => false,
        }
    }

    /// Cell holding a world position, clamped to the grid.
    pub fn world_to_cell(&self, p: Point) -> (u32, u32) {
        let col = (p.x.max(0) / CELL_SIZE) as u32;
        let row = (p.y.max(0) / CELL_SIZE) as u32;
        (col.min(self.w.saturating_sub(1)), row.min(self.h.saturating_sub(1)))
    }

    /// World position of a cell's center.
    pub fn cell_center(&self, col: u32, row: u32) -> Point {
        Point::new(
            col as i32 * CELL_SIZE + CELL_SIZE / 2,
            row as i32 * CELL_SIZE + CELL_SIZE / 2,
        )
    }

    // ========================================================================
    // TERRAIN GENERATION
    // ========================================================================

    /// Fill terrain and heightmap from two simplex noise fields.
    pub fn generate_terrain(&mut self, seed: u32) {
        let elevation = Simplex::new(seed);
        let moisture = Simplex::new(seed.wrapping_add(1));

        for row in 0..self.h {
            for col in 0..self.w {
                let c = self.cell_center(col, row);
                let (wx, wy) = (c.x as f64 * TERRAIN_FREQUENCY, c.y as f64 * TERRAIN_FREQUENCY);

                // 2-octave elevation normalized to [0, 1]
                let e = (elevation.get([wx, wy]) + 0.5 * elevation.get([wx * 2.0, wy * 2.0])) / 1.5;
                let e = ((e + 1.0) * 0.5).clamp(0.0, 1.0);
                let m = (moisture.get([wx * 1.5, wy * 1.5]) + 1.0) * 0.5;

                let terrain = if e < 0.3 {
                    Terrain::Water
                } else if m < 0.3 {
                    Terrain::Desert
                } else if m > 0.65 {
                    Terrain::Forest
                } else {
                    Terrain::Grass
                };

                let i = row as usize * self.w as usize + col as usize;
                self.terrain[i] = terrain;
                self.heightmap[i] = if terrain == Terrain::Water {
                    0
                } else {
                    ((e - 0.3) / 0.7 * MAX_HEIGHT as f64).round() as u8
                };
            }
        }
    }
}
