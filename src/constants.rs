//! Constants - Tuning parameters for the world model

// ============================================================================
// MAP
// ============================================================================

/// World units per terrain cell.
pub const CELL_SIZE: i32 = 32;

/// Square cell dimension for each map size class (MICRO..HUGE).
pub const MAP_DIMENSIONS: [u32; 6] = [24, 64, 120, 144, 168, 220];

/// Highest value stored in the heightmap.
pub const MAX_HEIGHT: u8 = 7;

/// Noise frequency for terrain generation (per world unit).
pub const TERRAIN_FREQUENCY: f64 = 0.0025;

/// Default viewport size in world units (roughly one 1024x768 screen).
pub const DEFAULT_VIEWPORT: (i32, i32) = (1024, 768);

// ============================================================================
// QUADTREE
// ============================================================================

/// Entries a leaf holds before it splits into four quadrants.
pub const QUADTREE_CAPACITY: usize = 8;

/// Deepest level a node may be created at. Root is depth 0.
pub const QUADTREE_MAX_DEPTH: u32 = 8;

/// Nodes with a half-extent below this never split.
pub const QUADTREE_MIN_HALF: i32 = 8;

// ============================================================================
// MOVEMENT
// ============================================================================

/// Distance below which a unit snaps onto its target.
pub const ARRIVAL_EPSILON: f32 = 0.5;

// ============================================================================
// UNIT PRESETS
// ============================================================================

/// Villager hit points.
pub const VILLAGER_HP: u32 = 25;
/// Villager sprite size (diameter in world units).
pub const VILLAGER_SIZE: u32 = 14;
/// Villager speed in world units per tick.
pub const VILLAGER_SPEED: f32 = 2.0;

/// Resource nodes carry a token hit point so they never count as dead.
pub const RESOURCE_HP: u32 = 1;
/// Default resource node size.
pub const RESOURCE_SIZE: u32 = 24;

/// Town center hit points.
pub const TOWN_CENTER_HP: u32 = 600;
/// Town center footprint in cells.
pub const TOWN_CENTER_CELLS: u32 = 3;
/// House hit points.
pub const HOUSE_HP: u32 = 75;
/// House footprint in cells.
pub const HOUSE_CELLS: u32 = 2;

/// Starting amount for each resource kind (food, wood, gold, stone).
pub const RESOURCE_AMOUNTS: [u32; 4] = [150, 40, 400, 250];

// ============================================================================
// PLAYER COLORS
// ============================================================================

/// Color tag of gaia (unowned) objects.
pub const GAIA_COLOR: u32 = 8;

/// Number of distinct player colors.
pub const PLAYER_COLORS: u32 = 8;
