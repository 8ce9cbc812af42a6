pub const ROOM_WIDTH: u8 = 50;
pub const ROOM_HEIGHT: u8 = 50;
pub const ROOM_AREA: usize = (ROOM_WIDTH as usize) * (ROOM_HEIGHT as usize);

/// Cost grid value for a tile that can never be entered.
pub const IMPASSABLE_COST: u8 = 255;
/// Cost grid value for a road (and any preferred tile).
pub const ROAD_COST: u8 = 1;
/// Cost grid value meaning "no override, fall back to terrain cost".
pub const TERRAIN_COST: u8 = 0;

/// Band of tiles marked impassable along the grid boundary when no terrain
/// is available.
pub const DEFAULT_BORDER_MARGIN: u8 = 1;

/// Lower bound applied to every effective goal range.
pub const GLOBAL_MIN_RANGE: u8 = 1;
/// Upper bound applied to every effective goal range.
pub const GLOBAL_MAX_RANGE: u8 = 15;
/// Range used by the seed search that lays the anchoring road.
pub const SEED_RANGE: u8 = 4;

/// Default operation budget for one repulsion search.
pub const DEFAULT_MAX_OPS: u32 = 2500;
/// Absolute ceiling on accumulated path cost; nodes above it are not expanded.
pub const MAX_PATH_COST: u32 = 2500;

pub const DEFAULT_PLAIN_COST: u32 = 2;
pub const DEFAULT_SWAMP_COST: u32 = 10;
pub const DEFAULT_HEURISTIC_WEIGHT: f32 = 1.2;

/// Chebyshev distance from the nearest exit at which the static perimeter
/// ring is placed.
pub const PERIMETER_RANGE: u8 = 2;
