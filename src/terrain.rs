//! Terrain flags and fixed-size per-tile storage.

use crate::constants::*;
use crate::location::*;
use bitflags::*;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TerrainFlags: u8 {
        const NONE = 0;
        const WALL = 1;
        const SWAMP = 2;
    }
}

/// Terrain context for a site: one flag byte per tile, row-major.
#[derive(Clone)]
pub struct FastRoomTerrain {
    buffer: Vec<u8>,
}

impl FastRoomTerrain {
    /// Wrap a raw terrain buffer. Buffers of the wrong size are padded or
    /// truncated to the grid area; missing tiles read as plain.
    pub fn new(mut buffer: Vec<u8>) -> FastRoomTerrain {
        buffer.resize(ROOM_AREA, 0);
        FastRoomTerrain { buffer }
    }

    /// Terrain with no walls or swamps.
    pub fn plain() -> FastRoomTerrain {
        FastRoomTerrain::new(Vec::new())
    }

    pub fn set(&mut self, location: Location, flags: TerrainFlags) {
        self.buffer[location.index()] = flags.bits();
    }

    pub fn get(&self, location: Location) -> TerrainFlags {
        TerrainFlags::from_bits_truncate(self.buffer[location.index()])
    }

    pub fn is_wall(&self, x: u8, y: u8) -> bool {
        self.get(Location::from_coords(x as u32, y as u32))
            .contains(TerrainFlags::WALL)
    }

    /// Passable tiles on the grid boundary, each listed once, walked
    /// clockwise from the top-left corner.
    pub fn get_exits(&self) -> Vec<Location> {
        let last_x = ROOM_WIDTH as u32 - 1;
        let last_y = ROOM_HEIGHT as u32 - 1;

        let top = (0..=last_x).map(|x| (x, 0));
        let right = (1..=last_y).map(|y| (last_x, y));
        let bottom = (0..last_x).rev().map(|x| (x, last_y));
        let left = (1..last_y).rev().map(|y| (0, y));

        top.chain(right)
            .chain(bottom)
            .chain(left)
            .map(|(x, y)| Location::from_coords(x, y))
            .filter(|l| !self.get(*l).contains(TerrainFlags::WALL))
            .collect_vec()
    }
}

impl Serialize for FastRoomTerrain {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.buffer.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FastRoomTerrain {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let buffer = Vec::<u8>::deserialize(deserializer)?;
        if buffer.len() != ROOM_AREA {
            return Err(serde::de::Error::custom("Invalid terrain buffer size"));
        }
        Ok(FastRoomTerrain { buffer })
    }
}

/// A 50x50 array for grid-sized data, indexed by `Location`.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomDataArray<T: Copy> {
    data: Vec<T>,
}

impl<T: Copy> RoomDataArray<T> {
    pub fn new(initial: T) -> Self {
        RoomDataArray {
            data: vec![initial; ROOM_AREA],
        }
    }

    #[inline]
    pub fn at(&self, location: Location) -> T {
        self.data[location.index()]
    }

    #[inline]
    pub fn set_at(&mut self, location: Location, value: T) {
        self.data[location.index()] = value;
    }

    /// Row-major walk yielding `((x, y), value)`.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| ((i % ROOM_WIDTH as usize, i / ROOM_WIDTH as usize), v))
    }
}

impl<T: Copy + Serialize> Serialize for RoomDataArray<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.data.serialize(serializer)
    }
}

impl<'de, T: Copy + Deserialize<'de>> Deserialize<'de> for RoomDataArray<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let data = Vec::<T>::deserialize(deserializer)?;
        if data.len() != ROOM_AREA {
            return Err(serde::de::Error::custom("Invalid room data array size"));
        }
        Ok(RoomDataArray { data })
    }
}

/// Neighbor offsets for 8-directional movement.
pub const NEIGHBORS_8: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
];

/// Diagonal neighbor offsets, NW, NE, SE, SW.
pub const DIAGONALS: [(i8, i8); 4] = [(-1, -1), (1, -1), (1, 1), (-1, 1)];

/// Chebyshev distance from every tile to the nearest of `seeds`, ignoring
/// terrain. Tiles farther than `limit` are left as `None`.
pub fn chebyshev_distance_map(seeds: &[Location], limit: u8) -> RoomDataArray<Option<u8>> {
    let mut data: RoomDataArray<Option<u8>> = RoomDataArray::new(None);
    let r = limit as i32;

    for seed in seeds {
        for dy in -r..=r {
            for dx in -r..=r {
                if let Some(loc) = Location::checked(seed.x() as i32 + dx, seed.y() as i32 + dy) {
                    let dist = dx.abs().max(dy.abs()) as u8;
                    let current = data.at(loc);
                    if current.map(|c| dist < c).unwrap_or(true) {
                        data.set_at(loc, Some(dist));
                    }
                }
            }
        }
    }

    data
}
