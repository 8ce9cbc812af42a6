//! Mutable per-tile traversal cost used by the repulsion search.

use crate::constants::*;
use crate::error::PlannerError;
use crate::location::*;
use crate::terrain::*;
use itertools::iproduct;
use serde::{Deserialize, Serialize};

/// 50x50 traversal cost bytes.
///
/// `IMPASSABLE_COST` blocks a tile, `ROAD_COST` marks a road, and
/// `TERRAIN_COST` (the default) defers to the terrain weight during search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileCostGrid {
    costs: RoomDataArray<u8>,
}

impl Default for TileCostGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl TileCostGrid {
    pub fn new() -> Self {
        TileCostGrid {
            costs: RoomDataArray::new(TERRAIN_COST),
        }
    }

    /// Grid derived from terrain: walls and the grid edge are impassable.
    pub fn from_terrain(terrain: &FastRoomTerrain) -> Self {
        let mut grid = TileCostGrid::new();
        for (y, x) in iproduct!(0..ROOM_HEIGHT, 0..ROOM_WIDTH) {
            let location = Location::from_coords(x as u32, y as u32);
            if terrain.is_wall(x, y) || location.is_boundary() {
                grid.set(location, IMPASSABLE_COST);
            }
        }
        grid
    }

    #[inline]
    pub fn get(&self, location: Location) -> u8 {
        self.costs.at(location)
    }

    #[inline]
    pub fn set(&mut self, location: Location, cost: u8) {
        self.costs.set_at(location, cost);
    }

    pub fn get_xy(&self, x: i32, y: i32) -> Result<u8, PlannerError> {
        Location::checked(x, y)
            .map(|location| self.get(location))
            .ok_or(PlannerError::OutOfBounds { x, y })
    }

    pub fn set_xy(&mut self, x: i32, y: i32, cost: u8) -> Result<(), PlannerError> {
        let location = Location::checked(x, y).ok_or(PlannerError::OutOfBounds { x, y })?;
        self.set(location, cost);
        Ok(())
    }

    #[inline]
    pub fn is_impassable(&self, location: Location) -> bool {
        self.get(location) == IMPASSABLE_COST
    }

    #[inline]
    pub fn is_road(&self, location: Location) -> bool {
        self.get(location) == ROAD_COST
    }

    /// Mark every tile within `margin` of the grid edge impassable.
    pub fn set_border_unwalkable(&mut self, margin: u8) {
        for (y, x) in iproduct!(0..ROOM_HEIGHT, 0..ROOM_WIDTH) {
            let location = Location::from_coords(x as u32, y as u32);
            if !location.is_inside_margin(margin) {
                self.set(location, IMPASSABLE_COST);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Location, u8)> + '_ {
        self.costs
            .iter()
            .map(|((x, y), cost)| (Location::from_coords(x as u32, y as u32), *cost))
    }
}
