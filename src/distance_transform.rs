//! Raster distance transform and the origin scoring built on top of it.

use crate::config::OriginSelection;
use crate::constants::*;
use crate::cost_grid::*;
use crate::location::*;
use crate::terrain::*;
use itertools::iproduct;
use log::*;

/// Per-tile approximate Chebyshev distance to the nearest rejected tile.
/// Rejected tiles hold 0, and the area outside the grid counts as rejected.
#[derive(Clone)]
pub struct DistanceTransformAnalyzer {
    values: RoomDataArray<u8>,
}

impl DistanceTransformAnalyzer {
    pub fn compute<F>(is_rejected: F) -> Self
    where
        F: Fn(Location) -> bool,
    {
        let mut values = RoomDataArray::new(0u8);
        let read = |values: &RoomDataArray<u8>, x: i32, y: i32| -> u8 {
            Location::checked(x, y).map(|l| values.at(l)).unwrap_or(0)
        };

        // Forward pass: up-left, up, up-right and left are already final.
        for (y, x) in iproduct!(0..ROOM_HEIGHT as i32, 0..ROOM_WIDTH as i32) {
            let location = Location::from_coords(x as u32, y as u32);
            if is_rejected(location) {
                values.set_at(location, 0);
                continue;
            }
            let nearest = read(&values, x - 1, y - 1)
                .min(read(&values, x, y - 1))
                .min(read(&values, x + 1, y - 1))
                .min(read(&values, x - 1, y));
            values.set_at(location, nearest.saturating_add(1));
        }

        // Backward pass: down-right, down, down-left and right.
        for (y, x) in iproduct!((0..ROOM_HEIGHT as i32).rev(), (0..ROOM_WIDTH as i32).rev()) {
            let location = Location::from_coords(x as u32, y as u32);
            let current = values.at(location);
            if current == 0 {
                continue;
            }
            let nearest = read(&values, x + 1, y + 1)
                .min(read(&values, x, y + 1))
                .min(read(&values, x - 1, y + 1))
                .min(read(&values, x + 1, y));
            values.set_at(location, current.min(nearest.saturating_add(1)));
        }

        DistanceTransformAnalyzer { values }
    }

    pub fn from_terrain(terrain: &FastRoomTerrain) -> Self {
        Self::compute(|l| terrain.is_wall(l.x(), l.y()))
    }

    /// Transform where impassable grid tiles and terrain walls are rejected.
    pub fn from_cost_grid(grid: &TileCostGrid, terrain: Option<&FastRoomTerrain>) -> Self {
        Self::compute(|l| {
            grid.is_impassable(l) || terrain.map(|t| t.is_wall(l.x(), l.y())).unwrap_or(false)
        })
    }

    #[inline]
    pub fn value(&self, location: Location) -> u8 {
        self.values.at(location)
    }

    pub fn values(&self) -> &RoomDataArray<u8> {
        &self.values
    }

    /// All acceptable sites, best first.
    ///
    /// A site must have at least `min_clearance` and sit `min_poi_distance`
    /// away from every point of interest. Sites are scored by
    /// `min(clearance, cap)^2 / mean distance to the points of interest`, so
    /// open space is traded against proximity to what matters. Ties prefer
    /// more raw clearance, then row-major order.
    pub fn ranked_sites(
        &self,
        points_of_interest: &[Location],
        selection: &OriginSelection,
    ) -> Vec<(Location, f32)> {
        let mut sites: Vec<(Location, f32, u8)> = Vec::new();

        for ((x, y), &value) in self.values.iter() {
            if value == 0 || value < selection.min_clearance {
                continue;
            }
            let location = Location::from_coords(x as u32, y as u32);
            if points_of_interest
                .iter()
                .any(|p| p.distance_to(location) < selection.min_poi_distance)
            {
                continue;
            }

            let mean_distance = if points_of_interest.is_empty() {
                1.0
            } else {
                let total: u32 = points_of_interest
                    .iter()
                    .map(|p| p.distance_to(location) as u32)
                    .sum();
                (total as f32 / points_of_interest.len() as f32).max(1.0)
            };

            let clearance = value.min(selection.clearance_cap) as f32;
            sites.push((location, clearance * clearance / mean_distance, value));
        }

        sites.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then(b.2.cmp(&a.2))
                .then(a.0.cmp(&b.0))
        });

        sites.into_iter().map(|(l, score, _)| (l, score)).collect()
    }

    /// Best site by [`ranked_sites`](Self::ranked_sites), if any qualifies.
    pub fn select_site(
        &self,
        points_of_interest: &[Location],
        selection: &OriginSelection,
    ) -> Option<Location> {
        let site = self
            .ranked_sites(points_of_interest, selection)
            .first()
            .map(|(l, _)| *l);

        match site {
            Some(l) => debug!("Distance transform selected origin ({}, {})", l.x(), l.y()),
            None => debug!("Distance transform found no acceptable origin"),
        }

        site
    }
}
