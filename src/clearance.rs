//! Largest open square per tile, for fitting fixed-size footprints.

use crate::constants::*;
use crate::cost_grid::*;
use crate::location::*;
use crate::terrain::*;
use itertools::iproduct;

/// For every tile, the side of the largest open square whose top-left
/// corner is that tile. Blocked tiles hold 0.
#[derive(Clone)]
pub struct ClearanceScanner {
    clearance: RoomDataArray<u8>,
}

impl ClearanceScanner {
    /// Single pass from the high-index corner back to (0, 0).
    pub fn compute<F>(is_open: F) -> Self
    where
        F: Fn(Location) -> bool,
    {
        let mut clearance = RoomDataArray::new(0u8);
        let read = |c: &RoomDataArray<u8>, x: i32, y: i32| -> u8 {
            Location::checked(x, y).map(|l| c.at(l)).unwrap_or(0)
        };

        for (y, x) in iproduct!((0..ROOM_HEIGHT as i32).rev(), (0..ROOM_WIDTH as i32).rev()) {
            let location = Location::from_coords(x as u32, y as u32);
            if !is_open(location) {
                continue;
            }
            let smallest = read(&clearance, x + 1, y)
                .min(read(&clearance, x, y + 1))
                .min(read(&clearance, x + 1, y + 1));
            clearance.set_at(location, smallest + 1);
        }

        ClearanceScanner { clearance }
    }

    pub fn from_cost_grid(grid: &TileCostGrid, terrain: Option<&FastRoomTerrain>) -> Self {
        Self::compute(|l| {
            !grid.is_impassable(l) && !terrain.map(|t| t.is_wall(l.x(), l.y())).unwrap_or(false)
        })
    }

    #[inline]
    pub fn clearance(&self, location: Location) -> u8 {
        self.clearance.at(location)
    }

    /// Whether a `size` x `size` footprint with top-left corner `corner` is
    /// entirely open.
    pub fn fits(&self, corner: Location, size: u8) -> bool {
        size > 0 && self.clearance(corner) >= size
    }

    /// Centre tile of a footprint. Even sizes round towards the corner.
    pub fn centre_of(corner: Location, size: u8) -> Location {
        let half = (size.saturating_sub(1) / 2) as u32;
        Location::from_coords(corner.x() as u32 + half, corner.y() as u32 + half)
    }

    /// Top-left corner of the fitting footprint whose centre is nearest
    /// `near`. Ties resolve in row-major order.
    pub fn find_site(&self, size: u8, near: Location) -> Option<Location> {
        self.clearance
            .iter()
            .filter(|(_, &c)| size > 0 && c >= size)
            .map(|((x, y), _)| Location::from_coords(x as u32, y as u32))
            .min_by_key(|corner| (Self::centre_of(*corner, size).distance_to(near), *corner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_grid_clearance_shrinks_towards_far_corner() {
        let scanner = ClearanceScanner::compute(|_| true);
        assert_eq!(scanner.clearance(Location::from_coords(0, 0)), 50);
        assert_eq!(scanner.clearance(Location::from_coords(49, 49)), 1);
        assert_eq!(scanner.clearance(Location::from_coords(45, 10)), 5);
    }

    #[test]
    fn blocked_tile_limits_squares_above_and_left() {
        let blocked = Location::from_coords(10, 10);
        let scanner = ClearanceScanner::compute(|l| l != blocked);

        assert_eq!(scanner.clearance(blocked), 0);
        assert_eq!(scanner.clearance(Location::from_coords(9, 9)), 1);
        assert_eq!(scanner.clearance(Location::from_coords(7, 7)), 3);
        assert!(scanner.fits(Location::from_coords(7, 7), 3));
        assert!(!scanner.fits(Location::from_coords(7, 7), 4));
    }

    #[test]
    fn find_site_centres_near_target() {
        let mut grid = TileCostGrid::new();
        grid.set_border_unwalkable(1);
        let scanner = ClearanceScanner::from_cost_grid(&grid, None);
        let target = Location::from_coords(25, 25);

        let corner = scanner.find_site(5, target).unwrap();
        assert_eq!(ClearanceScanner::centre_of(corner, 5), target);
        assert!(scanner.fits(corner, 5));
    }

    #[test]
    fn oversized_footprint_has_no_site() {
        let mut grid = TileCostGrid::new();
        grid.set_border_unwalkable(1);
        let scanner = ClearanceScanner::from_cost_grid(&grid, None);
        assert!(scanner.find_site(49, Location::from_coords(25, 25)).is_none());
        assert!(scanner.find_site(0, Location::from_coords(25, 25)).is_none());
    }
}
