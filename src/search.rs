//! Repulsion ("flee") search over the tile cost grid.
//!
//! The search expands outward from a seed in weighted best-first order and
//! stops at the cheapest reachable tile that is out of range of every goal.
//! The heuristic is the goal-set shortfall, i.e. how many more tiles the
//! current node must move before it clears the nearest goal. Work is bounded
//! by an operation budget so a single call can never run away with the tick.

use crate::config::SearchOptions;
use crate::constants::*;
use crate::cost_grid::*;
use crate::goals::*;
use crate::location::*;
use crate::terrain::*;
use log::*;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Result of one repulsion search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Tiles from the seed (exclusive) to the chosen terminal (inclusive).
    pub path: Vec<Location>,
    /// True when the search stopped before reaching a tile clear of every goal.
    pub incomplete: bool,
    /// Nodes expanded.
    pub ops: u32,
    /// Accumulated traversal cost of `path`.
    pub cost: u32,
}

impl SearchOutcome {
    pub fn terminal(&self) -> Option<Location> {
        self.path.last().copied()
    }

    /// An empty path, an incomplete search, and a search that spent exactly
    /// its whole budget are all treated as failures.
    pub fn is_failure(&self, max_ops: u32) -> bool {
        self.path.is_empty() || self.incomplete || self.ops == max_ops
    }
}

pub struct RepulsionPathSearch<'a> {
    grid: &'a TileCostGrid,
    terrain: Option<&'a FastRoomTerrain>,
    options: SearchOptions,
}

impl<'a> RepulsionPathSearch<'a> {
    pub fn new(
        grid: &'a TileCostGrid,
        terrain: Option<&'a FastRoomTerrain>,
        options: SearchOptions,
    ) -> Self {
        RepulsionPathSearch {
            grid,
            terrain,
            options,
        }
    }

    /// Cost of stepping onto `location`, or `None` if it cannot be entered.
    fn tile_cost(&self, location: Location) -> Option<u32> {
        match self.grid.get(location) {
            IMPASSABLE_COST => None,
            TERRAIN_COST => match self.terrain {
                Some(terrain) => {
                    let flags = terrain.get(location);
                    if flags.contains(TerrainFlags::WALL) {
                        None
                    } else if flags.contains(TerrainFlags::SWAMP) {
                        Some(self.options.swamp_cost)
                    } else {
                        Some(self.options.plain_cost)
                    }
                }
                None => Some(self.options.plain_cost),
            },
            cost => Some(cost as u32),
        }
    }

    fn heuristic(&self, shortfall: u8) -> u32 {
        let estimate = shortfall as f32 * self.options.plain_cost as f32;
        (estimate * self.options.heuristic_weight.max(0.0)).ceil() as u32
    }

    /// Search from `seed` for the cheapest tile clear of every goal.
    pub fn search(&self, seed: Location, goals: &GoalSet) -> SearchOutcome {
        let max_ops = self.options.max_ops;

        let mut g_score: RoomDataArray<u32> = RoomDataArray::new(u32::MAX);
        let mut came_from: RoomDataArray<Option<Location>> = RoomDataArray::new(None);
        let mut closed: RoomDataArray<bool> = RoomDataArray::new(false);

        // Min-heap on (f, shortfall, packed location); the packed location
        // makes ties resolve the same way on every run.
        let mut open: BinaryHeap<Reverse<(u32, u8, u16)>> = BinaryHeap::new();

        let seed_shortfall = goals.shortfall(seed);
        g_score.set_at(seed, 0);
        open.push(Reverse((
            self.heuristic(seed_shortfall),
            seed_shortfall,
            seed.packed_repr(),
        )));

        let mut best = (seed_shortfall, 0u32, seed);
        let mut ops = 0u32;

        while ops < max_ops {
            let Reverse((_, shortfall, packed)) = match open.pop() {
                Some(entry) => entry,
                None => break,
            };
            let current = Location::from_packed(packed);
            if closed.at(current) {
                continue;
            }
            closed.set_at(current, true);
            ops += 1;

            let g = g_score.at(current);

            if shortfall == 0 {
                let path = reconstruct_path(&came_from, seed, current);
                trace!(
                    "Repulsion search reached ({}, {}) in {} ops, cost {}",
                    current.x(),
                    current.y(),
                    ops,
                    g
                );
                return SearchOutcome {
                    path,
                    incomplete: false,
                    ops,
                    cost: g,
                };
            }

            if (shortfall, g) < (best.0, best.1) {
                best = (shortfall, g, current);
            }

            for &(dx, dy) in &NEIGHBORS_8 {
                let next = match current.offset(dx, dy) {
                    Some(next) => next,
                    None => continue,
                };
                if closed.at(next) {
                    continue;
                }
                let step = match self.tile_cost(next) {
                    Some(step) => step,
                    None => continue,
                };
                let next_g = g.saturating_add(step);
                if next_g > self.options.max_cost || next_g >= g_score.at(next) {
                    continue;
                }
                g_score.set_at(next, next_g);
                came_from.set_at(next, Some(current));
                let next_shortfall = goals.shortfall(next);
                open.push(Reverse((
                    next_g.saturating_add(self.heuristic(next_shortfall)),
                    next_shortfall,
                    next.packed_repr(),
                )));
            }
        }

        let (_, cost, terminal) = best;
        debug!(
            "Repulsion search incomplete after {} ops, best shortfall {} at ({}, {})",
            ops,
            best.0,
            terminal.x(),
            terminal.y()
        );

        SearchOutcome {
            path: reconstruct_path(&came_from, seed, terminal),
            incomplete: true,
            ops,
            cost,
        }
    }
}

fn reconstruct_path(
    came_from: &RoomDataArray<Option<Location>>,
    seed: Location,
    terminal: Location,
) -> Vec<Location> {
    let mut path = Vec::new();
    let mut current = terminal;
    while current != seed {
        path.push(current);
        match came_from.at(current) {
            Some(previous) => current = previous,
            None => break,
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goals_at(location: Location, range: u8) -> GoalSet {
        [GoalEntry::new(location, range, None)].into_iter().collect()
    }

    #[test]
    fn flees_to_first_clear_tile() {
        let grid = TileCostGrid::new();
        let seed = Location::from_coords(25, 25);
        let search = RepulsionPathSearch::new(&grid, None, SearchOptions::default());

        let outcome = search.search(seed, &goals_at(seed, 3));

        assert!(!outcome.is_failure(DEFAULT_MAX_OPS));
        assert_eq!(outcome.path.len(), 3);
        let terminal = outcome.terminal().unwrap();
        assert_eq!(terminal.distance_to(seed), 3);
        assert_eq!(outcome.cost, 3 * DEFAULT_PLAIN_COST);
    }

    #[test]
    fn path_is_contiguous() {
        let grid = TileCostGrid::new();
        let seed = Location::from_coords(10, 40);
        let search = RepulsionPathSearch::new(&grid, None, SearchOptions::default());
        let outcome = search.search(seed, &goals_at(seed, 6));

        let mut previous = seed;
        for step in &outcome.path {
            assert_eq!(previous.distance_to(*step), 1);
            previous = *step;
        }
    }

    #[test]
    fn prefers_road_tiles() {
        let mut grid = TileCostGrid::new();
        let seed = Location::from_coords(25, 25);
        for x in 26..=30 {
            grid.set(Location::from_coords(x, 25), ROAD_COST);
        }
        let search = RepulsionPathSearch::new(&grid, None, SearchOptions::default());
        let outcome = search.search(seed, &goals_at(seed, 4));

        assert!(outcome.path.iter().all(|l| l.y() == 25 && l.x() > 25));
        assert_eq!(outcome.cost, 4);
    }

    #[test]
    fn seed_already_clear_is_a_failure() {
        let grid = TileCostGrid::new();
        let search = RepulsionPathSearch::new(&grid, None, SearchOptions::default());
        let outcome = search.search(Location::from_coords(5, 5), &GoalSet::new());

        assert!(outcome.path.is_empty());
        assert!(outcome.is_failure(DEFAULT_MAX_OPS));
    }

    #[test]
    fn walled_in_seed_is_incomplete() {
        let mut grid = TileCostGrid::new();
        let seed = Location::from_coords(25, 25);
        for &(dx, dy) in &NEIGHBORS_8 {
            grid.set(seed.offset(dx, dy).unwrap(), IMPASSABLE_COST);
        }
        let search = RepulsionPathSearch::new(&grid, None, SearchOptions::default());
        let outcome = search.search(seed, &goals_at(seed, 2));

        assert!(outcome.incomplete);
        assert!(outcome.is_failure(DEFAULT_MAX_OPS));
        assert_eq!(outcome.ops, 1);
    }

    #[test]
    fn budget_exhaustion_returns_best_effort() {
        let grid = TileCostGrid::new();
        let seed = Location::from_coords(25, 25);
        let options = SearchOptions {
            max_ops: 5,
            heuristic_weight: 0.0,
            ..Default::default()
        };
        let search = RepulsionPathSearch::new(&grid, None, options);
        let outcome = search.search(seed, &goals_at(seed, 10));

        assert!(outcome.incomplete);
        assert_eq!(outcome.ops, 5);
        assert!(outcome.is_failure(5));
    }

    #[test]
    fn terrain_walls_block_and_swamps_cost_more() {
        let grid = TileCostGrid::new();
        let mut terrain = FastRoomTerrain::plain();
        let seed = Location::from_coords(25, 25);
        for &(dx, dy) in &NEIGHBORS_8 {
            let location = seed.offset(dx, dy).unwrap();
            if dx == 1 && dy == 0 {
                terrain.set(location, TerrainFlags::SWAMP);
            } else {
                terrain.set(location, TerrainFlags::WALL);
            }
        }
        let search = RepulsionPathSearch::new(&grid, Some(&terrain), SearchOptions::default());
        let outcome = search.search(seed, &goals_at(seed, 1));

        assert_eq!(outcome.path, vec![Location::from_coords(26, 25)]);
        assert_eq!(outcome.cost, DEFAULT_SWAMP_COST);
    }
}
