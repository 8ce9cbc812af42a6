//! ExitPerimeterPlanner: fortifies the interior near grid-boundary exits.
//!
//! Three modes are available:
//!   - **Static** places a checkerboard wall/rampart ring on every open tile
//!     exactly two tiles from the nearest exit.
//!   - **Adaptive** repeatedly paths from an interior origin to the nearest
//!     exit, fortifies a tile a few steps short of that exit and treats it
//!     as blocked, until no exit can be reached. The wall ends up along the
//!     natural choke points instead of hugging every exit.
//!   - **MinCut** computes a true minimum vertex cut between the exits and a
//!     protected square around the origin with Dinic's max-flow.
//!
//! Ramparts stay passable for friendly movement; walls do not.

use crate::config::*;
use crate::constants::*;
use crate::cost_grid::*;
use crate::installation::*;
use crate::location::*;
use crate::terrain::*;
use fnv::FnvHashSet;
use itertools::iproduct;
use log::*;
use pathfinding::directed::astar::astar;
use rs_graph::builder::Builder;
use rs_graph::maxflow::dinic;
use rs_graph::traits::*;
use rs_graph::Net;

/// Infinite capacity sentinel for edges that should never be cut.
const INF_CAP: u32 = (ROOM_AREA as u32) + 1;

/// Fortifications produced by one planner run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PerimeterPlan {
    pub fortifications: Vec<InstallationPlan>,
    /// True when no exit is reachable from the origin through unfortified
    /// tiles. Always false for the static ring, which has no origin.
    pub sealed: bool,
}

impl PerimeterPlan {
    pub fn locations(&self) -> FnvHashSet<Location> {
        self.fortifications.iter().map(|f| f.location).collect()
    }
}

pub struct ExitPerimeterPlanner<'a> {
    terrain: &'a FastRoomTerrain,
    blocked: FnvHashSet<Location>,
    options: PerimeterOptions,
}

impl<'a> ExitPerimeterPlanner<'a> {
    pub fn new(terrain: &'a FastRoomTerrain, options: PerimeterOptions) -> Self {
        ExitPerimeterPlanner {
            terrain,
            blocked: FnvHashSet::default(),
            options,
        }
    }

    /// Also treat impassable interior tiles of `grid` (built obstacles) as
    /// walls.
    pub fn with_obstacles(mut self, grid: &TileCostGrid) -> Self {
        self.blocked = grid
            .iter()
            .filter(|(l, cost)| *cost == IMPASSABLE_COST && !l.is_boundary())
            .map(|(l, _)| l)
            .collect();
        self
    }

    fn is_open(&self, location: Location) -> bool {
        !self.terrain.is_wall(location.x(), location.y()) && !self.blocked.contains(&location)
    }

    /// Run the configured mode. `origin` is ignored by the static ring.
    pub fn plan(&self, origin: Location) -> PerimeterPlan {
        match self.options.mode {
            PerimeterMode::Static => self.plan_static(),
            PerimeterMode::Adaptive => self.plan_adaptive(origin),
            PerimeterMode::MinCut => self.plan_min_cut(origin),
        }
    }

    /// Checkerboard ring at exactly `PERIMETER_RANGE` from the nearest exit.
    pub fn plan_static(&self) -> PerimeterPlan {
        let exits = self.terrain.get_exits();
        let distances = chebyshev_distance_map(&exits, PERIMETER_RANGE);

        let fortifications = distances
            .iter()
            .filter(|(_, d)| **d == Some(PERIMETER_RANGE))
            .map(|((x, y), _)| Location::from_coords(x as u32, y as u32))
            .filter(|l| !l.is_boundary() && self.is_open(*l))
            .map(|l| InstallationPlan::new(l, checkerboard_type(l)))
            .collect();

        PerimeterPlan {
            fortifications,
            sealed: false,
        }
    }

    /// Iteratively block the nearest exit path until none remains.
    pub fn plan_adaptive(&self, origin: Location) -> PerimeterPlan {
        let mut fortified: FnvHashSet<Location> = FnvHashSet::default();
        let mut fortifications = Vec::new();
        let setback = self.options.setback.max(1) as usize;

        for _ in 0..self.options.max_iterations {
            let path = match self.nearest_exit_path(origin, &fortified) {
                Some(path) => path,
                None => {
                    debug!(
                        "Adaptive perimeter sealed with {} fortifications",
                        fortifications.len()
                    );
                    return PerimeterPlan {
                        fortifications,
                        sealed: true,
                    };
                }
            };

            // The path runs origin..=exit; never fortify the origin itself.
            let index = match (path.len() - 1).checked_sub(setback) {
                Some(index) if index > 0 => index,
                _ => {
                    warn!(
                        "Exit within {} tiles of origin ({}, {}), cannot seal",
                        setback,
                        origin.x(),
                        origin.y()
                    );
                    break;
                }
            };
            let location = path[index];

            let installation_type = if fortifications.len() % 3 == 2 {
                InstallationType::Rampart
            } else {
                InstallationType::Wall
            };
            fortified.insert(location);
            fortifications.push(InstallationPlan::new(location, installation_type));
        }

        let sealed = self.nearest_exit_path(origin, &fortified).is_none();
        PerimeterPlan {
            fortifications,
            sealed,
        }
    }

    /// Shortest 8-connected path from `origin` to any exit, avoiding walls,
    /// obstacles and `fortified` tiles.
    fn nearest_exit_path(
        &self,
        origin: Location,
        fortified: &FnvHashSet<Location>,
    ) -> Option<Vec<Location>> {
        let result = astar(
            &origin,
            |&current| {
                NEIGHBORS_8
                    .iter()
                    .filter_map(move |&(dx, dy)| current.offset(dx, dy))
                    .filter(|next| self.is_open(*next) && !fortified.contains(next))
                    .map(|next| (next, 1u32))
                    .collect::<Vec<_>>()
            },
            |l| distance_to_boundary(*l),
            |l| l.is_boundary() && self.is_open(*l),
        );

        result.map(|(path, _cost)| path)
    }

    /// Minimum vertex cut between the exits and the square of radius
    /// `protect_radius` around `origin`.
    pub fn plan_min_cut(&self, origin: Location) -> PerimeterPlan {
        let mut protected: FnvHashSet<Location> = FnvHashSet::default();
        expand_region(
            std::iter::once(origin),
            self.options.protect_radius,
            |l| self.is_open(l),
            &mut protected,
        );

        let cut = self.compute_min_cut(&protected);
        let cut_set: FnvHashSet<Location> = cut.iter().copied().collect();
        let sealed = self.nearest_exit_path(origin, &cut_set).is_none();

        PerimeterPlan {
            fortifications: classify_cut(&cut_set),
            sealed,
        }
    }

    /// Open tiles are split into entry and exit nodes joined by a unit edge,
    /// so cutting a tile costs one. Neighbours, the exits and the protected
    /// square are wired with `INF_CAP`. Tiles on or beside an exit are never
    /// cut.
    fn compute_min_cut(&self, protected: &FnvHashSet<Location>) -> Vec<Location> {
        let exits = self.terrain.get_exits();
        let near_exit = chebyshev_distance_map(&exits, 1);

        let tiles: Vec<Location> = iproduct!(0..ROOM_HEIGHT as u32, 0..ROOM_WIDTH as u32)
            .map(|(y, x)| Location::from_coords(x, y))
            .filter(|l| self.is_open(*l))
            .collect();
        if tiles.is_empty() || protected.is_empty() {
            return Vec::new();
        }

        let mut index: RoomDataArray<Option<usize>> = RoomDataArray::new(None);
        for (i, location) in tiles.iter().enumerate() {
            index.set_at(*location, Some(i));
        }

        let mut network = CutNetwork::new(tiles.len());

        for (i, &location) in tiles.iter().enumerate() {
            let capacity = if location.is_boundary() || near_exit.at(location).is_some() {
                INF_CAP
            } else {
                1
            };
            network.connect(entry_node(i), exit_node(i), capacity);

            let neighbours = NEIGHBORS_8
                .iter()
                .filter_map(|&(dx, dy)| location.offset(dx, dy))
                .filter_map(|n| index.at(n));
            for j in neighbours {
                network.connect(exit_node(i), entry_node(j), INF_CAP);
            }
        }

        let source = network.source();
        for i in exits.iter().filter_map(|e| index.at(*e)) {
            network.connect(source, entry_node(i), INF_CAP);
        }

        // Tile indices are row-major, so sorting them fixes the edge order.
        let sink = network.sink();
        let mut drained: Vec<usize> = protected.iter().filter_map(|l| index.at(*l)).collect();
        drained.sort_unstable();
        for i in drained {
            network.connect(exit_node(i), sink, INF_CAP);
        }

        let (value, source_side) = network.solve();
        if value >= INF_CAP {
            warn!("Protected region touches an exit, no finite cut exists");
            return Vec::new();
        }

        tiles
            .iter()
            .enumerate()
            .filter(|(i, _)| source_side[entry_node(*i)] && !source_side[exit_node(*i)])
            .map(|(_, l)| *l)
            .collect()
    }
}

#[inline]
fn entry_node(tile: usize) -> usize {
    2 * tile
}

#[inline]
fn exit_node(tile: usize) -> usize {
    2 * tile + 1
}

/// Capacitated edge list over numbered nodes. The last two nodes are the
/// virtual source and sink.
struct CutNetwork {
    node_count: usize,
    edges: Vec<(usize, usize, u32)>,
}

impl CutNetwork {
    fn new(tiles: usize) -> Self {
        CutNetwork {
            node_count: 2 * tiles + 2,
            edges: Vec::with_capacity(9 * tiles),
        }
    }

    fn source(&self) -> usize {
        self.node_count - 2
    }

    fn sink(&self) -> usize {
        self.node_count - 1
    }

    fn connect(&mut self, from: usize, to: usize, capacity: u32) {
        self.edges.push((from, to, capacity));
    }

    /// Run Dinic's max-flow. Returns the flow value and, per node, whether
    /// it lies on the source side of the minimum cut.
    fn solve(&self) -> (u32, Vec<bool>) {
        let mut builder =
            <Net as rs_graph::builder::Buildable>::Builder::with_capacities(self.node_count, self.edges.len());
        let nodes: Vec<_> = (0..self.node_count).map(|_| builder.add_node()).collect();
        for &(from, to, _) in &self.edges {
            builder.add_edge(nodes[from], nodes[to]);
        }
        let graph = builder.into_graph();

        let (value, _flow, cut_nodes) = dinic(
            &graph,
            nodes[self.source()],
            nodes[self.sink()],
            |e| self.edges[graph.edge_id(e)].2,
        );

        let cut_ids: FnvHashSet<usize> = cut_nodes.iter().map(|n| graph.node_id(*n)).collect();
        let source_side = nodes
            .iter()
            .map(|n| cut_ids.contains(&graph.node_id(*n)))
            .collect();

        (value, source_side)
    }
}

/// Wall on even coordinate sums, rampart on odd.
pub fn checkerboard_type(location: Location) -> InstallationType {
    if (location.x() as u16 + location.y() as u16) % 2 == 0 {
        InstallationType::Wall
    } else {
        InstallationType::Rampart
    }
}

fn distance_to_boundary(location: Location) -> u32 {
    let x = location.x();
    let y = location.y();
    x.min(y).min(ROOM_WIDTH - 1 - x).min(ROOM_HEIGHT - 1 - y) as u32
}

/// Expand a set of locations by `radius` tiles (Chebyshev distance), keeping
/// only tiles accepted by `is_open`.
fn expand_region<F>(
    seeds: impl Iterator<Item = Location>,
    radius: u8,
    is_open: F,
    out: &mut FnvHashSet<Location>,
) where
    F: Fn(Location) -> bool,
{
    let r = radius as i32;
    for loc in seeds {
        for dy in -r..=r {
            for dx in -r..=r {
                if let Some(l) = Location::checked(loc.x() as i32 + dx, loc.y() as i32 + dy) {
                    if is_open(l) {
                        out.insert(l);
                    }
                }
            }
        }
    }
}

/// Checkerboard walls and ramparts over the cut. A wall with no
/// checkerboard rampart beside it on the cut becomes a rampart so the line
/// stays crossable for friendly units. Sorted row-major.
fn classify_cut(cut: &FnvHashSet<Location>) -> Vec<InstallationPlan> {
    let is_rampart = |l: Location| checkerboard_type(l) == InstallationType::Rampart;

    let mut fortifications: Vec<InstallationPlan> = cut
        .iter()
        .map(|&location| {
            let beside_rampart = NEIGHBORS_8
                .iter()
                .filter_map(|&(dx, dy)| location.offset(dx, dy))
                .any(|n| cut.contains(&n) && is_rampart(n));
            let installation_type = if is_rampart(location) || !beside_rampart {
                InstallationType::Rampart
            } else {
                InstallationType::Wall
            };
            InstallationPlan::new(location, installation_type)
        })
        .collect();

    fortifications.sort_by_key(|f| f.location);
    fortifications
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Walls on the whole border except `x_range` on the top edge.
    fn single_exit_terrain(x_range: std::ops::RangeInclusive<u32>) -> FastRoomTerrain {
        let mut terrain = FastRoomTerrain::plain();
        for i in 0..ROOM_WIDTH as u32 {
            for l in [
                Location::from_coords(i, 0),
                Location::from_coords(i, 49),
                Location::from_coords(0, i),
                Location::from_coords(49, i),
            ] {
                if !(l.y() == 0 && x_range.contains(&(l.x() as u32))) {
                    terrain.set(l, TerrainFlags::WALL);
                }
            }
        }
        terrain
    }

    #[test]
    fn checkerboard_alternates_between_neighbours() {
        let a = Location::from_coords(4, 4);
        let b = Location::from_coords(5, 4);
        assert_eq!(checkerboard_type(a), InstallationType::Wall);
        assert_eq!(checkerboard_type(b), InstallationType::Rampart);
    }

    #[test]
    fn adaptive_seals_single_exit() {
        let terrain = single_exit_terrain(20..=25);
        let options = PerimeterOptions {
            mode: PerimeterMode::Adaptive,
            ..Default::default()
        };
        let planner = ExitPerimeterPlanner::new(&terrain, options);
        let plan = planner.plan(Location::from_coords(25, 25));

        assert!(plan.sealed);
        assert!(!plan.fortifications.is_empty());
        assert!(plan.fortifications.iter().all(|f| !f.location.is_boundary()));
        assert!(plan.fortifications.iter().all(|f| f.location.y() <= 2));
        // Every third fortification is a rampart.
        for (i, f) in plan.fortifications.iter().enumerate() {
            let expected = if i % 3 == 2 {
                InstallationType::Rampart
            } else {
                InstallationType::Wall
            };
            assert_eq!(f.installation_type, expected);
        }
    }

    #[test]
    fn min_cut_seals_single_exit_away_from_exit() {
        let terrain = single_exit_terrain(20..=25);
        let options = PerimeterOptions {
            mode: PerimeterMode::MinCut,
            ..Default::default()
        };
        let planner = ExitPerimeterPlanner::new(&terrain, options);
        let plan = planner.plan(Location::from_coords(25, 25));

        assert!(plan.sealed);
        let exits = terrain.get_exits();
        assert!(plan
            .fortifications
            .iter()
            .all(|f| exits.iter().all(|e| e.distance_to(f.location) >= 2)));
        assert!(plan
            .fortifications
            .iter()
            .any(|f| f.installation_type == InstallationType::Rampart));
    }

    #[test]
    fn isolated_cut_walls_become_ramparts() {
        let a = Location::from_coords(10, 10);
        let b = Location::from_coords(11, 10);
        let lone = Location::from_coords(30, 30);
        let cut: FnvHashSet<Location> = [a, b, lone].into_iter().collect();

        let plan = classify_cut(&cut);
        let types: Vec<(Location, InstallationType)> =
            plan.iter().map(|f| (f.location, f.installation_type)).collect();
        assert_eq!(
            types,
            vec![
                (a, InstallationType::Wall),
                (b, InstallationType::Rampart),
                (lone, InstallationType::Rampart),
            ]
        );
    }

    #[test]
    fn obstacles_from_grid_count_as_walls() {
        let terrain = single_exit_terrain(20..=25);
        let mut grid = TileCostGrid::new();
        for x in 1..49 {
            grid.set(Location::from_coords(x, 5), IMPASSABLE_COST);
        }
        let options = PerimeterOptions {
            mode: PerimeterMode::Adaptive,
            ..Default::default()
        };
        let plan = ExitPerimeterPlanner::new(&terrain, options)
            .with_obstacles(&grid)
            .plan(Location::from_coords(25, 25));

        assert!(plan.sealed);
        assert!(plan.fortifications.is_empty());
    }
}
