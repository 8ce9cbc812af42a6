//! Incremental placement engine.
//!
//! The engine owns one `GoalSet` and one `TileCostGrid` for the lifetime of a
//! planning run. Each demand item runs a repulsion search against the goal
//! set widened for that item's type, commits the terminal tile, backfills the
//! path as road and adds a fixed diagonal road pattern around the new
//! installation. Every committed decision is final: a later failure never
//! rolls anything back, so the output is valid at every checkpoint.

use crate::budget::*;
use crate::config::*;
use crate::constants::*;
use crate::cost_grid::*;
use crate::error::*;
use crate::goals::*;
use crate::installation::*;
use crate::location::*;
use crate::search::*;
use crate::terrain::*;
use crate::visual::*;
use fnv::FnvHashMap;
use log::*;
use serde::{Deserialize, Serialize};

/// Everything a planning run hands back to the job queue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementOutput {
    pub origin: Location,
    /// Decisions in commit order.
    pub decisions: Vec<InstallationPlan>,
    /// Why the run halted early, if it did.
    pub failure: Option<PlacementFailure>,
}

impl PlacementOutput {
    /// Render every decision using a visualizer.
    pub fn visualize<V: RoomVisualizer>(&self, visualizer: &mut V) {
        for decision in &self.decisions {
            visualizer.render(decision.location, decision.installation_type);
        }
    }

    /// Decisions of one type, in commit order.
    pub fn of_type(&self, installation_type: InstallationType) -> Vec<Location> {
        self.decisions
            .iter()
            .filter(|d| d.installation_type == installation_type)
            .map(|d| d.location)
            .collect()
    }
}

/// Outcome of processing a single demand item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepResult {
    Placed(InstallationPlan),
    /// The search landed on a tile that cannot hold an installation; the item
    /// was consumed without a placement.
    Skipped(InstallationType),
    Failed(PlacementFailure),
    /// Nothing left to place.
    Exhausted,
    /// A previous item failed and the run is over.
    Halted,
}

/// Diagonal offsets that become road around a terminal: NW and SE when the
/// coordinate sum is even, NE and SW when it is odd.
pub fn splash_offsets(terminal: Location) -> [(i8, i8); 2] {
    if (terminal.x() as u16 + terminal.y() as u16) % 2 == 0 {
        [DIAGONALS[0], DIAGONALS[2]]
    } else {
        [DIAGONALS[1], DIAGONALS[3]]
    }
}

pub struct PlacementEngine<'a> {
    config: PlannerConfig,
    terrain: Option<&'a FastRoomTerrain>,
    origin: Location,
    goals: GoalSet,
    grid: TileCostGrid,
    occupied: FnvHashMap<Location, InstallationType>,
    demand: DemandList,
    decisions: Vec<InstallationPlan>,
    last_placement: Option<Location>,
    failure: Option<PlacementFailure>,
    seeded: bool,
}

impl<'a> PlacementEngine<'a> {
    /// Create an engine for one planning run.
    ///
    /// `existing` is a snapshot of installations already built; they are
    /// respected as goals and obstacles but are not part of the output.
    pub fn new(
        origin: Option<Location>,
        terrain: Option<&'a FastRoomTerrain>,
        existing: &[InstallationPlan],
        demand: DemandList,
        config: PlannerConfig,
    ) -> Result<Self, PlannerError> {
        let origin = origin.ok_or(PlannerError::OriginMissing)?;

        let grid = match terrain {
            Some(terrain) => TileCostGrid::from_terrain(terrain),
            None => {
                let mut grid = TileCostGrid::new();
                grid.set_border_unwalkable(config.border_margin);
                grid
            }
        };

        let mut goals = GoalSet::new();
        goals.push(GoalEntry::new(origin, config.effective_min_range(), None));

        let mut engine = PlacementEngine {
            config,
            terrain,
            origin,
            goals,
            grid,
            occupied: FnvHashMap::default(),
            demand,
            decisions: Vec::new(),
            last_placement: None,
            failure: None,
            seeded: !config.seed_road,
        };

        for plan in existing {
            if engine.occupied.contains_key(&plan.location) {
                trace!(
                    "Snapshot has two installations at ({}, {}), keeping the first",
                    plan.location.x(),
                    plan.location.y()
                );
                continue;
            }
            engine.mark(plan);
            if plan.installation_type.is_road() {
                engine.seeded = true;
            }
        }

        Ok(engine)
    }

    pub fn origin(&self) -> Location {
        self.origin
    }

    /// Decisions committed so far. Valid output at any point of the run.
    pub fn decisions(&self) -> &[InstallationPlan] {
        &self.decisions
    }

    pub fn goals(&self) -> &GoalSet {
        &self.goals
    }

    pub fn cost_grid(&self) -> &TileCostGrid {
        &self.grid
    }

    pub fn remaining_demand(&self) -> &DemandList {
        &self.demand
    }

    pub fn failure(&self) -> Option<PlacementFailure> {
        self.failure
    }

    pub fn is_finished(&self) -> bool {
        self.failure.is_some() || self.demand.is_empty()
    }

    /// Process demand items until the list is exhausted, an item fails, or
    /// the budget runs out.
    pub fn run(&mut self, budget: &CpuBudget) -> PhaseResult<Option<PlacementFailure>> {
        loop {
            match self.step() {
                StepResult::Exhausted | StepResult::Halted | StepResult::Failed(_) => {
                    info!(
                        "Placement run finished with {} decisions, failure: {:?}",
                        self.decisions.len(),
                        self.failure
                    );
                    return PhaseResult::Complete(self.failure);
                }
                StepResult::Placed(_) | StepResult::Skipped(_) => {}
            }

            if !budget.has_budget() {
                debug!(
                    "Placement run paused with {} items remaining",
                    self.demand.remaining()
                );
                return PhaseResult::Running;
            }
        }
    }

    /// Run without a budget and return the output.
    pub fn run_to_completion(mut self) -> PlacementOutput {
        let _ = self.run(&CpuBudget::unlimited());
        self.into_output()
    }

    pub fn into_output(self) -> PlacementOutput {
        PlacementOutput {
            origin: self.origin,
            decisions: self.decisions,
            failure: self.failure,
        }
    }

    /// Output plus the final goal set and cost grid.
    pub fn into_parts(self) -> (PlacementOutput, GoalSet, TileCostGrid) {
        let output = PlacementOutput {
            origin: self.origin,
            decisions: self.decisions,
            failure: self.failure,
        };
        (output, self.goals, self.grid)
    }

    /// Place the next demand item.
    pub fn step(&mut self) -> StepResult {
        if self.failure.is_some() {
            return StepResult::Halted;
        }

        if !self.seeded {
            self.seeded = true;
            self.lay_seed_road();
        }

        let installation_type = match self.demand.pop_next() {
            Some(t) => t,
            None => return StepResult::Exhausted,
        };

        let goals = self.goals.inflated_for(
            installation_type,
            self.config.effective_min_range(),
            self.config.effective_max_range(),
        );
        let start = match self.config.anchor {
            SearchAnchor::Origin => self.origin,
            SearchAnchor::LastPlacement => self.last_placement.unwrap_or(self.origin),
        };

        let max_ops = self.config.search.max_ops;
        let outcome =
            RepulsionPathSearch::new(&self.grid, self.terrain, self.config.search).search(start, &goals);

        let terminal = match outcome.terminal() {
            Some(terminal) if !outcome.is_failure(max_ops) => terminal,
            _ => {
                let failure = if outcome.ops >= max_ops {
                    PlacementFailure::SearchExhausted {
                        installation_type,
                        ops: outcome.ops,
                    }
                } else {
                    PlacementFailure::SearchIncomplete { installation_type }
                };
                warn!("Placement halted: {}", failure);
                self.failure = Some(failure);
                return StepResult::Failed(failure);
            }
        };

        if self.grid.is_impassable(terminal) || self.occupied.contains_key(&terminal) {
            trace!(
                "Ignoring {:?} on unusable tile ({}, {})",
                installation_type,
                terminal.x(),
                terminal.y()
            );
            return StepResult::Skipped(installation_type);
        }

        let plan = InstallationPlan::new(terminal, installation_type);
        self.commit(plan);
        self.backfill_road(&outcome.path);
        if self.config.splash {
            self.splash_roads(terminal);
        }
        if !installation_type.is_road() {
            self.last_placement = Some(terminal);
        }

        debug!(
            "Placed {:?} at ({}, {}) after {} ops",
            installation_type,
            terminal.x(),
            terminal.y(),
            outcome.ops
        );

        StepResult::Placed(plan)
    }

    /// Flee once from the origin with a wide range and pave the whole path.
    fn lay_seed_road(&mut self) {
        let range = self
            .config
            .seed_range
            .clamp(self.config.effective_min_range(), self.config.effective_max_range());
        let goals: GoalSet = [GoalEntry::new(self.origin, range, None)].into_iter().collect();

        let outcome = RepulsionPathSearch::new(&self.grid, self.terrain, self.config.search)
            .search(self.origin, &goals);
        if outcome.is_failure(self.config.search.max_ops) {
            debug!("Seed road search failed after {} ops, skipping", outcome.ops);
            return;
        }

        for location in outcome.path {
            self.place_road(location);
        }
    }

    /// Record an installation in the goal set, the grid and the occupancy map.
    fn mark(&mut self, plan: &InstallationPlan) {
        self.goals.push(GoalEntry::for_installation(plan));
        if plan.installation_type.is_road() {
            self.grid.set(plan.location, ROAD_COST);
        } else if plan.installation_type.is_obstacle() {
            self.grid.set(plan.location, IMPASSABLE_COST);
        }
        self.occupied.insert(plan.location, plan.installation_type);
    }

    fn commit(&mut self, plan: InstallationPlan) {
        self.mark(&plan);
        self.decisions.push(plan);
    }

    /// Pave `location` unless it is blocked, already used, or the origin.
    fn place_road(&mut self, location: Location) -> bool {
        if location == self.origin
            || self.grid.is_impassable(location)
            || self.occupied.contains_key(&location)
        {
            return false;
        }
        self.commit(InstallationPlan::new(location, InstallationType::Road));
        true
    }

    /// Walk the path backwards from the tile before the terminal, paving
    /// until the first tile that is already road.
    fn backfill_road(&mut self, path: &[Location]) {
        let Some((_terminal, rest)) = path.split_last() else {
            return;
        };
        for &location in rest.iter().rev() {
            if self.grid.is_road(location) {
                break;
            }
            self.place_road(location);
        }
    }

    fn splash_roads(&mut self, terminal: Location) {
        for (dx, dy) in splash_offsets(terminal) {
            if let Some(location) = terminal.offset(dx, dy) {
                self.place_road(location);
            }
        }
    }
}
