//! Tunables for the planner. Every struct deserializes with defaults for
//! missing fields so persisted configs survive new options.

use crate::constants::*;
use serde::{Deserialize, Serialize};

/// Parameters of one repulsion search.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Multiplier on the heuristic; larger is greedier and faster.
    pub heuristic_weight: f32,
    pub plain_cost: u32,
    pub swamp_cost: u32,
    /// Nodes expanded before the search gives up.
    pub max_ops: u32,
    /// Paths costing more than this are never extended.
    pub max_cost: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            heuristic_weight: DEFAULT_HEURISTIC_WEIGHT,
            plain_cost: DEFAULT_PLAIN_COST,
            swamp_cost: DEFAULT_SWAMP_COST,
            max_ops: DEFAULT_MAX_OPS,
            max_cost: MAX_PATH_COST,
        }
    }
}

/// Where each placement search starts from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchAnchor {
    Origin,
    /// Start from the most recent non-road placement, falling back to the
    /// origin before anything has been placed.
    LastPlacement,
}

/// How the origin is chosen when the caller has none cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OriginStrategy {
    DistanceTransform,
    /// Centre of the open square of the given size nearest the grid centre.
    Clearance { footprint: u8 },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginSelection {
    pub strategy: OriginStrategy,
    /// Minimum Chebyshev distance from every point of interest.
    pub min_poi_distance: u8,
    /// Tiles with less clearance are never chosen.
    pub min_clearance: u8,
    /// Clearance above this counts the same when scoring.
    pub clearance_cap: u8,
}

impl Default for OriginSelection {
    fn default() -> Self {
        OriginSelection {
            strategy: OriginStrategy::DistanceTransform,
            min_poi_distance: 3,
            min_clearance: 2,
            clearance_cap: 6,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerimeterMode {
    Static,
    Adaptive,
    MinCut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerimeterOptions {
    pub mode: PerimeterMode,
    /// Steps back from the exit at which the adaptive mode fortifies.
    pub setback: u8,
    /// Upper bound on adaptive iterations.
    pub max_iterations: u32,
    /// Radius of the square around the origin the min-cut must enclose.
    pub protect_radius: u8,
}

impl Default for PerimeterOptions {
    fn default() -> Self {
        PerimeterOptions {
            mode: PerimeterMode::Static,
            setback: PERIMETER_RANGE,
            max_iterations: 200,
            protect_radius: 8,
        }
    }
}

/// Top-level planner configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub min_range: u8,
    pub max_range: u8,
    /// Impassable band applied when no terrain is available.
    pub border_margin: u8,
    /// Lay an anchoring road from the origin before placing anything.
    pub seed_road: bool,
    pub seed_range: u8,
    /// Add diagonal road tiles around every committed installation.
    pub splash: bool,
    pub anchor: SearchAnchor,
    pub search: SearchOptions,
    pub origin: OriginSelection,
    pub perimeter: PerimeterOptions,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            min_range: GLOBAL_MIN_RANGE,
            max_range: GLOBAL_MAX_RANGE,
            border_margin: DEFAULT_BORDER_MARGIN,
            seed_road: true,
            seed_range: SEED_RANGE,
            splash: true,
            anchor: SearchAnchor::Origin,
            search: SearchOptions::default(),
            origin: OriginSelection::default(),
            perimeter: PerimeterOptions::default(),
        }
    }
}

impl PlannerConfig {
    /// Lower range bound actually used. A range of zero would let two
    /// installations share a tile, so it is never below one.
    pub fn effective_min_range(&self) -> u8 {
        self.min_range.max(1)
    }

    pub fn effective_max_range(&self) -> u8 {
        self.max_range.max(self.effective_min_range())
    }
}
