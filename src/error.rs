use crate::installation::InstallationType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced to the caller of the planner.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlannerError {
    #[error("placement requested without an origin")]
    OriginMissing,
    #[error("coordinate ({x}, {y}) is outside the grid")]
    OutOfBounds { x: i32, y: i32 },
}

/// Why a single demand item could not be placed.
///
/// A failure drops the item and halts the run; it is recorded on the output
/// so the scheduler can retry on a later cycle.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementFailure {
    #[error("search for {installation_type:?} exhausted its budget after {ops} ops")]
    SearchExhausted {
        installation_type: InstallationType,
        ops: u32,
    },
    #[error("search for {installation_type:?} found no site")]
    SearchIncomplete { installation_type: InstallationType },
}
