//! Goal entries shared by the repulsion search and the placement engine.

use crate::installation::*;
use crate::location::*;
use serde::{Deserialize, Serialize};

/// A position future placements must stay `range` tiles away from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalEntry {
    pub location: Location,
    pub range: u8,
    pub installation_type: Option<InstallationType>,
}

impl GoalEntry {
    pub fn new(location: Location, range: u8, installation_type: Option<InstallationType>) -> Self {
        GoalEntry {
            location,
            range,
            installation_type,
        }
    }

    /// Goal for a committed installation, using the type's own separation.
    pub fn for_installation(plan: &InstallationPlan) -> Self {
        GoalEntry::new(
            plan.location,
            plan.installation_type.min_separation(),
            Some(plan.installation_type),
        )
    }
}

/// Ordered collection of goals. Order is insertion order and is never
/// rearranged, which keeps search results reproducible.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalSet {
    entries: Vec<GoalEntry>,
}

impl GoalSet {
    pub fn new() -> Self {
        GoalSet::default()
    }

    pub fn push(&mut self, entry: GoalEntry) {
        self.entries.push(entry);
    }

    pub fn iter(&self) -> impl Iterator<Item = &GoalEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of the set with every range widened to respect the separation of
    /// `installation_type`, then clamped to `[min_range, max_range]`.
    pub fn inflated_for(
        &self,
        installation_type: InstallationType,
        min_range: u8,
        max_range: u8,
    ) -> GoalSet {
        let required = installation_type.min_separation();
        let upper = max_range.max(min_range);
        GoalSet {
            entries: self
                .entries
                .iter()
                .map(|entry| GoalEntry {
                    range: entry.range.max(required).clamp(min_range, upper),
                    ..*entry
                })
                .collect(),
        }
    }

    /// How many more tiles `location` has to move to clear the closest goal.
    /// Zero once the location is out of range of every goal.
    pub fn shortfall(&self, location: Location) -> u8 {
        self.entries
            .iter()
            .map(|entry| entry.range.saturating_sub(location.distance_to(entry.location)))
            .max()
            .unwrap_or(0)
    }

    pub fn satisfied_by(&self, location: Location) -> bool {
        self.shortfall(location) == 0
    }
}

impl FromIterator<GoalEntry> for GoalSet {
    fn from_iter<I: IntoIterator<Item = GoalEntry>>(iter: I) -> Self {
        GoalSet {
            entries: iter.into_iter().collect(),
        }
    }
}
