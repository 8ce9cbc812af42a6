//! Installation types, committed decisions and the demand list.

use crate::location::*;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Build priority for construction ordering.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Ord, PartialOrd, Serialize, Deserialize)]
pub enum BuildPriority {
    VeryLow = 0,
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

/// Every kind of single-tile installation the planner can place.
///
/// Each variant carries its own minimum separation, build priority and
/// traversal class, so there is no separate lookup table to keep in sync.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Ord, PartialOrd, Serialize, Deserialize)]
pub enum InstallationType {
    Spawn,
    Storage,
    Terminal,
    Tower,
    Factory,
    PowerSpawn,
    Nuker,
    Lab,
    Observer,
    Extension,
    Link,
    Container,
    Road,
    Wall,
    Rampart,
}

impl InstallationType {
    pub const ALL: [InstallationType; 15] = [
        InstallationType::Spawn,
        InstallationType::Storage,
        InstallationType::Terminal,
        InstallationType::Tower,
        InstallationType::Factory,
        InstallationType::PowerSpawn,
        InstallationType::Nuker,
        InstallationType::Lab,
        InstallationType::Observer,
        InstallationType::Extension,
        InstallationType::Link,
        InstallationType::Container,
        InstallationType::Road,
        InstallationType::Wall,
        InstallationType::Rampart,
    ];

    /// Minimum Chebyshev distance a new installation of this type keeps from
    /// every existing goal.
    pub fn min_separation(self) -> u8 {
        match self {
            InstallationType::Spawn
            | InstallationType::Storage
            | InstallationType::Terminal
            | InstallationType::Tower
            | InstallationType::Factory
            | InstallationType::PowerSpawn
            | InstallationType::Nuker
            | InstallationType::Lab => 2,
            _ => 1,
        }
    }

    pub fn priority(self) -> BuildPriority {
        match self {
            InstallationType::Spawn => BuildPriority::Critical,
            InstallationType::Storage | InstallationType::Tower | InstallationType::Extension => {
                BuildPriority::High
            }
            InstallationType::Terminal
            | InstallationType::Link
            | InstallationType::Container
            | InstallationType::Road => BuildPriority::Medium,
            InstallationType::Lab
            | InstallationType::Factory
            | InstallationType::Rampart
            | InstallationType::Wall => BuildPriority::Low,
            InstallationType::PowerSpawn | InstallationType::Nuker | InstallationType::Observer => {
                BuildPriority::VeryLow
            }
        }
    }

    /// Whether the installation blocks movement once built.
    pub fn is_obstacle(self) -> bool {
        !matches!(
            self,
            InstallationType::Road | InstallationType::Container | InstallationType::Rampart
        )
    }

    pub fn is_road(self) -> bool {
        self == InstallationType::Road
    }
}

/// A committed placement decision.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct InstallationPlan {
    #[serde(rename = "l")]
    pub location: Location,
    #[serde(rename = "t")]
    pub installation_type: InstallationType,
}

impl InstallationPlan {
    pub fn new(location: Location, installation_type: InstallationType) -> Self {
        InstallationPlan {
            location,
            installation_type,
        }
    }
}

/// Run-length encoded, ordered list of requested installations.
///
/// Persisted as a plain list of `(count, type)` pairs; loading goes through
/// `push`, so zero counts never reach the queue.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "Vec<(u32, InstallationType)>",
    into = "Vec<(u32, InstallationType)>"
)]
pub struct DemandList {
    entries: VecDeque<(u32, InstallationType)>,
}

impl DemandList {
    pub fn new() -> Self {
        DemandList::default()
    }

    pub fn push(&mut self, count: u32, installation_type: InstallationType) {
        if count > 0 {
            self.entries.push_back((count, installation_type));
        }
    }

    /// Next installation type to place, consuming one unit of demand.
    pub fn pop_next(&mut self) -> Option<InstallationType> {
        while let Some((count, installation_type)) = self.entries.front_mut() {
            let result = *installation_type;
            match count.checked_sub(1) {
                Some(left) => {
                    *count = left;
                    if left == 0 {
                        self.entries.pop_front();
                    }
                    return Some(result);
                }
                None => {
                    self.entries.pop_front();
                }
            }
        }
        None
    }

    pub fn peek(&self) -> Option<InstallationType> {
        self.entries
            .iter()
            .find(|(count, _)| *count > 0)
            .map(|(_, t)| *t)
    }

    /// Total number of installations still requested.
    pub fn remaining(&self) -> u32 {
        self.entries.iter().map(|(count, _)| *count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}

impl From<Vec<(u32, InstallationType)>> for DemandList {
    fn from(entries: Vec<(u32, InstallationType)>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<DemandList> for Vec<(u32, InstallationType)> {
    fn from(list: DemandList) -> Self {
        list.entries.into_iter().collect()
    }
}

impl FromIterator<(u32, InstallationType)> for DemandList {
    fn from_iter<I: IntoIterator<Item = (u32, InstallationType)>>(iter: I) -> Self {
        let mut list = DemandList::new();
        for (count, installation_type) in iter {
            list.push(count, installation_type);
        }
        list
    }
}

#[cfg(feature = "screeps")]
impl From<InstallationType> for screeps::StructureType {
    fn from(installation: InstallationType) -> Self {
        use screeps::StructureType;
        match installation {
            InstallationType::Spawn => StructureType::Spawn,
            InstallationType::Storage => StructureType::Storage,
            InstallationType::Terminal => StructureType::Terminal,
            InstallationType::Tower => StructureType::Tower,
            InstallationType::Factory => StructureType::Factory,
            InstallationType::PowerSpawn => StructureType::PowerSpawn,
            InstallationType::Nuker => StructureType::Nuker,
            InstallationType::Lab => StructureType::Lab,
            InstallationType::Observer => StructureType::Observer,
            InstallationType::Extension => StructureType::Extension,
            InstallationType::Link => StructureType::Link,
            InstallationType::Container => StructureType::Container,
            InstallationType::Road => StructureType::Road,
            InstallationType::Wall => StructureType::Wall,
            InstallationType::Rampart => StructureType::Rampart,
        }
    }
}
