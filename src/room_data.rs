use crate::installation::*;
use crate::location::*;
use crate::terrain::*;

/// Trait for providing site data to the planner.
/// Implementations exist for live use (in the caller's crate) and offline use
/// (`StaticSiteData`).
pub trait SiteDataSource {
    /// Terrain context, if the caller has one. Without it the planner falls
    /// back to a plain grid with an impassable border band.
    fn get_terrain(&self) -> Option<&FastRoomTerrain>;
    /// Locations the origin should stay reasonably close to.
    fn get_points_of_interest(&self) -> &[Location];
    /// Installations that are already built.
    fn get_existing_installations(&self) -> &[InstallationPlan];
}

/// Owned site data for offline planning and tests.
#[derive(Clone, Default)]
pub struct StaticSiteData {
    pub terrain: Option<FastRoomTerrain>,
    pub points_of_interest: Vec<Location>,
    pub existing: Vec<InstallationPlan>,
}

impl StaticSiteData {
    pub fn new(terrain: Option<FastRoomTerrain>) -> Self {
        StaticSiteData {
            terrain,
            ..Default::default()
        }
    }

    pub fn with_points_of_interest(mut self, points: Vec<Location>) -> Self {
        self.points_of_interest = points;
        self
    }

    pub fn with_existing(mut self, existing: Vec<InstallationPlan>) -> Self {
        self.existing = existing;
        self
    }
}

impl SiteDataSource for StaticSiteData {
    fn get_terrain(&self) -> Option<&FastRoomTerrain> {
        self.terrain.as_ref()
    }

    fn get_points_of_interest(&self) -> &[Location] {
        &self.points_of_interest
    }

    fn get_existing_installations(&self) -> &[InstallationPlan] {
        &self.existing
    }
}
