//! Entry points tying origin selection, the placement engine and the
//! perimeter planner to a `SiteDataSource`.

use crate::clearance::*;
use crate::config::*;
use crate::cost_grid::*;
use crate::distance_transform::*;
use crate::engine::*;
use crate::error::*;
use crate::exit_perimeter::*;
use crate::installation::*;
use crate::location::*;
use crate::room_data::*;
use log::*;

pub struct SitePlanner {
    config: PlannerConfig,
}

impl Default for SitePlanner {
    fn default() -> Self {
        SitePlanner::new(PlannerConfig::default())
    }
}

impl SitePlanner {
    pub fn new(config: PlannerConfig) -> Self {
        SitePlanner { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Cost grid of the site before any new placement: terrain (or the border
    /// band when there is none) plus every existing obstacle.
    fn base_grid(&self, data: &dyn SiteDataSource) -> TileCostGrid {
        let mut grid = match data.get_terrain() {
            Some(terrain) => TileCostGrid::from_terrain(terrain),
            None => {
                let mut grid = TileCostGrid::new();
                grid.set_border_unwalkable(self.config.border_margin);
                grid
            }
        };
        for plan in data.get_existing_installations() {
            if plan.installation_type.is_obstacle() {
                grid.set(plan.location, crate::constants::IMPASSABLE_COST);
            }
        }
        grid
    }

    /// Pick an origin with the configured strategy. The result is meant to
    /// be cached by the caller and passed back to [`plan`](Self::plan).
    pub fn select_origin(&self, data: &dyn SiteDataSource) -> Option<Location> {
        let grid = self.base_grid(data);
        let terrain = data.get_terrain();
        let points = data.get_points_of_interest();

        let origin = match self.config.origin.strategy {
            OriginStrategy::DistanceTransform => DistanceTransformAnalyzer::from_cost_grid(&grid, terrain)
                .select_site(points, &self.config.origin),
            OriginStrategy::Clearance { footprint } => {
                let near = centroid(points).unwrap_or_else(|| Location::from_coords(25, 25));
                ClearanceScanner::from_cost_grid(&grid, terrain)
                    .find_site(footprint, near)
                    .map(|corner| ClearanceScanner::centre_of(corner, footprint))
            }
        };

        if let Some(origin) = origin {
            info!("Selected origin ({}, {})", origin.x(), origin.y());
        }

        origin
    }

    /// Engine for one run. A cached origin wins; otherwise one is selected.
    pub fn engine<'a>(
        &self,
        data: &'a dyn SiteDataSource,
        cached_origin: Option<Location>,
        demand: DemandList,
    ) -> Result<PlacementEngine<'a>, PlannerError> {
        let origin = cached_origin.or_else(|| self.select_origin(data));
        PlacementEngine::new(
            origin,
            data.get_terrain(),
            data.get_existing_installations(),
            demand,
            self.config,
        )
    }

    /// Place the whole demand list in one go.
    pub fn plan(
        &self,
        data: &dyn SiteDataSource,
        cached_origin: Option<Location>,
        demand: DemandList,
    ) -> Result<PlacementOutput, PlannerError> {
        Ok(self.engine(data, cached_origin, demand)?.run_to_completion())
    }

    /// Fortify the exits. Needs terrain to know where the exits are.
    pub fn plan_perimeter(&self, data: &dyn SiteDataSource, origin: Location) -> Option<PerimeterPlan> {
        let terrain = data.get_terrain()?;
        let grid = self.base_grid(data);
        Some(
            ExitPerimeterPlanner::new(terrain, self.config.perimeter)
                .with_obstacles(&grid)
                .plan(origin),
        )
    }
}

fn centroid(points: &[Location]) -> Option<Location> {
    if points.is_empty() {
        return None;
    }
    let (sx, sy) = points
        .iter()
        .fold((0u32, 0u32), |(sx, sy), p| (sx + p.x() as u32, sy + p.y() as u32));
    let n = points.len() as u32;
    Some(Location::from_coords(sx / n, sy / n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::*;

    #[test]
    fn clearance_strategy_centres_footprint() {
        let config = PlannerConfig {
            origin: OriginSelection {
                strategy: OriginStrategy::Clearance { footprint: 7 },
                ..Default::default()
            },
            ..Default::default()
        };
        let data = StaticSiteData::new(Some(FastRoomTerrain::plain()))
            .with_points_of_interest(vec![Location::from_coords(10, 10), Location::from_coords(20, 30)]);

        let origin = SitePlanner::new(config).select_origin(&data);
        assert_eq!(origin, Some(Location::from_coords(15, 20)));
    }

    #[test]
    fn cached_origin_wins() {
        let data = StaticSiteData::new(None);
        let cached = Location::from_coords(12, 30);
        let engine = SitePlanner::default()
            .engine(&data, Some(cached), DemandList::new())
            .unwrap();
        assert_eq!(engine.origin(), cached);
    }

    #[test]
    fn no_origin_available_is_an_error() {
        let mut terrain = FastRoomTerrain::plain();
        for (x, y) in itertools::iproduct!(0..50u32, 0..50u32) {
            terrain.set(Location::from_coords(x, y), TerrainFlags::WALL);
        }
        let data = StaticSiteData::new(Some(terrain));
        let result = SitePlanner::default().plan(&data, None, DemandList::new());
        assert!(matches!(result, Err(PlannerError::OriginMissing)));
    }

    #[test]
    fn perimeter_needs_terrain() {
        let data = StaticSiteData::new(None);
        assert!(SitePlanner::default()
            .plan_perimeter(&data, Location::from_coords(25, 25))
            .is_none());
    }
}
