use rstest::rstest;
use site_foreman::distance_transform::DistanceTransformAnalyzer;
use site_foreman::terrain::{FastRoomTerrain, TerrainFlags};
use site_foreman::*;

fn centre() -> Location {
    Location::from_coords(25, 25)
}

fn demand(items: &[(u32, InstallationType)]) -> DemandList {
    items.iter().copied().collect()
}

fn plan_open(origin: Location, items: &[(u32, InstallationType)], config: PlannerConfig) -> PlacementOutput {
    let data = StaticSiteData::new(None);
    SitePlanner::new(config)
        .plan(&data, Some(origin), demand(items))
        .unwrap()
}

#[derive(Default)]
struct RecordingVisualizer {
    rendered: Vec<(Location, InstallationType)>,
}

impl RoomVisualizer for RecordingVisualizer {
    fn render(&mut self, location: Location, installation: InstallationType) {
        self.rendered.push((location, installation));
    }
}

#[test]
fn single_core_lands_near_origin() {
    let output = plan_open(centre(), &[(1, InstallationType::Spawn)], PlannerConfig::default());

    assert!(output.failure.is_none());
    let spawns = output.of_type(InstallationType::Spawn);
    assert_eq!(spawns.len(), 1);
    assert!(spawns[0].distance_to(centre()) >= 2);
    assert!(spawns[0].distance_to(centre()) <= 5);
    assert!(output
        .decisions
        .iter()
        .all(|d| d.installation_type == InstallationType::Spawn || d.installation_type.is_road()));
    assert!(output.decisions.iter().all(|d| d.location != centre()));
}

#[test]
fn new_core_keeps_distance_from_existing_core() {
    let data = StaticSiteData::new(None)
        .with_existing(vec![InstallationPlan::new(centre(), InstallationType::Spawn)]);
    let output = SitePlanner::default()
        .plan(&data, Some(centre()), demand(&[(1, InstallationType::Spawn)]))
        .unwrap();

    let spawns = output.of_type(InstallationType::Spawn);
    assert_eq!(spawns.len(), 1);
    assert!(spawns[0].distance_to(centre()) >= 2);
}

#[test]
fn minor_installation_inherits_core_separation() {
    let core = Location::from_coords(27, 25);
    let data = StaticSiteData::new(None)
        .with_existing(vec![InstallationPlan::new(core, InstallationType::Storage)]);
    let output = SitePlanner::default()
        .plan(&data, Some(centre()), demand(&[(4, InstallationType::Extension)]))
        .unwrap();

    let extensions = output.of_type(InstallationType::Extension);
    assert_eq!(extensions.len(), 4);
    assert!(extensions.iter().all(|e| e.distance_to(core) >= 2));
}

#[test]
fn impassable_row_is_never_crossed() {
    let mut terrain = FastRoomTerrain::plain();
    for x in 0..50 {
        terrain.set(Location::from_coords(x, 30), TerrainFlags::WALL);
    }
    let data = StaticSiteData::new(Some(terrain));
    let output = SitePlanner::default()
        .plan(
            &data,
            Some(Location::from_coords(25, 10)),
            demand(&[(6, InstallationType::Extension)]),
        )
        .unwrap();

    assert!(!output.decisions.is_empty());
    assert!(output.decisions.iter().all(|d| d.location.y() < 30));
}

#[test]
fn placements_respect_type_separation() {
    let origin = centre();
    let output = plan_open(
        origin,
        &[
            (3, InstallationType::Spawn),
            (6, InstallationType::Extension),
            (2, InstallationType::Tower),
            (1, InstallationType::Storage),
        ],
        PlannerConfig::default(),
    );
    assert!(output.failure.is_none());

    for (i, decision) in output.decisions.iter().enumerate() {
        assert!(output.decisions[..i].iter().all(|d| d.location != decision.location));

        let own = decision.installation_type.min_separation();
        if decision.installation_type.is_road() {
            continue;
        }
        assert!(decision.location.distance_to(origin) >= own);
        for earlier in &output.decisions[..i] {
            let required = own.max(earlier.installation_type.min_separation());
            assert!(
                earlier.location.distance_to(decision.location) >= required,
                "{:?} at {:?} too close to {:?}",
                decision.installation_type,
                decision.location,
                earlier
            );
        }
    }
}

#[test]
fn identical_inputs_give_identical_output() {
    let items = [(2, InstallationType::Spawn), (5, InstallationType::Extension)];
    let first = serde_json::to_string(&plan_open(centre(), &items, PlannerConfig::default())).unwrap();
    let second = serde_json::to_string(&plan_open(centre(), &items, PlannerConfig::default())).unwrap();
    assert_eq!(first, second);

    let restored: PlacementOutput = serde_json::from_str(&first).unwrap();
    assert_eq!(serde_json::to_string(&restored).unwrap(), first);
}

#[rstest]
#[case(Location::from_coords(3, 3))]
#[case(Location::from_coords(46, 25))]
#[case(Location::from_coords(25, 47))]
fn border_band_is_never_used_without_terrain(#[case] origin: Location) {
    let output = plan_open(
        origin,
        &[(4, InstallationType::Extension), (1, InstallationType::Spawn)],
        PlannerConfig::default(),
    );
    assert!(output.decisions.iter().all(|d| d.location.is_inside_margin(1)));
}

#[test]
fn seed_road_runs_out_to_seed_range() {
    let output = plan_open(centre(), &[], PlannerConfig::default());

    assert!(!output.decisions.is_empty());
    assert!(output.decisions.iter().all(|d| d.installation_type.is_road()));
    let furthest = output
        .decisions
        .iter()
        .map(|d| d.location.distance_to(centre()))
        .max();
    assert_eq!(furthest, Some(4));
}

#[test]
fn snapshot_road_suppresses_seed_road() {
    let data = StaticSiteData::new(None).with_existing(vec![InstallationPlan::new(
        Location::from_coords(26, 25),
        InstallationType::Road,
    )]);
    let output = SitePlanner::default()
        .plan(&data, Some(centre()), DemandList::new())
        .unwrap();

    assert!(output.decisions.is_empty());
    assert!(output.failure.is_none());
}

#[test]
fn enclosed_origin_halts_and_keeps_prior_commits() {
    let origin = centre();
    let mut terrain = FastRoomTerrain::plain();
    for (dx, dy) in itertools::iproduct!(-3i8..=3, -3i8..=3) {
        if dx.abs() == 3 || dy.abs() == 3 {
            if let Some(l) = origin.offset(dx, dy) {
                terrain.set(l, TerrainFlags::WALL);
            }
        }
    }
    let data = StaticSiteData::new(Some(terrain));
    let output = SitePlanner::default()
        .plan(&data, Some(origin), demand(&[(10, InstallationType::Spawn)]))
        .unwrap();

    let spawns = output.of_type(InstallationType::Spawn);
    assert!(!spawns.is_empty());
    assert!(spawns.len() < 10);
    assert_eq!(
        output.failure,
        Some(PlacementFailure::SearchIncomplete {
            installation_type: InstallationType::Spawn
        })
    );
    assert!(output.decisions.iter().all(|d| d.location.distance_to(origin) <= 2));
}

#[test]
fn last_placement_anchor_places_everything() {
    let config = PlannerConfig {
        anchor: SearchAnchor::LastPlacement,
        ..Default::default()
    };
    let output = plan_open(centre(), &[(5, InstallationType::Extension)], config);

    assert!(output.failure.is_none());
    assert_eq!(output.of_type(InstallationType::Extension).len(), 5);
}

#[test]
fn checkpointed_run_matches_single_run() {
    let items = [(2, InstallationType::Spawn), (4, InstallationType::Extension)];
    let data = StaticSiteData::new(None);
    let planner = SitePlanner::default();

    let mut engine = planner.engine(&data, Some(centre()), demand(&items)).unwrap();
    let mut pauses = 0;
    while !engine.run(&CpuBudget::new(|| false)).is_complete() {
        pauses += 1;
    }
    assert!(pauses > 0);

    let whole = planner.plan(&data, Some(centre()), demand(&items)).unwrap();
    assert_eq!(engine.into_output(), whole);
}

#[test]
fn visualizer_sees_every_decision_in_order() {
    let output = plan_open(centre(), &[(3, InstallationType::Extension)], PlannerConfig::default());
    let mut visualizer = RecordingVisualizer::default();
    output.visualize(&mut visualizer);

    let expected: Vec<(Location, InstallationType)> = output
        .decisions
        .iter()
        .map(|d| (d.location, d.installation_type))
        .collect();
    assert_eq!(visualizer.rendered, expected);
}

#[test]
fn selected_origin_is_used_when_none_is_cached() {
    let data = StaticSiteData::new(Some(FastRoomTerrain::plain()))
        .with_points_of_interest(vec![Location::from_coords(10, 10), Location::from_coords(40, 12)]);
    let planner = SitePlanner::default();

    let selected = planner.select_origin(&data).unwrap();
    let output = planner
        .plan(&data, None, demand(&[(1, InstallationType::Spawn)]))
        .unwrap();
    assert_eq!(output.origin, selected);
    assert!([Location::from_coords(10, 10), Location::from_coords(40, 12)]
        .iter()
        .all(|p| p.distance_to(selected) >= 3));
}

#[test]
fn distance_transform_peaks_in_the_middle() {
    let analyzer = DistanceTransformAnalyzer::compute(|_| false);

    let peak = analyzer.value(centre());
    assert!(analyzer.values().iter().all(|(_, &v)| v <= peak));
    for x in 1..=24u32 {
        let row = 24;
        assert!(analyzer.value(Location::from_coords(x - 1, row)) <= analyzer.value(Location::from_coords(x, row)));
        let mirrored = 49 - x;
        assert!(
            analyzer.value(Location::from_coords(mirrored + 1, row))
                <= analyzer.value(Location::from_coords(mirrored, row))
        );
    }
}
