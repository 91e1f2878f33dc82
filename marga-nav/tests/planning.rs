//! Scenario tests for the planner family.
//!
//! Scenes use a 1 m/cell grid with origin (0, 0), so world units and cell
//! units coincide and obstacles are placed as lethal cells.

use marga_grid::{costs, CostGrid, GridCoord, WorldPoint};
use marga_nav::{
    CancelToken, PlanError, PlanResult, PlannerConfig, PlannerKind, SamplingPlanner, Termination,
};

/// 20x20 empty grid.
fn open_grid() -> CostGrid {
    CostGrid::new(20, 20, 1.0, WorldPoint::ZERO)
}

/// 20x20 grid with a wall at x = 10 spanning y = 0..=15; passable above.
fn wall_grid() -> CostGrid {
    let mut grid = open_grid();
    for y in 0..=15 {
        grid.set_cost(GridCoord::new(10, y), costs::LETHAL);
    }
    grid
}

/// 50x50 grid that is lethal except for a narrow diagonal corridor.
fn corridor_grid() -> CostGrid {
    let mut grid = CostGrid::new(50, 50, 1.0, WorldPoint::ZERO);
    for y in 0..50i32 {
        for x in 0..50i32 {
            if (x - y).abs() > 3 {
                grid.set_cost(GridCoord::new(x, y), costs::LETHAL);
            }
        }
    }
    grid
}

fn config(kind: PlannerKind, samples: usize, seed: u64) -> PlannerConfig {
    PlannerConfig {
        planner_name: kind,
        sample_points: samples,
        seed: Some(seed),
        ..Default::default()
    }
}

/// Cells covered by the path polyline, rasterized edge by edge.
fn rasterize(grid: &CostGrid, path: &[WorldPoint]) -> Vec<GridCoord> {
    let cells: Vec<GridCoord> = path
        .iter()
        .map(|&p| grid.world_to_map(p).expect("waypoint on grid"))
        .collect();
    let mut covered = Vec::new();
    for pair in cells.windows(2) {
        let (mut x, mut y) = (pair[0].x, pair[0].y);
        let (x1, y1) = (pair[1].x, pair[1].y);
        let dx = (x1 - x).abs();
        let dy = (y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx - dy;
        loop {
            covered.push(GridCoord::new(x, y));
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x += sx;
            }
            if e2 < dx {
                err += dx;
                y += sy;
            }
        }
    }
    covered
}

/// Shared validity checks: endpoints, clear consecutive segments, and no
/// lethal waypoint.
fn assert_path_valid(grid: &CostGrid, result: &PlanResult, start: WorldPoint, goal: WorldPoint) {
    assert!(result.found);
    assert!(result.path.len() >= 2);

    let start_cell = grid.world_to_map(start).unwrap();
    let first_cell = grid.world_to_map(result.path[0]).unwrap();
    assert!(
        start_cell.distance(&first_cell) <= 1.5,
        "path must begin at the start cell"
    );

    let last = *result.path.last().unwrap();
    assert_eq!(last, goal, "path must end at the exact goal pose");

    let threshold = costs::scaled_lethal(0.5);
    for pair in result.path.windows(2) {
        let a = grid.world_to_map(pair[0]).unwrap();
        let b = grid.world_to_map(pair[1]).unwrap();
        assert!(
            grid.line_of_sight(a, b, threshold),
            "segment {:?} -> {:?} is blocked",
            a,
            b
        );
    }

    for &point in &result.path {
        let cell = grid.world_to_map(point).unwrap();
        assert!(grid.cost(cell) < costs::LETHAL, "lethal waypoint {:?}", cell);
    }
}

#[test]
fn rrt_finds_path_on_open_grid() {
    let grid = open_grid();
    let start = WorldPoint::new(1.0, 1.0);
    let goal = WorldPoint::new(18.0, 18.0);

    let mut planner =
        SamplingPlanner::new(grid.clone(), config(PlannerKind::Rrt, 2000, 42)).unwrap();
    let result = planner.plan(start, goal).unwrap();

    assert_path_valid(&grid, &result, start, goal);
    assert!(
        (6..=40).contains(&result.path.len()),
        "unexpected waypoint count {}",
        result.path.len()
    );
    assert!(result.expansion.len() <= 2001);
}

#[test]
fn rrt_star_shortens_the_path() {
    let grid = open_grid();
    let start = WorldPoint::new(1.0, 1.0);
    let goal = WorldPoint::new(18.0, 18.0);

    let mut cfg = config(PlannerKind::RrtStar, 2000, 42);
    cfg.optimization_r = 5.0;
    let mut planner = SamplingPlanner::new(grid.clone(), cfg).unwrap();
    let result = planner.plan(start, goal).unwrap();

    assert_path_valid(&grid, &result, start, goal);
    // Within 20% of the straight-line optimum after rewiring.
    let optimum = (17.0f32 * 17.0 + 17.0 * 17.0).sqrt();
    assert!(
        result.cost <= 1.2 * optimum,
        "cost {} exceeds {}",
        result.cost,
        1.2 * optimum
    );
}

#[test]
fn rrt_connect_routes_around_the_wall() {
    let grid = wall_grid();
    let start = WorldPoint::new(2.0, 10.0);
    let goal = WorldPoint::new(18.0, 10.0);

    let mut planner =
        SamplingPlanner::new(grid.clone(), config(PlannerKind::RrtConnect, 3000, 42)).unwrap();
    let result = planner.plan(start, goal).unwrap();

    assert_path_valid(&grid, &result, start, goal);
    // The only opening is above the wall; every crossing of the wall
    // column must happen there.
    let crossings: Vec<_> = rasterize(&grid, &result.path)
        .into_iter()
        .filter(|cell| cell.x == 10)
        .collect();
    assert!(!crossings.is_empty());
    for cell in crossings {
        assert!(cell.y > 15, "path crossed the wall at {:?}", cell);
    }
}

#[test]
fn informed_rrt_converges_near_the_homotopic_optimum() {
    let grid = wall_grid();
    let start = WorldPoint::new(2.0, 10.0);
    let goal = WorldPoint::new(18.0, 10.0);

    let mut planner =
        SamplingPlanner::new(grid.clone(), config(PlannerKind::InformedRrt, 5000, 42)).unwrap();
    let result = planner.plan(start, goal).unwrap();

    assert_path_valid(&grid, &result, start, goal);
    // Shortest route around the wall top is two ~10-cell legs.
    assert!(result.cost <= 22.0, "cost {} too far from optimum", result.cost);
}

#[test]
fn off_grid_endpoints_are_rejected() {
    let grid = open_grid();
    let mut planner = SamplingPlanner::new(grid, config(PlannerKind::Rrt, 500, 42)).unwrap();

    let result = planner.plan(WorldPoint::new(-1.0, -1.0), WorldPoint::new(5.0, 5.0));
    assert!(matches!(result, Err(PlanError::OffGrid { .. })));

    let result = planner.plan(WorldPoint::new(5.0, 5.0), WorldPoint::new(99.0, 5.0));
    assert!(matches!(result, Err(PlanError::OffGrid { .. })));
}

#[test]
fn quick_informed_cost_is_invariant_under_rewire_thread_count() {
    let grid = corridor_grid();
    let start = WorldPoint::new(2.0, 2.0);
    let goal = WorldPoint::new(47.0, 47.0);

    let mut costs_by_threads = Vec::new();
    for threads in [1usize, 2, 4, 8] {
        let mut cfg = config(PlannerKind::QuickInformedRrt, 4000, 7);
        cfg.rewire_threads_num = threads;
        let mut planner = SamplingPlanner::new(grid.clone(), cfg).unwrap();
        let result = planner.plan(start, goal).unwrap();
        assert_path_valid(&grid, &result, start, goal);
        costs_by_threads.push(result.cost);
    }

    for cost in &costs_by_threads[1..] {
        assert!(
            (costs_by_threads[0] - cost).abs() < 1e-4,
            "thread count changed the result: {:?}",
            costs_by_threads
        );
    }
}

#[test]
fn seeded_planning_is_deterministic() {
    let grid = wall_grid();
    let start = WorldPoint::new(2.0, 10.0);
    let goal = WorldPoint::new(18.0, 10.0);

    let mut paths = Vec::new();
    for _ in 0..2 {
        let mut planner =
            SamplingPlanner::new(grid.clone(), config(PlannerKind::InformedRrt, 1500, 99)).unwrap();
        let result = planner.plan(start, goal).unwrap();
        assert!(result.found);
        paths.push(result.path);
    }
    assert_eq!(paths[0], paths[1]);
}

#[test]
fn expansion_trace_stays_within_budget() {
    let grid = wall_grid();
    let start = WorldPoint::new(2.0, 10.0);
    let goal = WorldPoint::new(18.0, 10.0);
    let samples = 300;

    for kind in [
        PlannerKind::Rrt,
        PlannerKind::RrtStar,
        PlannerKind::RrtConnect,
        PlannerKind::InformedRrt,
        PlannerKind::QuickInformedRrt,
    ] {
        let mut planner = SamplingPlanner::new(grid.clone(), config(kind, samples, 42)).unwrap();
        let result = planner.plan(start, goal).unwrap();
        assert!(
            result.expansion.len() <= samples + 1,
            "{:?}: trace length {}",
            kind,
            result.expansion.len()
        );

        // Every traced vertex is a root or has its parent on the trace.
        for node in &result.expansion {
            assert!(
                node.pid == marga_nav::NO_PARENT
                    || result.expansion.iter().any(|other| other.id == node.pid),
                "{:?}: dangling parent {} for vertex {}",
                kind,
                node.pid,
                node.id
            );
        }
    }
}

#[test]
fn cancellation_stops_planning() {
    let grid = open_grid();
    let mut planner = SamplingPlanner::new(grid, config(PlannerKind::RrtStar, 5000, 42)).unwrap();

    let token = CancelToken::new();
    token.cancel();
    let result = planner
        .plan_with_cancel(WorldPoint::new(1.0, 1.0), WorldPoint::new(18.0, 18.0), &token)
        .unwrap();

    assert!(!result.found);
    assert!(result.path.is_empty());
    assert_eq!(result.termination, Termination::Cancelled);
    // Only the root made it onto the trace.
    assert_eq!(result.expansion.len(), 1);
}

#[test]
fn failed_call_falls_back_to_the_history_path() {
    // A pocket of wall cells encloses the second goal completely.
    let mut grid = open_grid();
    for i in 13..=17 {
        grid.set_cost(GridCoord::new(i, 13), costs::LETHAL);
        grid.set_cost(GridCoord::new(i, 17), costs::LETHAL);
        grid.set_cost(GridCoord::new(13, i), costs::LETHAL);
        grid.set_cost(GridCoord::new(17, i), costs::LETHAL);
    }

    let mut planner = SamplingPlanner::new(grid, config(PlannerKind::Rrt, 800, 42)).unwrap();
    let start = WorldPoint::new(1.0, 1.0);

    let first = planner.plan(start, WorldPoint::new(10.0, 2.0)).unwrap();
    assert!(first.found);

    let second = planner.plan(start, WorldPoint::new(15.0, 15.0)).unwrap();
    assert!(!second.found);
    assert_eq!(second.termination, Termination::BudgetExhausted);
    assert_eq!(second.path, first.path);
}
