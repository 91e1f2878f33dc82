//! Host-facing planner: world-frame entry point, variant dispatch, and
//! the history-path fallback.

use marga_grid::{costs, CostGrid, GridCoord, WorldPoint};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::config::{PlannerConfig, PlannerKind};
use crate::error::{ConfigError, Endpoint, PlanError};
use crate::node::{Node, NO_PARENT};
use crate::variants::{self, GrowParams, Termination};

/// Outcome of one plan call.
#[derive(Clone, Debug)]
pub struct PlanResult {
    /// Whether this call produced a fresh path. When false, `path` is
    /// either empty or the cached path of an earlier successful call.
    pub found: bool,
    /// Waypoints in world coordinates, start to goal
    pub path: Vec<WorldPoint>,
    /// Path length in world units, summed over waypoint edges
    pub cost: f32,
    /// Accepted tree vertices in discovery order, for visualization
    pub expansion: Vec<Node>,
    /// Why the grow loop stopped
    pub termination: Termination,
}

/// Sampling-based global planner over a cost-grid snapshot.
///
/// Owns the grid snapshot and the configuration; each [`plan`] call is an
/// independent unit of work and leaves no state behind other than the
/// optional history path. Calls are not reentrant on one instance.
///
/// [`plan`]: SamplingPlanner::plan
pub struct SamplingPlanner {
    grid: CostGrid,
    config: PlannerConfig,
    factor: f32,
    history: Option<(Vec<WorldPoint>, f32)>,
}

impl SamplingPlanner {
    /// Create a planner over a grid snapshot.
    ///
    /// Validates the configuration and, when `outline_map` is set, paints
    /// the snapshot border lethal before any planning happens.
    pub fn new(mut grid: CostGrid, config: PlannerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.outline_map {
            grid.outline();
        }
        info!("using sampling planner: {}", config.planner_name);
        let factor = config.obstacle_factor;
        Ok(Self {
            grid,
            config,
            factor,
            history: None,
        })
    }

    /// Plan a path between two world poses.
    pub fn plan(&mut self, start: WorldPoint, goal: WorldPoint) -> Result<PlanResult, PlanError> {
        self.plan_with_cancel(start, goal, &CancelToken::new())
    }

    /// Plan with a cooperative cancellation handle, checked at iteration
    /// boundaries. On cancellation the result carries the partial
    /// expansion trace and no fresh path.
    pub fn plan_with_cancel(
        &mut self,
        start: WorldPoint,
        goal: WorldPoint,
        cancel: &CancelToken,
    ) -> Result<PlanResult, PlanError> {
        let start_cell = self.grid.world_to_map(start).ok_or(PlanError::OffGrid {
            which: Endpoint::Start,
            x: start.x,
            y: start.y,
        })?;
        let goal_cell = self.grid.world_to_map(goal).ok_or(PlanError::OffGrid {
            which: Endpoint::Goal,
            x: goal.x,
            y: goal.y,
        })?;

        let threshold = costs::scaled_lethal(self.factor);
        if self.grid.is_blocked(goal_cell, threshold) {
            // Planning proceeds and exhausts the budget; the goal segment
            // can never pass the collision test.
            warn!(
                "goal cell ({}, {}) is not traversable",
                goal_cell.x, goal_cell.y
            );
        }

        if start_cell == goal_cell {
            let path = vec![start, goal];
            let cost = polyline_cost(&path);
            self.history = Some((path.clone(), cost));
            return Ok(PlanResult {
                found: true,
                path,
                cost,
                expansion: vec![self.root_node(start_cell)],
                termination: Termination::GoalReached,
            });
        }

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let params = GrowParams {
            grid: &self.grid,
            cfg: &self.config,
            threshold,
            tol_cells: self.config.default_tolerance / self.grid.resolution(),
        };
        let start_node = self.root_node(start_cell);
        let goal_node = self.root_node(goal_cell);

        debug!(
            "{}: planning ({}, {}) -> ({}, {})",
            self.config.planner_name, start_cell.x, start_cell.y, goal_cell.x, goal_cell.y
        );

        let outcome = match self.config.planner_name {
            PlannerKind::Rrt => variants::rrt::grow(&params, start_node, goal_node, &mut rng, cancel),
            PlannerKind::RrtStar => {
                variants::rrt_star::grow(&params, start_node, goal_node, &mut rng, cancel)
            }
            PlannerKind::RrtConnect => {
                variants::rrt_connect::grow(&params, start_node, goal_node, &mut rng, cancel)
            }
            PlannerKind::InformedRrt => {
                variants::informed::grow(&params, start_node, goal_node, &mut rng, cancel)
            }
            PlannerKind::QuickInformedRrt => {
                variants::quick_informed::grow(&params, start_node, goal_node, &mut rng, cancel)
            }
        };

        if outcome.cells.is_empty() {
            return Ok(self.fallback(outcome.expansion, outcome.termination));
        }

        let mut path: Vec<WorldPoint> = outcome
            .cells
            .iter()
            .map(|&cell| self.grid.map_to_world(cell))
            .collect();
        // Replace the quantized trailing waypoint with the exact goal pose.
        if let Some(last) = path.last_mut() {
            *last = goal;
        }
        let cost = polyline_cost(&path);
        debug!("path found: {} waypoints, cost {:.2}", path.len(), cost);

        self.history = Some((path.clone(), cost));
        Ok(PlanResult {
            found: true,
            path,
            cost,
            expansion: outcome.expansion,
            termination: outcome.termination,
        })
    }

    /// Failed call: hand back the cached path of an earlier success when
    /// one exists, an empty path otherwise.
    fn fallback(&self, expansion: Vec<Node>, termination: Termination) -> PlanResult {
        match &self.history {
            Some((path, cost)) => {
                warn!("no path found, returning history path");
                PlanResult {
                    found: false,
                    path: path.clone(),
                    cost: *cost,
                    expansion,
                    termination,
                }
            }
            None => PlanResult {
                found: false,
                path: Vec::new(),
                cost: 0.0,
                expansion,
                termination,
            },
        }
    }

    fn root_node(&self, cell: GridCoord) -> Node {
        Node::new(
            cell.x,
            cell.y,
            0.0,
            0.0,
            self.grid.grid_to_index(cell),
            NO_PARENT,
        )
    }

    /// Replace the obstacle factor between calls, clamped to `[0, 1]`.
    pub fn set_factor(&mut self, factor: f32) {
        self.factor = factor.clamp(0.0, 1.0);
    }

    /// The grid snapshot this planner runs over.
    pub fn cost_grid(&self) -> &CostGrid {
        &self.grid
    }

    /// The active configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// World to map conversion on the snapshot.
    pub fn world_to_map(&self, point: WorldPoint) -> Option<GridCoord> {
        self.grid.world_to_map(point)
    }

    /// Map to world conversion on the snapshot (cell center).
    pub fn map_to_world(&self, cell: GridCoord) -> WorldPoint {
        self.grid.map_to_world(cell)
    }

    /// Flat cell index of a coordinate.
    pub fn grid_to_index(&self, cell: GridCoord) -> i32 {
        self.grid.grid_to_index(cell)
    }

    /// Coordinate of a flat cell index.
    pub fn index_to_grid(&self, index: i32) -> GridCoord {
        self.grid.index_to_grid(index)
    }

    /// Take the cached history path, clearing it.
    pub fn take_history(&mut self) -> Option<Vec<WorldPoint>> {
        self.history.take().map(|(path, _)| path)
    }

    /// Drop the cached history path.
    pub fn clear_history(&mut self) {
        self.history = None;
    }
}

fn polyline_cost(path: &[WorldPoint]) -> f32 {
    path.windows(2).map(|pair| pair[0].distance(&pair[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polyline_cost() {
        let path = vec![
            WorldPoint::new(0.0, 0.0),
            WorldPoint::new(3.0, 0.0),
            WorldPoint::new(3.0, 4.0),
        ];
        assert!((polyline_cost(&path) - 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_same_cell_start_and_goal() {
        let grid = CostGrid::new(10, 10, 1.0, WorldPoint::ZERO);
        let mut planner = SamplingPlanner::new(grid, PlannerConfig::default()).unwrap();
        let result = planner
            .plan(WorldPoint::new(4.2, 4.2), WorldPoint::new(4.7, 4.7))
            .unwrap();
        assert!(result.found);
        assert_eq!(result.path.len(), 2);
    }

    #[test]
    fn test_off_grid_start_is_an_error() {
        let grid = CostGrid::new(10, 10, 1.0, WorldPoint::ZERO);
        let mut planner = SamplingPlanner::new(grid, PlannerConfig::default()).unwrap();
        let result = planner.plan(WorldPoint::new(-1.0, -1.0), WorldPoint::new(5.0, 5.0));
        assert!(matches!(
            result,
            Err(PlanError::OffGrid {
                which: Endpoint::Start,
                ..
            })
        ));
    }
}
