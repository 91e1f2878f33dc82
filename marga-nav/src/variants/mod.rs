//! Planner variants sharing the grid, tree store, and steering primitives.
//!
//! Each variant supplies its own sampler and per-iteration extension
//! policy; RRT* and its descendants add a rewire policy on top.

pub(crate) mod informed;
pub(crate) mod quick_informed;
pub(crate) mod rrt;
pub(crate) mod rrt_connect;
pub(crate) mod rrt_star;

use marga_grid::{CostGrid, GridCoord};

use crate::config::PlannerConfig;
use crate::node::Node;

/// Why a grow loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// A goal-connected vertex was committed
    GoalReached,
    /// The iteration budget ran out without goal contact
    BudgetExhausted,
    /// The cancellation token fired at an iteration boundary
    Cancelled,
}

/// Per-call inputs shared by every grow loop.
pub(crate) struct GrowParams<'a> {
    pub grid: &'a CostGrid,
    pub cfg: &'a PlannerConfig,
    /// Lethal threshold after obstacle-factor scaling
    pub threshold: u8,
    /// Goal tolerance converted to cells
    pub tol_cells: f32,
}

impl GrowParams<'_> {
    /// Goal-contact test: the vertex connects to the goal when it is
    /// within the steering step (or the configured tolerance) and the
    /// segment to the goal is clear. Returns the remaining distance.
    pub fn goal_contact(&self, node: &Node, goal: GridCoord, step: f32) -> Option<f32> {
        let d = node.coord().distance(&goal);
        if d > step && d > self.tol_cells {
            return None;
        }
        if !self.grid.line_of_sight(node.coord(), goal, self.threshold) {
            return None;
        }
        Some(d)
    }
}

/// Result of a grow loop, before world-frame conversion.
pub(crate) struct GrowOutcome {
    /// Goal-terminated cell polyline, root first; empty when not found
    pub cells: Vec<GridCoord>,
    /// Accepted vertices in discovery order
    pub expansion: Vec<Node>,
    pub termination: Termination,
}

impl GrowOutcome {
    pub fn not_found(expansion: Vec<Node>, termination: Termination) -> Self {
        Self {
            cells: Vec::new(),
            expansion,
            termination,
        }
    }
}
