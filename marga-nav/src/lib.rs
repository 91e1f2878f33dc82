//! # MargaNav
//!
//! Sampling-based global path planners for 2D occupancy-grid navigation:
//! RRT, RRT*, RRT-Connect, Informed RRT*, and Quick-Informed RRT*.
//!
//! Given a cost-grid snapshot, a start pose, and a goal pose, a planner
//! produces a collision-free polyline of world waypoints plus the
//! expansion trace of the sampling tree. RRT* and its descendants keep
//! optimizing for the full sample budget; the informed variants restrict
//! sampling to the ellipse that can still improve the incumbent solution.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use marga_grid::{CostGrid, WorldPoint};
//! use marga_nav::{PlannerConfig, PlannerKind, SamplingPlanner};
//!
//! let grid = CostGrid::new(200, 200, 0.05, WorldPoint::ZERO);
//! let config = PlannerConfig {
//!     planner_name: PlannerKind::InformedRrt,
//!     sample_points: 2000,
//!     ..Default::default()
//! };
//!
//! let mut planner = SamplingPlanner::new(grid, config)?;
//! let result = planner.plan(WorldPoint::new(0.5, 0.5), WorldPoint::new(8.0, 6.0))?;
//!
//! if result.found {
//!     println!("{} waypoints, cost {:.2}", result.path.len(), result.cost);
//! }
//! ```
//!
//! ## Determinism
//!
//! With a configured `seed`, a plan call is a pure function of the grid
//! and the endpoints: one RNG is consumed in a fixed order, and the
//! parallel rewire phase of Quick-Informed RRT* commits proposals in a
//! deterministic order regardless of the worker count.

mod cancel;
mod config;
mod error;
mod node;
mod planner;
mod sampler;
mod steer;
mod tree;
mod variants;

pub use cancel::CancelToken;
pub use config::{PlannerConfig, PlannerKind};
pub use error::{ConfigError, Endpoint, PlanError};
pub use node::{Node, NO_PARENT};
pub use planner::{PlanResult, SamplingPlanner};
pub use variants::Termination;

// Grid types appear throughout the public API; re-export for hosts.
pub use marga_grid::{costs, CostGrid, GridCoord, WorldPoint};
