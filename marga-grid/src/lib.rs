//! # MargaGrid
//!
//! Cost-grid snapshot and geometry primitives for the Marga sampling
//! planners.
//!
//! The crate provides:
//!
//! - [`GridCoord`] / [`WorldPoint`] coordinate types
//! - [`CostGrid`], an immutable per-cell traversal-cost snapshot with
//!   world/map conversions, the cell-index bijection, Bresenham
//!   line-of-sight, and optional border outlining
//!
//! ## Coordinate System
//!
//! World coordinates are meters, map coordinates are integer cell indices
//! with `(0, 0)` at the grid origin. The flat cell index is `y * nx + x`.

#![warn(missing_docs)]

mod grid;
mod point;

pub use grid::{costs, CostGrid};
pub use point::{GridCoord, WorldPoint};
