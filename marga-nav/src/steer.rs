//! Steering: project a sampled cell onto the tree within a step bound.

use marga_grid::{CostGrid, GridCoord};

use crate::node::Node;
use crate::tree::SampleSet;

/// Steer from a tree vertex toward a sampled cell.
///
/// The target is the sample itself when within `max_dist`, otherwise the
/// point `max_dist` along the segment, rounded to the nearest cell. Returns
/// `None` when the segment is blocked at `threshold`, or when the target
/// cell is already a tree vertex.
pub(crate) fn steer(
    set: &SampleSet,
    grid: &CostGrid,
    nearest: &Node,
    sample: GridCoord,
    max_dist: f32,
    threshold: u8,
) -> Option<Node> {
    let d = nearest.coord().distance(&sample);
    let target = if d <= max_dist {
        sample
    } else {
        let theta = nearest.coord().angle_to(&sample);
        GridCoord::new(
            nearest.x + (max_dist * theta.cos()).round() as i32,
            nearest.y + (max_dist * theta.sin()).round() as i32,
        )
    };

    if !grid.is_inside(target) {
        return None;
    }

    let id = grid.grid_to_index(target);
    if set.contains(id) {
        return None;
    }

    if !grid.line_of_sight(nearest.coord(), target, threshold) {
        return None;
    }

    let step = nearest.coord().distance(&target);
    Some(Node::new(
        target.x,
        target.y,
        nearest.g + step,
        0.0,
        id,
        nearest.id,
    ))
}
