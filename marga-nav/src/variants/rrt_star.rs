//! RRT*: RRT with choose-parent and rewire over a fixed neighborhood.
//!
//! The loop runs the full sample budget and keeps improving the best
//! goal connection; there is no early exit on first contact.

use marga_grid::GridCoord;
use rand::rngs::StdRng;

use crate::cancel::CancelToken;
use crate::node::{Node, NO_PARENT};
use crate::sampler;
use crate::steer::steer;
use crate::tree::SampleSet;

use super::{GrowOutcome, GrowParams, Termination};

pub(crate) fn grow(
    params: &GrowParams<'_>,
    start: Node,
    goal: Node,
    rng: &mut StdRng,
    cancel: &CancelToken,
) -> GrowOutcome {
    let grid = params.grid;
    let mut sample = move |rng: &mut StdRng, _c_best: f32| sampler::uniform_cell(rng, grid);
    grow_with_sampler(params, start, goal, rng, cancel, &mut sample)
}

/// The RRT* loop, parameterized over the sampling strategy so the
/// informed variant can swap in ellipsoidal sampling once a solution
/// exists. The sampler receives the current best cost.
pub(crate) fn grow_with_sampler(
    params: &GrowParams<'_>,
    start: Node,
    goal: Node,
    rng: &mut StdRng,
    cancel: &CancelToken,
    sample: &mut dyn FnMut(&mut StdRng, f32) -> GridCoord,
) -> GrowOutcome {
    let mut set = SampleSet::with_root(start);
    let mut expansion = vec![start];
    let mut c_best = f32::INFINITY;
    let mut best_parent = NO_PARENT;

    for _ in 0..params.cfg.sample_points {
        if cancel.is_cancelled() {
            return GrowOutcome::not_found(expansion, Termination::Cancelled);
        }

        let cell = sample(rng, c_best);
        let nearest = match set.nearest(cell) {
            Some(node) => node,
            None => break,
        };
        let mut new = match steer(
            &set,
            params.grid,
            &nearest,
            cell,
            params.cfg.sample_max_d,
            params.threshold,
        ) {
            Some(node) => node,
            None => continue,
        };

        let neighbors = set.neighborhood(new.coord(), params.cfg.optimization_r);
        choose_parent(params, &set, &mut new, &neighbors);
        set.insert(new);
        expansion.push(new);
        rewire(params, &mut set, &new, &neighbors);

        if let Some(d) = params.goal_contact(&new, goal.coord(), params.cfg.sample_max_d) {
            let cost = new.g + d;
            if cost < c_best {
                c_best = cost;
                best_parent = new.id;
                tracing::debug!("best goal connection improved to {:.2}", c_best);
            }
        }
    }

    match commit_goal(&mut set, &goal, c_best, best_parent) {
        Some(cells) => GrowOutcome {
            cells,
            expansion,
            termination: Termination::GoalReached,
        },
        None => GrowOutcome::not_found(expansion, Termination::BudgetExhausted),
    }
}

/// Reparent the incoming vertex onto the neighbor minimizing
/// `neighbor.g + dist`, among neighbors with a clear segment to it.
/// Cost ties go to the smaller cell index.
pub(crate) fn choose_parent(
    params: &GrowParams<'_>,
    set: &SampleSet,
    new: &mut Node,
    neighbors: &[i32],
) {
    let mut best_g = new.g;
    let mut best_pid = new.pid;

    for &nid in neighbors {
        let neighbor = match set.get(nid) {
            Some(node) => node,
            None => continue,
        };
        let candidate = neighbor.g + neighbor.distance_to(new);
        let better = candidate < best_g || (candidate == best_g && nid < best_pid);
        if better
            && params
                .grid
                .line_of_sight(neighbor.coord(), new.coord(), params.threshold)
        {
            best_g = candidate;
            best_pid = nid;
        }
    }

    new.g = best_g;
    new.pid = best_pid;
}

/// Rewire each neighbor through the new vertex when that strictly lowers
/// its cost. Descendant costs are not propagated; path extraction
/// recomputes them from edge lengths.
fn rewire(params: &GrowParams<'_>, set: &mut SampleSet, new: &Node, neighbors: &[i32]) {
    for &nid in neighbors {
        if nid == new.pid {
            continue;
        }
        let (coord, g) = match set.get(nid) {
            Some(node) => (node.coord(), node.g),
            None => continue,
        };
        let candidate = new.g + new.coord().distance(&coord);
        if candidate < g
            && params
                .grid
                .line_of_sight(new.coord(), coord, params.threshold)
        {
            set.reparent(nid, new.id, candidate);
        }
    }
}

/// Attach the goal to its best connection and extract the path.
///
/// When the best parent's own chain already runs through the goal cell,
/// reattaching would close a loop; the existing goal vertex is used
/// instead.
pub(crate) fn commit_goal(
    set: &mut SampleSet,
    goal: &Node,
    c_best: f32,
    best_parent: i32,
) -> Option<Vec<GridCoord>> {
    if best_parent == NO_PARENT {
        return None;
    }
    if best_parent != goal.id {
        let (parent_cells, _) = set.extract_path(best_parent)?;
        if !parent_cells.contains(&goal.coord()) {
            set.insert(Node::new(goal.x, goal.y, c_best, 0.0, goal.id, best_parent));
        }
    }
    set.extract_path(goal.id).map(|(cells, _)| cells)
}
