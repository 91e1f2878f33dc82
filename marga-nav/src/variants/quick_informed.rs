//! Quick-Informed RRT*: informed sampling plus prior-set concentration,
//! an adaptive steering step, heavy-tailed growth, and a parallel
//! rewire phase.

use std::collections::BTreeMap;
use std::thread;

use marga_grid::GridCoord;
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::StudentT;

use crate::cancel::CancelToken;
use crate::node::{Node, NO_PARENT};
use crate::sampler::{self, EllipseRegion};
use crate::steer::steer;
use crate::tree::SampleSet;

use super::{rrt_star, GrowOutcome, GrowParams, Termination};

/// Geometric step decay applied on each best-cost improvement; the step
/// never drops below one cell.
const STEP_DECAY: f32 = 0.9;

pub(crate) fn grow(
    params: &GrowParams<'_>,
    start: Node,
    goal: Node,
    rng: &mut StdRng,
    cancel: &CancelToken,
) -> GrowOutcome {
    let cfg = params.cfg;
    debug_assert!(
        cfg.t_distr_freedom > 0.0,
        "t_distr_freedom must be validated positive"
    );
    let t_distr = match StudentT::new(cfg.t_distr_freedom) {
        Ok(distr) => distr,
        Err(_) => return GrowOutcome::not_found(vec![start], Termination::BudgetExhausted),
    };
    let region = EllipseRegion::new(start.coord(), goal.coord());

    let mut set = SampleSet::with_root(start);
    let mut expansion = vec![start];
    let mut c_best = f32::INFINITY;
    let mut best_parent = NO_PARENT;
    let mut best_cells: Vec<GridCoord> = Vec::new();
    let mut step = cfg.step_extend_d;

    for _ in 0..cfg.sample_points {
        if cancel.is_cancelled() {
            return GrowOutcome::not_found(expansion, Termination::Cancelled);
        }

        let cell = if c_best.is_finite() {
            // Concentrate part of the effort near the incumbent path; the
            // share grows as the solution tightens.
            let prior_p = cfg.prior_sample_set_r / (cfg.prior_sample_set_r + c_best / 2.0);
            if !best_cells.is_empty() && rng.random::<f32>() < prior_p {
                sampler::prior_cell(rng, &best_cells, cfg.prior_sample_set_r, params.grid)
            } else {
                region.sample(rng, c_best, params.grid, |rng| {
                    sampler::heavy_disk(rng, &t_distr)
                })
            }
        } else {
            sampler::uniform_cell(rng, params.grid)
        };

        let nearest = match set.nearest(cell) {
            Some(node) => node,
            None => break,
        };
        let mut new = match steer(&set, params.grid, &nearest, cell, step, params.threshold) {
            Some(node) => node,
            None => continue,
        };

        let neighbors = set.neighborhood(new.coord(), cfg.optimization_r);
        rrt_star::choose_parent(params, &set, &mut new, &neighbors);
        set.insert(new);
        expansion.push(new);
        parallel_rewire(params, &mut set, &new, &neighbors, cfg.rewire_threads_num);

        if let Some(d) = params.goal_contact(&new, goal.coord(), step) {
            let cost = new.g + d;
            if cost < c_best {
                c_best = cost;
                best_parent = new.id;
                if let Some((cells, _)) = set.extract_path(new.id) {
                    best_cells = cells;
                    best_cells.push(goal.coord());
                }
                // Finer steps as the solution approaches the optimum.
                step = (step * STEP_DECAY).max(1.0);
                tracing::debug!("best goal connection improved to {:.2}, step {:.2}", c_best, step);
            }
        }
    }

    match rrt_star::commit_goal(&mut set, &goal, c_best, best_parent) {
        Some(cells) => GrowOutcome {
            cells,
            expansion,
            termination: Termination::GoalReached,
        },
        None => GrowOutcome::not_found(expansion, Termination::BudgetExhausted),
    }
}

/// Fork-join rewire of the new vertex's neighborhood.
///
/// The neighborhood is sharded by cell index modulo the worker count.
/// Workers only read the store and emit `(neighbor, candidate_g)`
/// proposals into their own buffers; a single commit phase applies the
/// minimum proposal per neighbor, in ascending index order, subject to a
/// strict cost decrease. The committed parent always predates this
/// round, which together with the strict decrease rules out cycles.
fn parallel_rewire(
    params: &GrowParams<'_>,
    set: &mut SampleSet,
    new: &Node,
    neighbors: &[i32],
    workers: usize,
) {
    if neighbors.iter().all(|&nid| nid == new.pid) {
        return;
    }

    let shards: Vec<Vec<i32>> = (0..workers)
        .map(|w| {
            neighbors
                .iter()
                .copied()
                .filter(|&nid| nid != new.pid && nid as usize % workers == w)
                .collect()
        })
        .collect();

    let proposals: Vec<Vec<(i32, f32)>> = if workers <= 1 {
        shards
            .iter()
            .map(|shard| propose(params, set, new, shard))
            .collect()
    } else {
        let set_ref = &*set;
        thread::scope(|scope| {
            let handles: Vec<_> = shards
                .iter()
                .map(|shard| scope.spawn(move || propose(params, set_ref, new, shard)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_default())
                .collect()
        })
    };

    // Serial commit: minimum candidate per neighbor, ascending index.
    let mut merged: BTreeMap<i32, f32> = BTreeMap::new();
    for (nid, candidate) in proposals.into_iter().flatten() {
        merged
            .entry(nid)
            .and_modify(|g| *g = g.min(candidate))
            .or_insert(candidate);
    }
    for (nid, candidate) in merged {
        let current = match set.get(nid) {
            Some(node) => node.g,
            None => continue,
        };
        if candidate < current {
            set.reparent(nid, new.id, candidate);
        }
    }
}

/// Worker half of the rewire: collision-checked cost proposals for one
/// shard of the neighborhood.
fn propose(
    params: &GrowParams<'_>,
    set: &SampleSet,
    new: &Node,
    shard: &[i32],
) -> Vec<(i32, f32)> {
    let mut buffer = Vec::new();
    for &nid in shard {
        let neighbor = match set.get(nid) {
            Some(node) => node,
            None => continue,
        };
        let candidate = new.g + new.distance_to(neighbor);
        if candidate < neighbor.g
            && params
                .grid
                .line_of_sight(new.coord(), neighbor.coord(), params.threshold)
        {
            buffer.push((nid, candidate));
        }
    }
    buffer
}
