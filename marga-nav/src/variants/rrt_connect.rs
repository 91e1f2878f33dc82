//! RRT-Connect: two trees grown toward each other with a greedy
//! connect policy, alternating roles every iteration.

use marga_grid::GridCoord;
use rand::rngs::StdRng;

use crate::cancel::CancelToken;
use crate::node::Node;
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
    // `active` is extended toward the sample, `other` is then driven
    // toward the freshly added vertex. Roles swap every iteration.
    let mut active = SampleSet::with_root(start);
    let mut other = SampleSet::with_root(goal);
    let mut active_is_start = true;
    let mut expansion = vec![start, goal];
    // Two roots are already on the trace; stay within the budget bound.
    let max_trace = params.cfg.sample_points + 1;

    for _ in 0..params.cfg.sample_points {
        if cancel.is_cancelled() {
            return GrowOutcome::not_found(expansion, Termination::Cancelled);
        }
        if expansion.len() >= max_trace {
            break;
        }

        let sample = sampler::uniform_cell(rng, params.grid);

        'extend: {
            let nearest = match active.nearest(sample) {
                Some(node) => node,
                None => break 'extend,
            };
            let new = match steer(
                &active,
                params.grid,
                &nearest,
                sample,
                params.cfg.sample_max_d,
                params.threshold,
            ) {
                Some(node) => node,
                None => break 'extend, // trapped
            };
            active.insert(new);
            expansion.push(new);

            // The other tree may already own this cell.
            if other.contains(new.id) {
                if let Some(cells) = join(&active, &other, active_is_start, new.id) {
                    return GrowOutcome {
                        cells,
                        expansion,
                        termination: Termination::GoalReached,
                    };
                }
            }

            // Connect: repeatedly extend the other tree toward the new
            // vertex until it is reached or the extension is trapped.
            let target = new.coord();
            while expansion.len() < max_trace {
                let nearest = match other.nearest(target) {
                    Some(node) => node,
                    None => break,
                };
                let step = match steer(
                    &other,
                    params.grid,
                    &nearest,
                    target,
                    params.cfg.sample_max_d,
                    params.threshold,
                ) {
                    Some(node) => node,
                    None => break, // trapped
                };
                other.insert(step);
                expansion.push(step);

                if step.coord() == target {
                    // reached
                    if let Some(cells) = join(&active, &other, active_is_start, step.id) {
                        return GrowOutcome {
                            cells,
                            expansion,
                            termination: Termination::GoalReached,
                        };
                    }
                    break;
                }
                // advanced; keep driving toward the target
            }
        }

        std::mem::swap(&mut active, &mut other);
        active_is_start = !active_is_start;
    }

    GrowOutcome::not_found(expansion, Termination::BudgetExhausted)
}

/// Concatenate the root chains of both trees at the meeting cell,
/// oriented start to goal.
fn join(
    active: &SampleSet,
    other: &SampleSet,
    active_is_start: bool,
    meeting: i32,
) -> Option<Vec<GridCoord>> {
    let (start_side, goal_side) = if active_is_start {
        (active, other)
    } else {
        (other, active)
    };

    let (mut cells, _) = start_side.extract_path(meeting)?;
    let (goal_cells, _) = goal_side.extract_path(meeting)?;
    // The goal-side chain is goal-first; reverse and drop the shared cell.
    cells.extend(goal_cells.into_iter().rev().skip(1));
    Some(cells)
}
