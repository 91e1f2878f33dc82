//! Rapidly-exploring random tree: grow until goal contact or budget.

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
    let mut set = SampleSet::with_root(start);
    let mut expansion = vec![start];

    for _ in 0..params.cfg.sample_points {
        if cancel.is_cancelled() {
            return GrowOutcome::not_found(expansion, Termination::Cancelled);
        }

        let sample = sampler::uniform_cell(rng, params.grid);
        let nearest = match set.nearest(sample) {
            Some(node) => node,
            None => break,
        };
        let new = match steer(
            &set,
            params.grid,
            &nearest,
            sample,
            params.cfg.sample_max_d,
            params.threshold,
        ) {
            Some(node) => node,
            None => continue,
        };

        set.insert(new);
        expansion.push(new);

        // First contact wins; no further optimization in plain RRT.
        if let Some(d) = params.goal_contact(&new, goal.coord(), params.cfg.sample_max_d) {
            if new.id != goal.id {
                set.insert(Node::new(goal.x, goal.y, new.g + d, 0.0, goal.id, new.id));
            }
            if let Some((cells, _)) = set.extract_path(goal.id) {
                return GrowOutcome {
                    cells,
                    expansion,
                    termination: Termination::GoalReached,
                };
            }
            break;
        }
    }

    GrowOutcome::not_found(expansion, Termination::BudgetExhausted)
}
