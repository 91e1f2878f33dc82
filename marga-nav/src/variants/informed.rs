//! Informed RRT*: once a solution exists, sampling is restricted to the
//! ellipse with foci at start and goal whose via-point cost could still
//! beat the incumbent.

use rand::rngs::StdRng;

use crate::cancel::CancelToken;
use crate::node::Node;
use crate::sampler::{self, EllipseRegion};

use super::{rrt_star, GrowOutcome, GrowParams};

pub(crate) fn grow(
    params: &GrowParams<'_>,
    start: Node,
    goal: Node,
    rng: &mut StdRng,
    cancel: &CancelToken,
) -> GrowOutcome {
    let region = EllipseRegion::new(start.coord(), goal.coord());
    let grid = params.grid;

    let mut sample = move |rng: &mut StdRng, c_best: f32| {
        if c_best.is_finite() {
            region.sample(rng, c_best, grid, sampler::unit_disk)
        } else {
            sampler::uniform_cell(rng, grid)
        }
    };

    rrt_star::grow_with_sampler(params, start, goal, rng, cancel, &mut sample)
}
