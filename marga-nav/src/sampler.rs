//! Sampling strategies: uniform, ellipsoidal informed, and prior-set.

use std::f32::consts::TAU;

use marga_grid::{CostGrid, GridCoord};
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, StudentT};

/// Attempts before a rejection loop falls back to a safe cell.
const MAX_REJECTIONS: usize = 100;

/// Slack on the focal-sum containment test, absorbing float error in the
/// degenerate case where the best cost equals the start-goal distance.
const FOCAL_EPS: f32 = 1e-3;

/// Draw a uniform random cell from the full grid extent.
pub(crate) fn uniform_cell(rng: &mut StdRng, grid: &CostGrid) -> GridCoord {
    GridCoord::new(
        rng.random_range(0..grid.nx() as i32),
        rng.random_range(0..grid.ny() as i32),
    )
}

/// Rejection-sample a point from the open unit disk.
pub(crate) fn unit_disk(rng: &mut StdRng) -> (f32, f32) {
    loop {
        let x = rng.random_range(-1.0f32..1.0);
        let y = rng.random_range(-1.0f32..1.0);
        if x * x + y * y < 1.0 {
            return (x, y);
        }
    }
}

/// Heavy-tailed disk sample: direction uniform, radial component
/// `|t| / (1 + |t|)` with `t` Student-t distributed.
///
/// Heavy tails push the radius toward 1, biasing samples toward the
/// ellipse boundary for occasional long jumps.
pub(crate) fn heavy_disk(rng: &mut StdRng, t_distr: &StudentT<f32>) -> (f32, f32) {
    let phi = rng.random::<f32>() * TAU;
    let t: f32 = t_distr.sample(rng);
    let r = t.abs() / (1.0 + t.abs());
    (r * phi.cos(), r * phi.sin())
}

/// The prolate hyperspheroid (an ellipse in 2D) with foci at start and
/// goal, bounding all cells whose via-point cost could beat the incumbent.
#[derive(Clone, Copy, Debug)]
pub(crate) struct EllipseRegion {
    start: GridCoord,
    goal: GridCoord,
    center_x: f32,
    center_y: f32,
    /// Rotation of the disk frame: minus the start-to-goal bearing
    theta: f32,
    c_min: f32,
}

impl EllipseRegion {
    pub fn new(start: GridCoord, goal: GridCoord) -> Self {
        Self {
            start,
            goal,
            center_x: (start.x + goal.x) as f32 / 2.0,
            center_y: (start.y + goal.y) as f32 / 2.0,
            theta: -start.angle_to(&goal),
            c_min: start.distance(&goal),
        }
    }

    /// Straight-line distance between the foci, in cells.
    pub fn c_min(&self) -> f32 {
        self.c_min
    }

    /// Map a unit-disk point into the ellipse for the given best cost and
    /// round to a cell. `None` when the cell falls off the grid or, after
    /// rounding, outside the ellipse.
    fn cell_from_disk(&self, (x, y): (f32, f32), c_best: f32, grid: &CostGrid) -> Option<GridCoord> {
        let a = c_best / 2.0;
        let c = self.c_min / 2.0;
        let b = (a * a - c * c).max(0.0).sqrt();

        let tx = a * self.theta.cos() * x + b * self.theta.sin() * y + self.center_x;
        let ty = -a * self.theta.sin() * x + b * self.theta.cos() * y + self.center_y;
        let cell = GridCoord::new(tx.round() as i32, ty.round() as i32);

        if !grid.is_inside(cell) {
            return None;
        }
        // Rounding may nudge a boundary point out; keep the informed set tight.
        if cell.distance(&self.start) + cell.distance(&self.goal) > c_best + FOCAL_EPS {
            return None;
        }
        Some(cell)
    }

    /// Sample a cell inside the ellipse, retrying rejected disk points.
    ///
    /// Falls back to the focal midpoint, which is always inside, if the
    /// rejection budget runs out.
    pub fn sample(
        &self,
        rng: &mut StdRng,
        c_best: f32,
        grid: &CostGrid,
        mut disk: impl FnMut(&mut StdRng) -> (f32, f32),
    ) -> GridCoord {
        for _ in 0..MAX_REJECTIONS {
            if let Some(cell) = self.cell_from_disk(disk(rng), c_best, grid) {
                return cell;
            }
        }
        GridCoord::new(self.center_x.round() as i32, self.center_y.round() as i32)
    }
}

/// Sample a cell from a disk of `radius` centered on a uniformly chosen
/// vertex of the incumbent best path.
pub(crate) fn prior_cell(
    rng: &mut StdRng,
    path: &[GridCoord],
    radius: f32,
    grid: &CostGrid,
) -> GridCoord {
    debug_assert!(!path.is_empty(), "prior set sampling needs a path");
    for _ in 0..MAX_REJECTIONS {
        let center = path[rng.random_range(0..path.len())];
        let phi = rng.random::<f32>() * TAU;
        let r = radius * rng.random::<f32>().sqrt();
        let cell = GridCoord::new(
            center.x + (r * phi.cos()).round() as i32,
            center.y + (r * phi.sin()).round() as i32,
        );
        if grid.is_inside(cell) {
            return cell;
        }
    }
    path[rng.random_range(0..path.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use marga_grid::WorldPoint;
    use rand::SeedableRng;

    #[test]
    fn test_uniform_cell_stays_on_grid() {
        let grid = CostGrid::new(20, 15, 1.0, WorldPoint::ZERO);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let cell = uniform_cell(&mut rng, &grid);
            assert!(grid.is_inside(cell));
        }
    }

    #[test]
    fn test_unit_disk_is_inside() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let (x, y) = unit_disk(&mut rng);
            assert!(x * x + y * y < 1.0);
        }
    }

    #[test]
    fn test_heavy_disk_is_inside() {
        let mut rng = StdRng::seed_from_u64(7);
        let t_distr = StudentT::new(1.0f32).unwrap();
        for _ in 0..500 {
            let (x, y) = heavy_disk(&mut rng, &t_distr);
            assert!(x * x + y * y < 1.0);
        }
    }

    #[test]
    fn test_ellipse_samples_stay_inside_informed_set() {
        let grid = CostGrid::new(40, 40, 1.0, WorldPoint::ZERO);
        let start = GridCoord::new(2, 10);
        let goal = GridCoord::new(38, 10);
        let region = EllipseRegion::new(start, goal);
        let c_best = region.c_min() + 8.0;

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let cell = region.sample(&mut rng, c_best, &grid, unit_disk);
            assert!(grid.is_inside(cell));
            let focal_sum = cell.distance(&start) + cell.distance(&goal);
            assert!(focal_sum <= c_best + 1e-3, "focal sum {} over {}", focal_sum, c_best);
        }
    }

    #[test]
    fn test_degenerate_ellipse_falls_back_to_axis() {
        let grid = CostGrid::new(40, 40, 1.0, WorldPoint::ZERO);
        let start = GridCoord::new(5, 5);
        let goal = GridCoord::new(25, 5);
        let region = EllipseRegion::new(start, goal);

        let mut rng = StdRng::seed_from_u64(9);
        // Best cost equal to the focal distance collapses the ellipse to
        // the segment; sampling must still terminate on a valid cell.
        let cell = region.sample(&mut rng, region.c_min(), &grid, unit_disk);
        assert!(grid.is_inside(cell));
        assert_eq!(cell.y, 5);
    }

    #[test]
    fn test_prior_cell_is_near_path() {
        let grid = CostGrid::new(50, 50, 1.0, WorldPoint::ZERO);
        let path = vec![
            GridCoord::new(10, 10),
            GridCoord::new(20, 20),
            GridCoord::new(30, 30),
        ];
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let cell = prior_cell(&mut rng, &path, 5.0, &grid);
            let near = path.iter().any(|p| p.distance(&cell) <= 5.0 + 1.5);
            assert!(near, "sample {:?} too far from the path", cell);
        }
    }
}
