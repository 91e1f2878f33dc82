//! Cost grid snapshot with line-of-sight and coordinate conversions.

use crate::point::{GridCoord, WorldPoint};

/// Cost thresholds for planning
pub mod costs {
    /// Safe to traverse, no penalty
    pub const FREE: u8 = 0;
    /// Obstacle, blocked
    pub const LETHAL: u8 = 253;

    /// Lethal threshold scaled by an obstacle factor in `[0, 1]`.
    ///
    /// Collision tests treat a cell as blocking when its cost reaches
    /// `LETHAL * factor`, so a smaller factor is more conservative.
    #[inline]
    pub fn scaled_lethal(factor: f32) -> u8 {
        (LETHAL as f32 * factor).clamp(1.0, 255.0) as u8
    }
}

/// Immutable per-cell traversal-cost snapshot of the environment.
///
/// Cells hold costs in `[0, 255]`; a cell at or above [`costs::LETHAL`] is an
/// obstacle. The snapshot is taken once per planning call and is never
/// mutated during planning (the one exception is [`CostGrid::outline`],
/// applied before planning begins).
#[derive(Clone, Debug)]
pub struct CostGrid {
    /// Grid width in cells
    nx: usize,
    /// Grid height in cells
    ny: usize,
    /// Resolution in meters per cell
    resolution: f32,
    /// Grid origin in world coordinates
    origin: WorldPoint,
    /// Cost values: 0 = free, 253+ = obstacle
    cells: Vec<u8>,
}

impl CostGrid {
    /// Create an all-free grid.
    pub fn new(nx: usize, ny: usize, resolution: f32, origin: WorldPoint) -> Self {
        Self {
            nx,
            ny,
            resolution,
            origin,
            cells: vec![costs::FREE; nx * ny],
        }
    }

    /// Create a grid from an existing cost array.
    ///
    /// The array is laid out row-major, `index = y * nx + x`, and must hold
    /// exactly `nx * ny` entries.
    pub fn from_cells(nx: usize, ny: usize, resolution: f32, origin: WorldPoint, cells: Vec<u8>) -> Self {
        assert_eq!(cells.len(), nx * ny, "cost array length must be nx * ny");
        Self {
            nx,
            ny,
            resolution,
            origin,
            cells,
        }
    }

    /// Grid width in cells.
    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Grid height in cells.
    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Total cell count.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Resolution in meters per cell.
    #[inline]
    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    /// Grid origin in world coordinates.
    #[inline]
    pub fn origin(&self) -> WorldPoint {
        self.origin
    }

    /// Whether a coordinate lies inside the grid.
    #[inline]
    pub fn is_inside(&self, coord: GridCoord) -> bool {
        coord.x >= 0 && coord.y >= 0 && (coord.x as usize) < self.nx && (coord.y as usize) < self.ny
    }

    /// Get cost at a grid coordinate. Out-of-bounds reads are lethal.
    #[inline]
    pub fn cost(&self, coord: GridCoord) -> u8 {
        if !self.is_inside(coord) {
            return costs::LETHAL;
        }
        self.cells[coord.y as usize * self.nx + coord.x as usize]
    }

    /// Set cost at a grid coordinate. Out-of-bounds writes are ignored.
    #[inline]
    pub fn set_cost(&mut self, coord: GridCoord, cost: u8) {
        if self.is_inside(coord) {
            self.cells[coord.y as usize * self.nx + coord.x as usize] = cost;
        }
    }

    /// Whether the cell blocks traversal at the given threshold.
    #[inline]
    pub fn is_blocked(&self, coord: GridCoord, threshold: u8) -> bool {
        self.cost(coord) >= threshold
    }

    /// Flat cell index of a coordinate: `y * nx + x`.
    #[inline]
    pub fn grid_to_index(&self, coord: GridCoord) -> i32 {
        coord.y * self.nx as i32 + coord.x
    }

    /// Coordinate of a flat cell index.
    #[inline]
    pub fn index_to_grid(&self, index: i32) -> GridCoord {
        GridCoord::new(index % self.nx as i32, index / self.nx as i32)
    }

    /// Convert world coordinates to grid coordinates.
    ///
    /// Returns `None` when the point falls outside the grid.
    #[inline]
    pub fn world_to_map(&self, point: WorldPoint) -> Option<GridCoord> {
        let x = ((point.x - self.origin.x) / self.resolution).floor() as i32;
        let y = ((point.y - self.origin.y) / self.resolution).floor() as i32;
        let coord = GridCoord::new(x, y);
        if self.is_inside(coord) {
            Some(coord)
        } else {
            None
        }
    }

    /// Convert grid coordinates to world coordinates (cell center).
    #[inline]
    pub fn map_to_world(&self, coord: GridCoord) -> WorldPoint {
        WorldPoint::new(
            self.origin.x + (coord.x as f32 + 0.5) * self.resolution,
            self.origin.y + (coord.y as f32 + 0.5) * self.resolution,
        )
    }

    /// Paint the border row and column lethal.
    ///
    /// Keeps sampled tree growth away from the map edge.
    pub fn outline(&mut self) {
        if self.nx == 0 || self.ny == 0 {
            return;
        }
        for x in 0..self.nx {
            self.cells[x] = costs::LETHAL;
            self.cells[(self.ny - 1) * self.nx + x] = costs::LETHAL;
        }
        for y in 0..self.ny {
            self.cells[y * self.nx] = costs::LETHAL;
            self.cells[y * self.nx + self.nx - 1] = costs::LETHAL;
        }
    }

    /// Check if line-of-sight is clear between two grid coordinates.
    ///
    /// Rasterizes the segment with Bresenham's algorithm and fails if any
    /// cell on the line, both endpoints included, has cost at or above
    /// `threshold`.
    pub fn line_of_sight(&self, from: GridCoord, to: GridCoord, threshold: u8) -> bool {
        let mut x0 = from.x;
        let mut y0 = from.y;
        let x1 = to.x;
        let y1 = to.y;

        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx - dy;

        loop {
            if self.is_blocked(GridCoord::new(x0, y0), threshold) {
                return false;
            }

            if x0 == x1 && y0 == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x0 += sx;
            }
            if e2 < dx {
                err += dx;
                y0 += sy;
            }
        }

        true
    }
}
