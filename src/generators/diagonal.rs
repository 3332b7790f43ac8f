use rand::{Rng, rngs::StdRng};

use super::is_endpoint;
use crate::grid::{Coord, Grid};

/// Line from the top-left to the bottom-right corner using Bresenham's algorithm,
/// with one random cell removed as an exit.
pub fn diagonal_line(grid: &Grid, endpoints: (Coord, Coord), rng: &mut StdRng) -> Vec<Coord> {
    let (mut x0, mut y0) = (0i32, 0i32);
    let (x1, y1) = (grid.cols() as i32 - 1, grid.rows() as i32 - 1);

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    let mut cells = Vec::new();
    loop {
        let coord = Coord::new(y0, x0);
        if !is_endpoint(coord, endpoints) {
            cells.push(coord);
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

    if !cells.is_empty() {
        cells.remove(rng.random_range(0..cells.len()));
    }
    cells
}
