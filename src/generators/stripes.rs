use rand::{Rng, rngs::StdRng};

use super::is_endpoint;
use crate::grid::{Coord, Grid};

/// Gap between stripes, in columns.
const STRIPE_SPACING: usize = 3;

/// Vertical stripes on every third column, each with one random gap.
pub fn vertical_stripes(grid: &Grid, endpoints: (Coord, Coord), rng: &mut StdRng) -> Vec<Coord> {
    let mut cells = Vec::new();
    for col in (0..grid.cols() as i32).step_by(STRIPE_SPACING) {
        let mut stripe = (0..grid.rows() as i32)
            .map(|row| Coord::new(row, col))
            .filter(|&c| !is_endpoint(c, endpoints))
            .collect::<Vec<_>>();
        if !stripe.is_empty() {
            stripe.remove(rng.random_range(0..stripe.len()));
        }
        cells.extend(stripe);
    }
    cells
}
