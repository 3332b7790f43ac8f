use rand::{rngs::StdRng, seq::index};

use super::is_endpoint;
use crate::grid::{Coord, Grid};

const CIRCLE_COUNT: usize = 5;
/// Angular sampling step, in radians.
const ANGLE_STEP: f64 = 0.01;
/// Share of sampled cells removed so the circles stay passable.
const REMOVAL_RATIO: f64 = 0.8;

/// Concentric circles around the grid center, sampled in polar coordinates and
/// then thinned out at random.
pub fn concentric_circles(
    grid: &Grid,
    endpoints: (Coord, Coord),
    rng: &mut StdRng,
) -> Vec<Coord> {
    let rows = grid.rows() as f64;
    let cols = grid.cols() as f64;
    let radius = rows.min(cols) / 2.0;
    let radius_step = radius / CIRCLE_COUNT as f64;
    let center_row = (rows / 2.0).floor();
    let center_col = (cols / 2.0).floor();

    let mut samples = Vec::new();
    for i in 0..CIRCLE_COUNT {
        let r = radius - i as f64 * radius_step;
        let mut angle = 0.0f64;
        while angle < 2.0 * std::f64::consts::PI {
            let coord = Coord::new(
                (center_row + r * angle.cos()).floor() as i32,
                (center_col + r * angle.sin()).floor() as i32,
            );
            if grid.in_bounds(coord) && !is_endpoint(coord, endpoints) {
                samples.push(coord);
            }
            angle += ANGLE_STEP;
        }
    }

    // Keep a random subset, in sampling order
    let keep = samples.len() - (samples.len() as f64 * REMOVAL_RATIO).floor() as usize;
    let mut kept = index::sample(rng, samples.len(), keep).into_vec();
    kept.sort_unstable();
    kept.into_iter().map(|i| samples[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::get_rng;

    #[test]
    fn test_circles_stay_in_bounds_and_thin_out() {
        let grid = Grid::new(30, 40, None);
        let endpoints = grid.source_and_dest();
        let cells = concentric_circles(&grid, endpoints, &mut get_rng(Some(4)));
        assert!(!cells.is_empty());
        assert!(cells.iter().all(|&c| grid.in_bounds(c)));
        // The outer circle touches the middle of the top and bottom rows
        let radius = 15.0;
        assert!(cells.iter().all(|c| {
            let d_row = (c.row - 15) as f64;
            let d_col = (c.col - 20) as f64;
            (d_row * d_row + d_col * d_col).sqrt() <= radius + 1.5
        }));
    }
}
