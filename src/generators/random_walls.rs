use rand::{Rng, rngs::StdRng, seq::SliceRandom};

use crate::grid::{Coord, Grid};

/// Probability of any single cell becoming a wall.
const WALL_DENSITY: f64 = 0.2;

/// Scatters walls over the grid, each cell chosen independently, in shuffled order.
/// The low density is what keeps the board mostly passable.
pub fn random_walls(grid: &Grid, rng: &mut StdRng) -> Vec<Coord> {
    let mut cells = grid
        .vertices()
        .filter(|v| !v.is_endpoint())
        .map(|v| v.coord)
        .filter(|_| rng.random_bool(WALL_DENSITY))
        .collect::<Vec<_>>();
    cells.shuffle(rng);
    cells
}
