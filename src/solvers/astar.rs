use super::TraversalResult;
use super::dijkstra::best_first_search;
use crate::grid::{Coord, Grid};

/// A* search, ordered by cost so far plus the Manhattan distance to the destination.
/// Manhattan distance never overestimates on a 4-connected grid with weights of at
/// least 1, so the first time the destination is popped its path is optimal.
pub fn solve_astar(grid: &Grid, source: Coord, dest: Coord) -> TraversalResult {
    best_first_search(grid, source, dest, |coord| coord.manhattan(dest))
}
