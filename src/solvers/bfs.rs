use std::collections::VecDeque;

use super::{TraversalResult, VisitedSet};
use crate::grid::{Coord, Grid, get_neighbors};

/// Breadth-first search. Marks cells visited on enqueue and stops as soon as the
/// destination is discovered, which yields a shortest path by edge count.
pub fn solve_bfs(grid: &Grid, source: Coord, dest: Coord) -> TraversalResult {
    let mut result = TraversalResult::new(source, dest);
    let mut visited = VisitedSet::new(grid);
    let mut queue = VecDeque::new();

    visited.insert(grid, source);
    queue.push_back(source);

    while let Some(current) = queue.pop_front() {
        for neighbor in get_neighbors(current, grid) {
            if !grid.is_traversable(neighbor) || !visited.insert(grid, neighbor) {
                continue;
            }
            result.discover(neighbor, current);
            if neighbor == dest {
                return result;
            }
            queue.push_back(neighbor);
        }
    }

    result
}
