use std::{cmp::Reverse, collections::BinaryHeap};

use super::TraversalResult;
use crate::grid::{Coord, Grid, get_neighbors};

/// Entry of the open set
#[derive(Debug, PartialEq, Eq)]
struct TrackedCell {
    /// Coordinates of the cell in the grid
    coord: Coord,
    /// Cost to reach this cell from the source
    traveling_cost: u64,
    /// Estimated cost to reach the destination from this cell (zero for Dijkstra)
    heuristic_cost: u64,
    /// Push order, so equal priorities pop first-in first-out
    seq: u64,
}

impl TrackedCell {
    fn priority(&self) -> (u64, u64) {
        (self.traveling_cost + self.heuristic_cost, self.seq)
    }
}

impl Ord for TrackedCell {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority().cmp(&other.priority())
    }
}

impl PartialOrd for TrackedCell {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Best-first search shared by Dijkstra and A*.
///
/// Entering a cell costs that cell's weight. Stale duplicates left in the queue by
/// later relaxations are skipped when popped, and the search ends when the
/// destination is popped. Weights are at least 1, so that cost is final.
pub(super) fn best_first_search<H>(
    grid: &Grid,
    source: Coord,
    dest: Coord,
    heuristic: H,
) -> TraversalResult
where
    H: Fn(Coord) -> u64,
{
    let mut result = TraversalResult::new(source, dest);
    let Some(source_idx) = grid.ravel_index(source) else {
        return result;
    };

    let mut costs = vec![u64::MAX; grid.len()];
    costs[source_idx] = 0;

    // Using Reverse to turn the max-heap into a min-heap
    let mut pq: BinaryHeap<Reverse<TrackedCell>> = BinaryHeap::new();
    let mut seq = 0;
    pq.push(Reverse(TrackedCell {
        coord: source,
        traveling_cost: 0,
        heuristic_cost: heuristic(source),
        seq,
    }));

    while let Some(Reverse(current)) = pq.pop() {
        if current.coord == dest {
            break;
        }
        let Some(current_idx) = grid.ravel_index(current.coord) else {
            continue;
        };
        if current.traveling_cost > costs[current_idx] {
            // Superseded by a cheaper entry
            continue;
        }

        for neighbor in get_neighbors(current.coord, grid) {
            let vertex = &grid[neighbor];
            if !vertex.is_traversable() {
                continue;
            }
            let Some(idx) = grid.ravel_index(neighbor) else {
                continue;
            };
            let new_cost = current.traveling_cost + vertex.weight as u64;
            if new_cost >= costs[idx] {
                continue;
            }
            if costs[idx] == u64::MAX {
                result.visited_order.push(neighbor);
            }
            costs[idx] = new_cost;
            result.parents.insert(neighbor, current.coord);
            seq += 1;
            pq.push(Reverse(TrackedCell {
                coord: neighbor,
                traveling_cost: new_cost,
                heuristic_cost: heuristic(neighbor),
                seq,
            }));
        }
    }

    result
}

/// Dijkstra's algorithm: best-first search ordered by cost from the source alone.
pub fn solve_dijkstra(grid: &Grid, source: Coord, dest: Coord) -> TraversalResult {
    best_first_search(grid, source, dest, |_| 0)
}
