use super::{TraversalResult, VisitedSet};
use crate::grid::{Coord, Grid, NEIGHBOR_OFFSETS};

/// Depth-first search with an explicit stack.
///
/// Each stack frame keeps the index of the next neighbor to try, so the visiting
/// order matches a recursive descent exactly without being bound by the call stack.
/// The resulting path is not necessarily the shortest.
pub fn solve_dfs(grid: &Grid, source: Coord, dest: Coord) -> TraversalResult {
    let mut result = TraversalResult::new(source, dest);
    let mut visited = VisitedSet::new(grid);

    visited.insert(grid, source);
    let mut stack = vec![(source, 0usize)];

    while let Some((current, next)) = stack.last_mut() {
        let Some(&(d_row, d_col)) = NEIGHBOR_OFFSETS.get(*next) else {
            // All neighbors tried, backtrack
            stack.pop();
            continue;
        };
        *next += 1;
        let parent = *current;
        let neighbor = parent.offset(d_row, d_col);

        if !grid.is_traversable(neighbor) || !visited.insert(grid, neighbor) {
            continue;
        }
        result.discover(neighbor, parent);
        if neighbor == dest {
            break;
        }
        stack.push((neighbor, 0));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dfs_follows_first_direction() {
        let grid = Grid::from_rows(&["....", "S...", "...D"]);
        let result = solve_dfs(&grid, Coord::new(1, 0), Coord::new(2, 3));
        // Goes up first, then right along the top row, then down
        assert_eq!(
            &result.visited_order[..5],
            &[
                Coord::new(0, 0),
                Coord::new(0, 1),
                Coord::new(0, 2),
                Coord::new(0, 3),
                Coord::new(1, 3)
            ]
        );
        assert_eq!(result.visited_order.last(), Some(&Coord::new(2, 3)));
        assert_eq!(result.path().unwrap().len(), 7);
    }

    #[test]
    fn test_dfs_handles_large_open_grid() {
        let mut grid = Grid::new(200, 200, None);
        grid.move_source(Coord::new(0, 0)).unwrap();
        grid.move_dest(Coord::new(199, 199)).unwrap();
        let result = solve_dfs(&grid, Coord::new(0, 0), Coord::new(199, 199));
        assert!(result.found_dest());
    }
}
