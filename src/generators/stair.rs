use crate::grid::{Coord, Grid};

/// Staircase zig-zagging from the bottom-left corner.
///
/// The first leg climbs diagonally to the top row, the second descends to the
/// row above the bottom, and the third climbs again, stopping one column short
/// of the right edge. When a leg runs out of columns its last cell is dropped
/// so the stair leaves an exit.
pub fn simple_stair(grid: &Grid) -> Vec<Coord> {
    let rows = grid.rows() as i32;
    let cols = grid.cols() as i32;
    let mut cells = Vec::new();

    // Climb to the top row
    let (mut row, mut col) = (rows - 1, 0);
    while row >= 0 && col < cols {
        cells.push(Coord::new(row, col));
        row -= 1;
        col += 1;
    }
    if col >= cols {
        cells.pop();
        return cells;
    }

    // Descend, leaving the bottom row open
    row = 1;
    while row < rows - 1 && col < cols {
        cells.push(Coord::new(row, col));
        row += 1;
        col += 1;
    }
    if col >= cols {
        cells.pop();
        return cells;
    }

    // Climb again, leaving the last column open
    row -= 2;
    while row >= 0 && col < cols - 1 {
        cells.push(Coord::new(row, col));
        row -= 1;
        col += 1;
    }

    cells
}
