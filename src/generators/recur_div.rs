use rand::{Rng, rngs::StdRng, seq::IndexedRandom};

use super::{GenerationResult, is_endpoint};
use crate::grid::{Coord, Grid};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Orientation {
    Horizontal,
    Vertical,
}

/// Recursive division maze.
///
/// Walls the border, then splits the open interior with single wall lines, each
/// with one passage cell. A wall line sits at an odd offset from its region's
/// start, never on the source's or destination's row/column, never next to
/// another wall, and both of its ends must abut existing walls so it cannot close
/// off a passage. A region with no valid line is left open.
pub fn recursive_division(
    grid: &Grid,
    endpoints: (Coord, Coord),
    rng: &mut StdRng,
) -> GenerationResult {
    let mut division = Division {
        walls: vec![false; grid.len()],
        rows: grid.rows() as i32,
        cols: grid.cols() as i32,
        endpoints,
        result: GenerationResult::default(),
    };
    division.wall_border();
    division.divide((1, 1), division.cols - 2, division.rows - 2, rng);
    division.result
}

struct Division {
    walls: Vec<bool>,
    rows: i32,
    cols: i32,
    endpoints: (Coord, Coord),
    result: GenerationResult,
}

impl Division {
    /// Cells outside the grid count as walls.
    fn is_wall(&self, row: i32, col: i32) -> bool {
        if row < 0 || col < 0 || row >= self.rows || col >= self.cols {
            return true;
        }
        self.walls[(row * self.cols + col) as usize]
    }

    fn place(&mut self, row: i32, col: i32) {
        let coord = Coord::new(row, col);
        if self.is_wall(row, col) || is_endpoint(coord, self.endpoints) {
            return;
        }
        self.walls[(row * self.cols + col) as usize] = true;
        self.result.cells.push(coord);
    }

    /// Walls the border clockwise from the top-left corner.
    fn wall_border(&mut self) {
        let (last_row, last_col) = (self.rows - 1, self.cols - 1);
        (0..=last_col).for_each(|col| self.place(0, col));
        (0..=last_row).for_each(|row| self.place(row, last_col));
        (0..=last_col).rev().for_each(|col| self.place(last_row, col));
        (0..=last_row).rev().for_each(|row| self.place(row, 0));
    }

    /// Divides the open rectangle whose top-left cell is `top_left` (col, row).
    fn divide(&mut self, top_left: (i32, i32), width: i32, height: i32, rng: &mut StdRng) {
        if width <= 1 || height <= 1 {
            return;
        }

        let (x, y) = top_left;
        let (source, dest) = self.endpoints;

        let orientation = match width.cmp(&height) {
            std::cmp::Ordering::Less => Orientation::Horizontal,
            std::cmp::Ordering::Greater => Orientation::Vertical,
            std::cmp::Ordering::Equal => {
                if rng.random_bool(0.5) {
                    Orientation::Horizontal
                } else {
                    Orientation::Vertical
                }
            }
        };

        match orientation {
            Orientation::Horizontal => {
                let candidates = (y + 1..y + height)
                    .step_by(2)
                    .filter(|&wy| wy != source.row && wy != dest.row)
                    .filter(|&wy| !self.is_wall(wy - 1, x) && !self.is_wall(wy + 1, x))
                    .filter(|&wy| self.is_wall(wy, x - 1) && self.is_wall(wy, x + width))
                    .collect::<Vec<_>>();
                let Some(&y_wall) = candidates.choose(rng) else {
                    self.dead_end(top_left, width, height);
                    return;
                };

                // Randomly choose a position for the passage in the wall
                let x_hole = x + rng.random_range(0..width);
                (x..x + width)
                    .filter(|&col| col != x_hole)
                    .for_each(|col| self.place(y_wall, col));

                // Recursively divide the regions above and below the wall
                self.divide((x, y), width, y_wall - y, rng);
                self.divide((x, y_wall + 1), width, y + height - y_wall - 1, rng);
            }
            Orientation::Vertical => {
                let candidates = (x + 1..x + width)
                    .step_by(2)
                    .filter(|&wx| wx != source.col && wx != dest.col)
                    .filter(|&wx| !self.is_wall(y, wx - 1) && !self.is_wall(y, wx + 1))
                    .filter(|&wx| self.is_wall(y - 1, wx) && self.is_wall(y + height, wx))
                    .collect::<Vec<_>>();
                let Some(&x_wall) = candidates.choose(rng) else {
                    self.dead_end(top_left, width, height);
                    return;
                };

                let y_hole = y + rng.random_range(0..height);
                (y..y + height)
                    .filter(|&row| row != y_hole)
                    .for_each(|row| self.place(row, x_wall));

                // Recursively divide the regions left and right of the wall
                self.divide((x, y), x_wall - x, height, rng);
                self.divide((x_wall + 1, y), x + width - x_wall - 1, height, rng);
            }
        }
    }

    fn dead_end(&mut self, top_left: (i32, i32), width: i32, height: i32) {
        tracing::debug!(
            "No wall fits the {}x{} region at {:?}, leaving it open",
            width,
            height,
            top_left
        );
        self.result.dead_ends += 1;
    }
}
