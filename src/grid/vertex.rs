use crossterm::style::{Color, Stylize};

use std::fmt;

/// A (row, col) position on the grid.
/// Signed so that the `(-1, -1)` sentinel for a missing endpoint is representable.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub row: i32,
    pub col: i32,
}

impl Coord {
    /// Sentinel returned when the grid has no source or destination.
    pub const INVALID: Coord = Coord { row: -1, col: -1 };

    pub const fn new(row: i32, col: i32) -> Self {
        Coord { row, col }
    }

    /// A negative coordinate means "no such cell", and therefore no path is possible.
    pub fn is_valid(&self) -> bool {
        self.row >= 0 && self.col >= 0
    }

    pub fn offset(self, d_row: i32, d_col: i32) -> Coord {
        Coord::new(self.row + d_row, self.col + d_col)
    }

    pub fn manhattan(&self, other: Coord) -> u64 {
        (self.row.abs_diff(other.row) + self.col.abs_diff(other.col)) as u64
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Direction of a path step, used only to draw the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathDirection {
    Up,
    Down,
    Left,
    Right,
}

impl PathDirection {
    /// Direction of the move from `from` to `to`.
    /// Returns `None` unless the two cells are 4-adjacent.
    pub fn between(from: Coord, to: Coord) -> Option<PathDirection> {
        match (to.row - from.row, to.col - from.col) {
            (-1, 0) => Some(PathDirection::Up),
            (1, 0) => Some(PathDirection::Down),
            (0, -1) => Some(PathDirection::Left),
            (0, 1) => Some(PathDirection::Right),
            _ => None,
        }
    }
}

/// Full state of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub coord: Coord,
    pub is_source: bool,
    pub is_dest: bool,
    pub is_wall: bool,
    pub is_visited: bool,
    pub is_path: bool,
    /// Overlay set by pattern playback in highlight mode.
    pub is_highlighted: bool,
    /// Cost of entering this cell, used by Dijkstra and A*.
    pub weight: u32,
    pub direction: Option<PathDirection>,
}

impl Vertex {
    pub const DEFAULT_WEIGHT: u32 = 1;
    /// The width of each cell when rendered, in character widths.
    pub const CELL_WIDTH: u16 = 2;

    pub fn new(coord: Coord) -> Self {
        Vertex {
            coord,
            is_source: false,
            is_dest: false,
            is_wall: false,
            is_visited: false,
            is_path: false,
            is_highlighted: false,
            weight: Vertex::DEFAULT_WEIGHT,
            direction: None,
        }
    }

    /// Whether a traversal may step onto this cell.
    pub fn is_traversable(&self) -> bool {
        !self.is_wall
    }

    pub fn is_endpoint(&self) -> bool {
        self.is_source || self.is_dest
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Precedence: endpoints, walls, path, visited, overlay, weight
        let styled_symbol = if self.is_source {
            "🟩".with(Color::Green)
        } else if self.is_dest {
            "🟥".with(Color::Red)
        } else if self.is_wall {
            "⬜".with(Color::White)
        } else if self.is_path {
            match self.direction {
                Some(PathDirection::Up) => "↑ ".with(Color::Yellow),
                Some(PathDirection::Down) => "↓ ".with(Color::Yellow),
                Some(PathDirection::Left) => "← ".with(Color::Yellow),
                Some(PathDirection::Right) => "→ ".with(Color::Yellow),
                None => "* ".with(Color::Yellow),
            }
        } else if self.is_visited {
            "* ".with(Color::Blue)
        } else if self.is_highlighted {
            "🟪".with(Color::Magenta)
        } else if self.weight > Vertex::DEFAULT_WEIGHT {
            "▒▒".with(Color::DarkGrey)
        } else {
            "  ".with(Color::Reset)
        };

        #[cfg(debug_assertions)]
        {
            use unicode_width::UnicodeWidthStr;
            assert_eq!(
                styled_symbol.content().width(),
                Vertex::CELL_WIDTH as usize,
                "Each cell must occupy exactly two character widths."
            );
        }

        write!(f, "{}", styled_symbol)
    }
}
