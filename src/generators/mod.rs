use std::collections::HashSet;

use rand::{SeedableRng, rngs::StdRng};

mod circles;
mod diagonal;
mod random_walls;
mod recur_div;
mod stair;
mod stripes;

use crate::error::{Error, Result};
use crate::grid::{Coord, Grid};
use circles::concentric_circles;
use diagonal::diagonal_line;
use random_walls::random_walls;
use recur_div::recursive_division;
use stair::simple_stair;
use stripes::vertical_stripes;

/// Get a random number generator, optionally seeded for reproducibility.
fn get_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

/// Ordered cells produced by a generator, to be turned into walls or highlighted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResult {
    pub cells: Vec<Coord>,
    /// Subregions the maze generator had to leave open because no wall fit.
    pub dead_ends: usize,
}

/// How a generation result is drawn onto the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// Cells become walls
    Walls,
    /// Cells get the highlight overlay; walls are untouched
    Highlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generator {
    RecurDiv,
    RandomWalls,
    SimpleStair,
    DiagonalLine,
    ConcentricCircles,
    VerticalStripes,
}

impl Generator {
    pub const ALL: [Generator; 6] = [
        Generator::RecurDiv,
        Generator::RandomWalls,
        Generator::SimpleStair,
        Generator::DiagonalLine,
        Generator::ConcentricCircles,
        Generator::VerticalStripes,
    ];

    /// Registry key used by the front-end.
    pub fn key(&self) -> &'static str {
        match self {
            Generator::RecurDiv => "recursive-division",
            Generator::RandomWalls => "random-walls",
            Generator::SimpleStair => "simple-stair",
            Generator::DiagonalLine => "diagonal-line",
            Generator::ConcentricCircles => "concentric-circles",
            Generator::VerticalStripes => "vertical-stripes",
        }
    }
}

impl std::fmt::Display for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Generator::RecurDiv => write!(f, "Recursive Division"),
            Generator::RandomWalls => write!(f, "Random Walls"),
            Generator::SimpleStair => write!(f, "Simple Stair"),
            Generator::DiagonalLine => write!(f, "Diagonal Line"),
            Generator::ConcentricCircles => write!(f, "Concentric Circles"),
            Generator::VerticalStripes => write!(f, "Vertical Stripes"),
        }
    }
}

impl std::str::FromStr for Generator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Generator::ALL
            .into_iter()
            .find(|generator| generator.key() == s)
            .ok_or_else(|| Error::Config(format!("unknown generator key '{}'", s)))
    }
}

/// Runs `generator` on a snapshot of `grid`.
///
/// The output never contains the current source or destination and lists each cell
/// once, in first-generated order. Missing endpoints do not stop generation.
pub fn generate(grid: &Grid, generator: Generator, seed: Option<u64>) -> GenerationResult {
    let mut rng = get_rng(seed);
    let endpoints = grid.source_and_dest();

    let mut result = match generator {
        Generator::RecurDiv => recursive_division(grid, endpoints, &mut rng),
        Generator::RandomWalls => GenerationResult::from(random_walls(grid, &mut rng)),
        Generator::SimpleStair => GenerationResult::from(simple_stair(grid)),
        Generator::DiagonalLine => GenerationResult::from(diagonal_line(grid, endpoints, &mut rng)),
        Generator::ConcentricCircles => {
            GenerationResult::from(concentric_circles(grid, endpoints, &mut rng))
        }
        Generator::VerticalStripes => {
            GenerationResult::from(vertical_stripes(grid, endpoints, &mut rng))
        }
    };

    let (source, dest) = endpoints;
    let mut seen = HashSet::new();
    result
        .cells
        .retain(|&c| c != source && c != dest && grid.in_bounds(c) && seen.insert(c));
    tracing::debug!(
        "{} generated {} cells ({} dead ends)",
        generator,
        result.cells.len(),
        result.dead_ends
    );
    result
}

impl From<Vec<Coord>> for GenerationResult {
    fn from(cells: Vec<Coord>) -> Self {
        GenerationResult {
            cells,
            dead_ends: 0,
        }
    }
}

/// Whether `coord` is one of the endpoints.
fn is_endpoint(coord: Coord, endpoints: (Coord, Coord)) -> bool {
    coord == endpoints.0 || coord == endpoints.1
}
