use std::collections::HashMap;

mod astar;
mod bfs;
mod dfs;
mod dijkstra;

use crate::error::{Error, Result};
use crate::grid::{Coord, Grid};
use astar::solve_astar;
use bfs::solve_bfs;
use dfs::solve_dfs;
use dijkstra::solve_dijkstra;

/// Output of a traversal: the discovery order plus the parent map needed to rebuild the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalResult {
    /// Coordinates in the order they were discovered. Never contains the source.
    pub visited_order: Vec<Coord>,
    /// Back-pointer from each discovered vertex to the vertex that discovered it.
    pub parents: HashMap<Coord, Coord>,
    pub source: Coord,
    pub dest: Coord,
}

impl TraversalResult {
    fn new(source: Coord, dest: Coord) -> Self {
        TraversalResult {
            visited_order: Vec::new(),
            parents: HashMap::new(),
            source,
            dest,
        }
    }

    /// Records the discovery of `coord` from `parent`.
    fn discover(&mut self, coord: Coord, parent: Coord) {
        self.visited_order.push(coord);
        self.parents.insert(coord, parent);
    }

    /// Whether the destination was reached.
    pub fn found_dest(&self) -> bool {
        self.source == self.dest || self.parents.contains_key(&self.dest)
    }

    /// Walks the parent map backward from the destination and returns the path in
    /// source → destination order, both ends included.
    pub fn path(&self) -> Result<Vec<Coord>> {
        if self.source == self.dest {
            return Ok(vec![self.source]);
        }
        let mut path = vec![self.dest];
        let mut current = self.dest;
        // A well-formed parent chain has at most one entry per discovered vertex
        while current != self.source {
            if path.len() > self.parents.len() + 1 {
                return Err(Error::Unreachable);
            }
            current = *self.parents.get(&current).ok_or(Error::Unreachable)?;
            path.push(current);
        }
        path.reverse();
        Ok(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Solver {
    Bfs,
    Dfs,
    Dijkstra,
    AStar,
}

impl Solver {
    pub const ALL: [Solver; 4] = [Solver::Bfs, Solver::Dfs, Solver::Dijkstra, Solver::AStar];

    /// Registry key used by the front-end.
    pub fn key(&self) -> &'static str {
        match self {
            Solver::Bfs => "bfs",
            Solver::Dfs => "dfs",
            Solver::Dijkstra => "dijkstra",
            Solver::AStar => "astar",
        }
    }
}

impl std::fmt::Display for Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Solver::Bfs => write!(f, "Breadth-First Search (BFS)"),
            Solver::Dfs => write!(f, "Depth-First Search (DFS)"),
            Solver::Dijkstra => write!(f, "Dijkstra's Algorithm"),
            Solver::AStar => write!(f, "A* Search"),
        }
    }
}

impl std::str::FromStr for Solver {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Solver::ALL
            .into_iter()
            .find(|solver| solver.key() == s)
            .ok_or_else(|| Error::Config(format!("unknown algorithm key '{}'", s)))
    }
}

/// Runs `solver` on a snapshot of `grid`.
/// Fails with [`Error::State`] when the grid has no source or destination.
pub fn solve(grid: &Grid, solver: Solver) -> Result<TraversalResult> {
    let (source, dest) = grid.endpoints()?;
    let result = solve_between(grid, solver, source, dest);
    tracing::debug!(
        "{} visited {} cells, destination {}",
        solver,
        result.visited_order.len(),
        if result.found_dest() { "found" } else { "not found" }
    );
    Ok(result)
}

fn solve_between(grid: &Grid, solver: Solver, source: Coord, dest: Coord) -> TraversalResult {
    if source == dest {
        return TraversalResult::new(source, dest);
    }
    match solver {
        Solver::Bfs => solve_bfs(grid, source, dest),
        Solver::Dfs => solve_dfs(grid, source, dest),
        Solver::Dijkstra => solve_dijkstra(grid, source, dest),
        Solver::AStar => solve_astar(grid, source, dest),
    }
}

/// Dense per-cell flags sized to the grid.
struct VisitedSet {
    visited: Vec<bool>,
}

impl VisitedSet {
    fn new(grid: &Grid) -> Self {
        VisitedSet {
            visited: vec![false; grid.len()],
        }
    }

    /// Marks `coord` visited and returns whether it was newly marked.
    fn insert(&mut self, grid: &Grid, coord: Coord) -> bool {
        match grid.ravel_index(coord) {
            Some(idx) if !self.visited[idx] => {
                self.visited[idx] = true;
                true
            }
            _ => false,
        }
    }
}
