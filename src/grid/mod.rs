mod event;
pub mod vertex;

use std::sync::mpsc::Sender;

pub use event::GridEvent;
pub use vertex::{Coord, PathDirection, Vertex};

use crate::error::{Error, Result};

/// Neighbor offsets in expansion order: up, right, down, left.
/// Every traversal relies on this order for reproducible output.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

/// Fixed-size, row-major matrix of vertices.
///
/// The grid owns every vertex. All mutation goes through its methods so that each
/// changed cell is reported once on the optional event channel.
#[derive(Debug)]
pub struct Grid {
    data: Box<[Vertex]>,
    rows: u16,
    cols: u16,
    sender: Option<Sender<GridEvent>>,
}

impl Grid {
    /// Smallest board on which the 30%/70% rule yields distinct source and destination.
    pub const MIN_ROWS: u16 = 1;
    pub const MIN_COLS: u16 = 2;

    /// Creates a `rows x cols` grid with the source at column ⌊cols·0.3⌋ and the
    /// destination at column ⌊cols·0.7⌋ on the middle row. Dimensions below the
    /// minimum viable size are clamped.
    pub fn new(rows: u16, cols: u16, sender: Option<Sender<GridEvent>>) -> Self {
        let (rows, cols) = Grid::clamp_dimensions(rows, cols);
        let data = (0..rows as i32)
            .flat_map(|row| (0..cols as i32).map(move |col| Vertex::new(Coord::new(row, col))))
            .collect::<Box<[Vertex]>>();
        if let Some(s) = &sender {
            let _ = s.send(GridEvent::Initial { rows, cols });
        }
        let mut grid = Grid {
            data,
            rows,
            cols,
            sender,
        };
        let (source, dest) = Grid::default_endpoints(rows, cols);
        grid.update(source, |v| v.is_source = true);
        grid.update(dest, |v| v.is_dest = true);
        grid
    }

    fn clamp_dimensions(rows: u16, cols: u16) -> (u16, u16) {
        let clamped = (rows.max(Grid::MIN_ROWS), cols.max(Grid::MIN_COLS));
        if clamped != (rows, cols) {
            tracing::warn!(
                "Grid dimensions {}x{} are below the minimum, clamped to {}x{}",
                rows,
                cols,
                clamped.0,
                clamped.1
            );
        }
        clamped
    }

    fn default_endpoints(rows: u16, cols: u16) -> (Coord, Coord) {
        let row = rows as i32 / 2;
        let source_col = (cols as f64 * 0.3).floor() as i32;
        let dest_col = (cols as f64 * 0.7).floor() as i32;
        (Coord::new(row, source_col), Coord::new(row, dest_col))
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// Number of cells in the grid.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.is_valid() && coord.row < self.rows as i32 && coord.col < self.cols as i32
    }

    /// Row-major index of `coord`, or `None` when out of bounds.
    pub fn ravel_index(&self, coord: Coord) -> Option<usize> {
        self.in_bounds(coord)
            .then(|| coord.row as usize * self.cols as usize + coord.col as usize)
    }

    pub fn get(&self, coord: Coord) -> Option<&Vertex> {
        self.ravel_index(coord).map(|idx| &self.data[idx])
    }

    /// Whether a traversal may step onto `coord`.
    pub fn is_traversable(&self, coord: Coord) -> bool {
        self.get(coord).is_some_and(Vertex::is_traversable)
    }

    /// All vertices in row-major order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.data.iter()
    }

    fn find_endpoints(&self) -> (Coord, Coord) {
        let mut source = Coord::INVALID;
        let mut dest = Coord::INVALID;
        for v in self.data.iter() {
            if v.is_source {
                source = v.coord;
            } else if v.is_dest {
                dest = v.coord;
            }
        }
        (source, dest)
    }

    /// Returns the source and destination coordinates.
    /// A missing endpoint comes back as [`Coord::INVALID`] and is logged; callers must
    /// treat a negative coordinate as "no path possible".
    pub fn source_and_dest(&self) -> (Coord, Coord) {
        let (source, dest) = self.find_endpoints();
        if !source.is_valid() || !dest.is_valid() {
            tracing::warn!("Source {} or destination {} is not valid", source, dest);
        }
        (source, dest)
    }

    /// Same as [`Grid::source_and_dest`], but a missing endpoint is an [`Error::State`].
    pub fn endpoints(&self) -> Result<(Coord, Coord)> {
        match self.source_and_dest() {
            (source, dest) if source.is_valid() && dest.is_valid() => Ok((source, dest)),
            (source, dest) => Err(Error::State(format!(
                "grid has no valid source/destination (source {}, destination {})",
                source, dest
            ))),
        }
    }

    /// Checks that exactly one source and one destination exist and that neither is a wall.
    pub fn is_settled(&self) -> bool {
        let sources = self.data.iter().filter(|v| v.is_source).count();
        let dests = self.data.iter().filter(|v| v.is_dest).count();
        let exclusive = self
            .data
            .iter()
            .all(|v| !(v.is_source && v.is_dest) && !(v.is_wall && v.is_endpoint()));
        sources == 1 && dests == 1 && exclusive
    }

    /// Applies `f` to the vertex at `coord` and reports the change, if any.
    /// Out-of-bounds coordinates are ignored.
    fn update<F: FnOnce(&mut Vertex)>(&mut self, coord: Coord, f: F) {
        let Some(idx) = self.ravel_index(coord) else {
            return;
        };
        let old = self.data[idx];
        let mut new = old;
        f(&mut new);
        if old != new {
            self.data[idx] = new;
            if let Some(sender) = &self.sender {
                let _ = sender.send(GridEvent::Update { coord, old, new });
            }
        }
    }

    fn update_all<F: Fn(&mut Vertex)>(&mut self, f: F) {
        for idx in 0..self.data.len() {
            let coord = self.data[idx].coord;
            self.update(coord, &f);
        }
    }

    /// Restores the initial layout in place: endpoints at their default positions,
    /// no walls, no visited or path cells, unit weights.
    pub fn reset(&mut self) {
        let (source, dest) = Grid::default_endpoints(self.rows, self.cols);
        self.update_all(|v| {
            let mut fresh = Vertex::new(v.coord);
            fresh.is_source = v.coord == source;
            fresh.is_dest = v.coord == dest;
            *v = fresh;
        });
    }

    /// Clears every wall. Idempotent.
    pub fn reset_walls(&mut self) {
        self.update_all(|v| v.is_wall = false);
    }

    /// Clears visited, path and highlight marks. Walls and endpoints are untouched. Idempotent.
    pub fn reset_visited_and_path(&mut self) {
        self.update_all(|v| {
            v.is_visited = false;
            v.is_path = false;
            v.is_highlighted = false;
            v.direction = None;
        });
    }

    fn reject(msg: String) -> Error {
        tracing::warn!("Rejected edit: {}", msg);
        Error::InvariantViolation(msg)
    }

    fn checked_vertex(&self, coord: Coord, op: &str) -> Result<Vertex> {
        self.get(coord)
            .copied()
            .ok_or_else(|| Grid::reject(format!("cannot {} at {}: out of bounds", op, coord)))
    }

    /// Sets or clears a wall. Walls may not be placed on the source or destination.
    pub fn set_wall(&mut self, coord: Coord, value: bool) -> Result<()> {
        let target = self.checked_vertex(coord, "set wall")?;
        if value && target.is_endpoint() {
            return Err(Grid::reject(format!(
                "cannot place a wall on endpoint {}",
                coord
            )));
        }
        self.update(coord, |v| v.is_wall = value);
        Ok(())
    }

    /// Moves the source to `coord`. Rejected if the target is a wall or the destination.
    pub fn move_source(&mut self, coord: Coord) -> Result<()> {
        let target = self.checked_vertex(coord, "move source")?;
        if target.is_source {
            return Ok(());
        }
        if target.is_wall || target.is_dest {
            return Err(Grid::reject(format!(
                "cannot move source onto {} cell {}",
                if target.is_wall { "wall" } else { "destination" },
                coord
            )));
        }
        let (source, _) = self.find_endpoints();
        self.update(source, |v| v.is_source = false);
        self.update(coord, |v| v.is_source = true);
        Ok(())
    }

    /// Moves the destination to `coord`. Rejected if the target is a wall or the source.
    pub fn move_dest(&mut self, coord: Coord) -> Result<()> {
        let target = self.checked_vertex(coord, "move destination")?;
        if target.is_dest {
            return Ok(());
        }
        if target.is_wall || target.is_source {
            return Err(Grid::reject(format!(
                "cannot move destination onto {} cell {}",
                if target.is_wall { "wall" } else { "source" },
                coord
            )));
        }
        let (_, dest) = self.find_endpoints();
        self.update(dest, |v| v.is_dest = false);
        self.update(coord, |v| v.is_dest = true);
        Ok(())
    }

    /// Sets the cost of entering `coord`. Weights below 1 would break A*'s heuristic.
    pub fn set_weight(&mut self, coord: Coord, weight: u32) -> Result<()> {
        let target = self.checked_vertex(coord, "set weight")?;
        if weight < Vertex::DEFAULT_WEIGHT {
            return Err(Grid::reject(format!(
                "weight {} at {} is below the minimum of {}",
                weight,
                coord,
                Vertex::DEFAULT_WEIGHT
            )));
        }
        if target.is_wall {
            return Err(Grid::reject(format!("cannot weight wall cell {}", coord)));
        }
        self.update(coord, |v| v.weight = weight);
        Ok(())
    }

    /// Builds a grid from rows of characters: `S` source, `D` destination, `#` wall.
    #[cfg(test)]
    pub(crate) fn from_rows(rows: &[&str]) -> Grid {
        let mut grid = Grid::new(rows.len() as u16, rows[0].len() as u16, None);
        let cells = rows
            .iter()
            .enumerate()
            .flat_map(|(r, line)| {
                line.chars()
                    .enumerate()
                    .map(move |(c, ch)| (Coord::new(r as i32, c as i32), ch))
            })
            .collect::<Vec<_>>();
        // Endpoints first, so walls never land on a default endpoint position
        for &(coord, _) in cells.iter().filter(|(_, ch)| *ch == 'S') {
            grid.move_source(coord).unwrap();
        }
        for &(coord, _) in cells.iter().filter(|(_, ch)| *ch == 'D') {
            grid.move_dest(coord).unwrap();
        }
        for &(coord, _) in cells.iter().filter(|(_, ch)| *ch == '#') {
            grid.set_wall(coord, true).unwrap();
        }
        grid
    }

    /// Mutates a cell without any invariant checks, for building broken grids in tests.
    #[cfg(test)]
    pub(crate) fn force_update<F: FnOnce(&mut Vertex)>(&mut self, coord: Coord, f: F) {
        self.update(coord, f);
    }

    pub(crate) fn set_visited(&mut self, coord: Coord) {
        self.update(coord, |v| v.is_visited = true);
    }

    pub(crate) fn set_path(&mut self, coord: Coord, direction: Option<PathDirection>) {
        self.update(coord, |v| {
            v.is_path = true;
            v.direction = direction;
        });
    }

    pub(crate) fn set_highlighted(&mut self, coord: Coord) {
        self.update(coord, |v| v.is_highlighted = true);
    }
}

impl std::ops::Index<Coord> for Grid {
    type Output = Vertex;

    fn index(&self, coord: Coord) -> &Self::Output {
        match self.ravel_index(coord) {
            Some(idx) => &self.data[idx],
            None => panic!("The given coordinate {} is out of bounds", coord),
        }
    }
}

/// Get neighbors of a cell, in the fixed order up, right, down, left.
/// Only in-bounds coordinates are yielded; walls are not filtered.
pub fn get_neighbors(coord: Coord, grid: &Grid) -> impl Iterator<Item = Coord> + '_ {
    NEIGHBOR_OFFSETS
        .into_iter()
        .map(move |(d_row, d_col)| coord.offset(d_row, d_col))
        .filter(move |&c| grid.in_bounds(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_places_endpoints() {
        let grid = Grid::new(5, 10, None);
        assert_eq!(grid.source_and_dest(), (Coord::new(2, 3), Coord::new(2, 7)));
        assert!(grid.is_settled());
        assert_eq!(grid.len(), 50);
        assert!(grid.vertices().all(|v| !v.is_wall && v.weight == 1));
    }

    #[test]
    fn test_init_clamps_to_minimum() {
        let grid = Grid::new(0, 0, None);
        assert_eq!((grid.rows(), grid.cols()), (1, 2));
        assert_eq!(grid.source_and_dest(), (Coord::new(0, 0), Coord::new(0, 1)));
        assert!(grid.is_settled());
    }

    #[test]
    fn test_missing_endpoint_is_state_error() {
        let mut grid = Grid::new(3, 3, None);
        let (_, dest) = grid.source_and_dest();
        grid.update(dest, |v| v.is_dest = false);
        let (source, dest) = grid.source_and_dest();
        assert!(source.is_valid());
        assert_eq!(dest, Coord::INVALID);
        assert!(matches!(grid.endpoints(), Err(Error::State(_))));
    }

    #[test]
    fn test_neighbor_order() {
        let grid = Grid::new(5, 5, None);
        let neighbors = get_neighbors(Coord::new(2, 2), &grid).collect::<Vec<_>>();
        assert_eq!(
            neighbors,
            vec![
                Coord::new(1, 2),
                Coord::new(2, 3),
                Coord::new(3, 2),
                Coord::new(2, 1)
            ]
        );
        let corner = get_neighbors(Coord::new(0, 0), &grid).collect::<Vec<_>>();
        assert_eq!(corner, vec![Coord::new(0, 1), Coord::new(1, 0)]);
    }

    #[test]
    fn test_wall_on_endpoint_rejected() {
        let mut grid = Grid::new(5, 5, None);
        let (source, dest) = grid.source_and_dest();
        assert!(matches!(
            grid.set_wall(source, true),
            Err(Error::InvariantViolation(_))
        ));
        assert!(matches!(
            grid.set_wall(dest, true),
            Err(Error::InvariantViolation(_))
        ));
        assert!(!grid[source].is_wall);
        assert!(grid.set_wall(Coord::new(0, 0), true).is_ok());
        assert!(grid[Coord::new(0, 0)].is_wall);
        assert!(grid.set_wall(Coord::new(9, 9), true).is_err());
    }

    #[test]
    fn test_move_dest_onto_wall_rejected() {
        let mut grid = Grid::new(5, 5, None);
        let wall = Coord::new(0, 4);
        grid.set_wall(wall, true).unwrap();
        let (_, dest) = grid.source_and_dest();

        assert!(matches!(
            grid.move_dest(wall),
            Err(Error::InvariantViolation(_))
        ));
        assert!(grid[wall].is_wall);
        assert!(!grid[wall].is_dest);
        assert!(grid[dest].is_dest);
        assert!(grid.is_settled());
    }

    #[test]
    fn test_move_endpoints() {
        let mut grid = Grid::new(5, 5, None);
        let (source, dest) = grid.source_and_dest();
        assert!(grid.move_source(dest).is_err());
        assert!(grid.move_dest(source).is_err());

        grid.move_source(Coord::new(0, 0)).unwrap();
        grid.move_dest(Coord::new(4, 4)).unwrap();
        assert_eq!(
            grid.source_and_dest(),
            (Coord::new(0, 0), Coord::new(4, 4))
        );
        assert!(!grid[source].is_source);
        assert!(grid.is_settled());
        // Moving onto itself is a no-op
        grid.move_source(Coord::new(0, 0)).unwrap();
        assert!(grid.is_settled());
    }

    #[test]
    fn test_resets_are_idempotent() {
        let mut grid = Grid::new(4, 4, None);
        grid.set_wall(Coord::new(0, 0), true).unwrap();
        grid.set_visited(Coord::new(1, 1));
        grid.set_path(Coord::new(1, 1), Some(PathDirection::Up));

        grid.reset_visited_and_path();
        grid.reset_visited_and_path();
        assert!(grid[Coord::new(0, 0)].is_wall);
        assert!(!grid[Coord::new(1, 1)].is_visited);
        assert!(!grid[Coord::new(1, 1)].is_path);
        assert_eq!(grid[Coord::new(1, 1)].direction, None);

        grid.reset_walls();
        grid.reset_walls();
        assert!(grid.vertices().all(|v| !v.is_wall));
        assert!(grid.is_settled());
    }

    #[test]
    fn test_full_reset_restores_layout() {
        let mut grid = Grid::new(5, 10, None);
        grid.move_source(Coord::new(0, 0)).unwrap();
        grid.set_wall(Coord::new(4, 9), true).unwrap();
        grid.set_weight(Coord::new(1, 1), 5).unwrap();
        grid.reset();
        assert_eq!(grid.source_and_dest(), (Coord::new(2, 3), Coord::new(2, 7)));
        assert!(grid.vertices().all(|v| !v.is_wall && v.weight == 1));
        assert!(grid.is_settled());
    }

    #[test]
    fn test_set_weight_validation() {
        let mut grid = Grid::new(3, 3, None);
        assert!(grid.set_weight(Coord::new(0, 0), 0).is_err());
        grid.set_wall(Coord::new(0, 1), true).unwrap();
        assert!(grid.set_weight(Coord::new(0, 1), 3).is_err());
        grid.set_weight(Coord::new(0, 0), 3).unwrap();
        assert_eq!(grid[Coord::new(0, 0)].weight, 3);
    }

    #[test]
    fn test_events_are_emitted_only_on_change() {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut grid = Grid::new(3, 4, Some(tx));
        let events = rx.try_iter().collect::<Vec<_>>();
        assert_eq!(events[0], GridEvent::Initial { rows: 3, cols: 4 });
        // Source and destination updates follow the initial event
        assert_eq!(events.len(), 3);

        grid.set_wall(Coord::new(0, 0), true).unwrap();
        grid.set_wall(Coord::new(0, 0), true).unwrap();
        let events = rx.try_iter().collect::<Vec<_>>();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].coord(), Some(Coord::new(0, 0)));

        // Rejected edits emit nothing
        let (source, _) = grid.source_and_dest();
        assert!(grid.set_wall(source, true).is_err());
        assert_eq!(rx.try_iter().count(), 0);
    }
}
