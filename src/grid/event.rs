use super::vertex::{Coord, Vertex};

/// Change notification sent from the grid to its observer (the renderer).
/// The grid never holds a reference into rendering state; it only emits these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridEvent {
    /// A grid of the given dimensions was created, with every cell empty.
    /// Source and destination follow as `Update` events.
    Initial { rows: u16, cols: u16 },
    /// A single cell changed from `old` to `new`.
    Update {
        coord: Coord,
        old: Vertex,
        new: Vertex,
    },
}

impl GridEvent {
    /// The coordinate touched by this event, if any.
    pub fn coord(&self) -> Option<Coord> {
        match self {
            GridEvent::Initial { .. } => None,
            GridEvent::Update { coord, .. } => Some(*coord),
        }
    }
}
