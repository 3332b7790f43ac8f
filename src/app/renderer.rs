use std::{
    io::{Stdout, Write},
    sync::mpsc::Receiver,
};

use crossterm::{
    QueueableCommand, cursor, queue,
    style::{self, Attribute, Color, Stylize},
    terminal::{self, ClearType},
};

use crate::grid::{Coord, GridEvent, Vertex};

/// Draws grid events on the terminal. Runs on its own thread and owns stdout
/// until the grid's event channel closes.
pub struct Renderer {
    /// Standard output handle to write to the terminal
    stdout: Stdout,
    /// Current grid dimensions (rows, cols)
    grid_dims: Option<(u16, u16)>,
    /// Set when the terminal cannot fit the grid; updates are then dropped
    too_small: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Rows kept free below the grid for status messages
    pub const NUM_LOG_ROWS: u16 = 2;

    pub fn new() -> Self {
        Self {
            stdout: std::io::stdout(),
            grid_dims: None,
            too_small: false,
        }
    }

    /// Check if the terminal can show a grid of the given dimensions.
    /// If not, print a warning in place of the grid.
    fn check_size(stdout: &mut Stdout, rows: u16, cols: u16) -> std::io::Result<bool> {
        let (term_width, term_height) = terminal::size()?;
        if term_width < cols.saturating_mul(Vertex::CELL_WIDTH) || term_height < rows {
            let msg = format!(
                "Terminal size is too small ({}x{}) for the grid dimensions ({}x{}) to display. Please resize the terminal.\r\n",
                term_width, term_height, rows, cols
            );
            tracing::warn!("{}", msg.trim_end());
            queue!(
                stdout,
                terminal::Clear(ClearType::All),
                cursor::MoveTo(0, 0),
                style::PrintStyledContent(msg.with(Color::Yellow).attribute(Attribute::Bold)),
            )?;
            return Ok(false);
        }
        Ok(true)
    }

    /// Queue a single grid event. The caller flushes.
    fn render_grid_event(&mut self, event: &GridEvent) -> std::io::Result<()> {
        match event {
            GridEvent::Initial { rows, cols } => {
                let (rows, cols) = (*rows, *cols);
                self.grid_dims = Some((rows, cols));
                self.too_small = !Renderer::check_size(&mut self.stdout, rows, cols)?;
                if self.too_small {
                    return Ok(());
                }

                queue!(self.stdout, terminal::Clear(ClearType::All), cursor::MoveTo(0, 0))?;
                for row in 0..rows {
                    for col in 0..cols {
                        let empty = Vertex::new(Coord::new(row as i32, col as i32));
                        self.stdout.queue(style::Print(empty))?;
                    }
                    self.stdout.queue(style::Print("\r\n"))?;
                }
            }
            GridEvent::Update { coord, new, .. } => {
                // Skip until the grid has been drawn
                if self.grid_dims.is_none() || self.too_small {
                    return Ok(());
                }
                queue!(
                    self.stdout,
                    cursor::MoveTo(coord.col as u16 * Vertex::CELL_WIDTH, coord.row as u16),
                    style::Print(new)
                )?;
            }
        }
        Ok(())
    }

    /// Render loop. Draws every event as it arrives, flushing whenever the channel
    /// runs dry, and returns once every sender is gone.
    pub fn render(&mut self, grid_event_rx: Receiver<GridEvent>) -> std::io::Result<()> {
        queue!(self.stdout, terminal::Clear(ClearType::All), cursor::Hide)?;
        self.stdout.flush()?;

        // Block and wait for the next grid event
        while let Ok(event) = grid_event_rx.recv() {
            self.render_grid_event(&event)?;
            // Drain whatever else is already queued before paying for a flush
            for event in grid_event_rx.try_iter() {
                self.render_grid_event(&event)?;
            }
            self.stdout.flush()?;
        }

        // Move cursor below the grid after exiting
        if let Some((rows, _)) = self.grid_dims {
            self.stdout.queue(cursor::MoveTo(0, rows))?;
            self.stdout.flush()?;
        }
        tracing::debug!("Grid event channel closed, renderer exiting");
        Ok(())
    }
}
