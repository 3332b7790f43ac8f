mod config;
mod renderer;

use std::{
    io::{Stdout, Write},
    sync::mpsc::Sender,
    time::{Duration, Instant},
};

use crossterm::{
    ExecutableCommand, cursor,
    event::{self, KeyCode},
    queue,
    style::{self, Attribute, Color, Stylize},
    terminal::{self, ClearType},
};

pub use config::{AppConfig, USAGE};

use crate::{
    app::renderer::Renderer,
    error::{Error, Result},
    generators::ApplyMode,
    grid::{Grid, GridEvent, Vertex},
    playback::{PathOutcome, Playback, PlaybackState},
};

/// How a driven run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunStatus {
    Completed,
    Cancelled,
}

pub struct App {
    config: AppConfig,
    /// How long to wait for key presses between playback clock updates
    input_poll_timeout: Duration,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            input_poll_timeout: Duration::from_millis(5),
        }
    }

    /// Set a panic hook to restore terminal state on panic
    /// This ensures that the terminal is not left in raw mode or alternate screen on panic
    /// even if the panic occurs in a different thread
    fn set_panic_hook() {
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = App::restore_terminal(&mut std::io::stdout()); // ignore any errors as we are already failing
            hook(panic_info);
        }));
    }

    /// Setup terminal in raw mode and enter alternate screen
    /// Also sets a panic hook to restore terminal on panic
    pub fn setup_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        terminal::enable_raw_mode()?;
        App::set_panic_hook();
        queue!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide,
            cursor::MoveTo(0, 0)
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Restore terminal to original state
    /// Leave alternate screen and disable raw mode
    pub fn restore_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        queue!(stdout, terminal::LeaveAlternateScreen, cursor::Show)?;
        stdout.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Largest grid that fits a terminal of the given size, leaving room for status rows.
    fn fit_to_terminal(term_width: u16, term_height: u16) -> (u16, u16) {
        let rows = term_height.saturating_sub(Renderer::NUM_LOG_ROWS);
        let cols = term_width / Vertex::CELL_WIDTH;
        (rows.max(Grid::MIN_ROWS), cols.max(Grid::MIN_COLS))
    }

    fn grid_dimensions(&self) -> std::io::Result<(u16, u16)> {
        match self.config.dimensions {
            Some(dims) => Ok(dims),
            None => {
                let (term_width, term_height) = terminal::size()?;
                Ok(App::fit_to_terminal(term_width, term_height))
            }
        }
    }

    /// Main application loop: optionally generate walls, then visualize the traversal.
    /// Esc cancels the run in flight and exits.
    pub fn run(&self, stdout: &mut Stdout) -> Result<()> {
        let (rows, cols) = self.grid_dimensions()?;
        tracing::info!(
            "Starting {}x{} session with {} on {}",
            rows,
            cols,
            self.config.solver,
            self.config
                .generator
                .map_or_else(|| "an empty board".to_string(), |g| g.to_string())
        );

        let (grid_event_tx, grid_event_rx) = std::sync::mpsc::channel::<GridEvent>();
        // Spawn a thread to listen for grid updates and draw them
        let render_thread_handle = std::thread::spawn(move || {
            let mut renderer = Renderer::new();
            renderer.render(grid_event_rx)
        });

        // The grid, and with it the event sender, is dropped when this returns
        let outcome = self.animate(rows, cols, grid_event_tx);

        render_thread_handle
            .join()
            .map_err(|_| Error::State("render thread panicked".to_string()))??;

        let Some(outcome) = outcome? else {
            tracing::info!("Run was cancelled by user.");
            return Ok(());
        };

        let msg = match outcome {
            PathOutcome::Found { length } => format!("Path found! Length: {}. ", length),
            PathOutcome::NotFound => "No path found. ".to_string(),
        };
        queue!(
            stdout,
            cursor::MoveTo(0, rows),
            style::PrintStyledContent(msg.with(Color::Green).attribute(Attribute::Bold)),
        )?;
        stdout.execute(style::PrintStyledContent(
            "Press Esc to exit...\r\n"
                .with(Color::Blue)
                .attribute(Attribute::Bold),
        ))?;
        // Wait for user to press Esc
        App::wait_for_esc()?;
        Ok(())
    }

    /// Generate and solve on a fresh grid. Returns `None` if the user cancelled.
    fn animate(
        &self,
        rows: u16,
        cols: u16,
        grid_event_tx: Sender<GridEvent>,
    ) -> Result<Option<PathOutcome>> {
        let mut grid = Grid::new(rows, cols, Some(grid_event_tx));
        let mut playback = Playback::new(self.config.playback);

        if let Some(generator) = self.config.generator {
            playback.generate(&mut grid, generator, ApplyMode::Walls, self.config.seed);
            if self.drive(&mut playback, &mut grid)? == RunStatus::Cancelled {
                return Ok(None);
            }
        }

        playback.visualize(&mut grid, self.config.solver)?;
        if self.drive(&mut playback, &mut grid)? == RunStatus::Cancelled {
            return Ok(None);
        }
        Ok(playback.path_outcome())
    }

    /// Advance the playback clock in real time until the run leaves `Running`.
    /// Esc resets the board, which cancels every outstanding reveal.
    fn drive(&self, playback: &mut Playback, grid: &mut Grid) -> std::io::Result<RunStatus> {
        let started = Instant::now();
        let base = playback.now();
        while playback.state() == PlaybackState::Running {
            if event::poll(self.input_poll_timeout)?
                && let event::Event::Key(event::KeyEvent {
                    code: KeyCode::Esc,
                    kind: event::KeyEventKind::Press,
                    ..
                }) = event::read()?
            {
                tracing::debug!("Esc key pressed, cancelling run");
                playback.reset(grid);
                return Ok(RunStatus::Cancelled);
            }
            let elapsed = started.elapsed().as_millis() as u64;
            playback.advance_to(grid, base + elapsed);
        }
        Ok(RunStatus::Completed)
    }

    /// Wait for the user to press the Esc key
    /// This function blocks until Esc is pressed
    fn wait_for_esc() -> std::io::Result<()> {
        loop {
            if let event::Event::Key(event::KeyEvent { code, kind, .. }) = event::read()?
                && code == KeyCode::Esc
                && kind == event::KeyEventKind::Press
            {
                break;
            }
        }
        Ok(())
    }
}
