use std::time::{Duration, Instant};

use pathest::{
    error::Result,
    generators::{ApplyMode, Generator},
    grid::{Grid, GridEvent},
    playback::Playback,
    solvers::Solver,
};

const ROWS: u16 = 255;
const COLS: u16 = 255;
const SEED: u64 = 0;

/// Generate and solve once on the logical clock, returning the number of grid events emitted.
fn run_once(generator: Generator, solver: Solver) -> Result<usize> {
    let (grid_event_tx, grid_event_rx) = std::sync::mpsc::channel::<GridEvent>();
    // Stand-in for the renderer: consume and discard every event
    let render_thread_handle = std::thread::spawn(move || grid_event_rx.iter().count());

    {
        let mut grid = Grid::new(ROWS, COLS, Some(grid_event_tx));
        let mut playback = Playback::default();
        playback.generate(&mut grid, generator, ApplyMode::Walls, Some(SEED));
        playback.run_to_completion(&mut grid);
        playback.visualize(&mut grid, solver)?;
        playback.run_to_completion(&mut grid);
        // Grid is dropped here, as well as the grid_event_tx sender
    }

    Ok(render_thread_handle.join().unwrap_or_default())
}

fn main() -> Result<()> {
    let mut args = std::env::args();
    args.next(); // Skip executable name
    let num_iters = args
        .next()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(1)
        .max(1);

    println!(
        "{:<20} {:<28} {:>12} {:>10}",
        "generator", "solver", "per run", "events"
    );
    for generator in Generator::ALL {
        for solver in Solver::ALL {
            let started = Instant::now();
            let mut events = 0;
            for _ in 0..num_iters {
                events = run_once(generator, solver)?;
            }
            let per_run: Duration = started.elapsed() / num_iters;
            println!(
                "{:<20} {:<28} {:>12.2?} {:>10}",
                generator.to_string(),
                solver.to_string(),
                per_run,
                events
            );
        }
    }
    Ok(())
}
