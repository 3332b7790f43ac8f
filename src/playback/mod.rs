mod scheduler;

pub use scheduler::Scheduler;

use crate::{
    error::{Error, Result},
    generators::{self, ApplyMode, GenerationResult, Generator},
    grid::{Coord, Grid, PathDirection},
    solvers::{self, Solver, TraversalResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Running,
    Finished,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "Idle"),
            PlaybackState::Running => write!(f, "Running"),
            PlaybackState::Finished => write!(f, "Finished"),
        }
    }
}

/// Reveal speeds, in milliseconds between consecutive reveals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackConfig {
    pub visit_delay_ms: u64,
    pub path_delay_ms: u64,
    pub generation_delay_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            visit_delay_ms: 2,
            path_delay_ms: 4,
            generation_delay_ms: 2,
        }
    }
}

/// What the last traversal found, once its visit phase is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOutcome {
    /// `length` is the number of steps from source to destination.
    Found { length: usize },
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reveal {
    Visit(Coord),
    /// All visits are shown; the path phase starts here.
    VisitsDone,
    Path(Coord, Option<PathDirection>),
    PathDone,
    Wall(Coord),
    Highlight(Coord),
    GenerationDone,
}

/// A reveal tagged with the run that scheduled it.
#[derive(Debug)]
struct Scheduled {
    run: u64,
    reveal: Reveal,
}

/// Drives the visible state machine `Idle -> Running -> Finished`.
///
/// Results are computed synchronously and then revealed on the grid through a
/// logical-clock [`Scheduler`]. Every reveal carries the id of the run that
/// scheduled it; bumping the id on reset turns every outstanding reveal into a no-op.
#[derive(Debug)]
pub struct Playback {
    config: PlaybackConfig,
    state: PlaybackState,
    run_id: u64,
    scheduler: Scheduler<Scheduled>,
    /// Traversal whose path phase has not started yet
    pending: Option<TraversalResult>,
    last_solver: Option<Solver>,
    path_outcome: Option<PathOutcome>,
}

impl Default for Playback {
    fn default() -> Self {
        Self::new(PlaybackConfig::default())
    }
}

impl Playback {
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            config,
            state: PlaybackState::Idle,
            run_id: 0,
            scheduler: Scheduler::new(),
            pending: None,
            last_solver: None,
            path_outcome: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn config(&self) -> PlaybackConfig {
        self.config
    }

    /// Outcome of the most recent traversal, available once its visit phase completes.
    pub fn path_outcome(&self) -> Option<PathOutcome> {
        self.path_outcome
    }

    pub fn last_solver(&self) -> Option<Solver> {
        self.last_solver
    }

    /// Current logical time in milliseconds.
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    /// Due time of the next queued reveal, stale ones included.
    pub fn next_due(&self) -> Option<u64> {
        self.scheduler.next_due()
    }

    fn transition(&mut self, new_state: PlaybackState) {
        if self.state != new_state {
            tracing::debug!("{} changed to {}", self.state, new_state);
            self.state = new_state;
        }
    }

    /// Starts a new run and returns its id. Reveals from earlier runs become stale.
    fn begin_run(&mut self) -> u64 {
        self.run_id += 1;
        self.pending = None;
        self.path_outcome = None;
        self.run_id
    }

    fn schedule_all<I>(&mut self, delay_ms: u64, reveals: I, done: Reveal)
    where
        I: IntoIterator<Item = Reveal>,
    {
        let run = self.run_id;
        let mut count = 0;
        for (i, reveal) in reveals.into_iter().enumerate() {
            self.scheduler
                .schedule(i as u64 * delay_ms, Scheduled { run, reveal });
            count = i as u64 + 1;
        }
        self.scheduler.schedule(
            count * delay_ms,
            Scheduled {
                run,
                reveal: done,
            },
        );
    }

    /// Parses `algorithm_key` and starts a timed traversal.
    pub fn run_traversal(&mut self, grid: &mut Grid, algorithm_key: &str) -> Result<bool> {
        let solver = algorithm_key.parse::<Solver>()?;
        self.visualize(grid, solver)
    }

    /// Starts a timed traversal with `solver`.
    ///
    /// Returns `Ok(false)` when the request is ignored because a run is already in
    /// flight. A grid without source or destination fails before any mutation.
    pub fn visualize(&mut self, grid: &mut Grid, solver: Solver) -> Result<bool> {
        if self.state == PlaybackState::Running {
            tracing::debug!("Ignored {} request while a run is in flight", solver);
            return Ok(false);
        }

        let result = solvers::solve(grid, solver)?;
        if self.state == PlaybackState::Finished {
            self.clear(grid);
        }
        grid.reset_visited_and_path();

        self.begin_run();
        self.last_solver = Some(solver);
        tracing::info!(
            "Visualizing {}: {} cells to reveal",
            solver,
            result.visited_order.len()
        );
        let visits = result
            .visited_order
            .iter()
            .map(|&coord| Reveal::Visit(coord))
            .collect::<Vec<_>>();
        self.pending = Some(result);
        self.schedule_all(self.config.visit_delay_ms, visits, Reveal::VisitsDone);
        self.transition(PlaybackState::Running);
        Ok(true)
    }

    /// Parses `generator_key` and starts a timed generation.
    pub fn run_generation(
        &mut self,
        grid: &mut Grid,
        generator_key: &str,
        mode: ApplyMode,
        seed: Option<u64>,
    ) -> Result<Option<GenerationResult>> {
        let generator = generator_key.parse::<Generator>()?;
        Ok(self.generate(grid, generator, mode, seed))
    }

    /// Starts a timed generation and returns the generated cells, or `None` if a
    /// run is already in flight.
    ///
    /// In [`ApplyMode::Walls`] existing walls are cleared first. Previous traversal
    /// marks are always cleared.
    pub fn generate(
        &mut self,
        grid: &mut Grid,
        generator: Generator,
        mode: ApplyMode,
        seed: Option<u64>,
    ) -> Option<GenerationResult> {
        if self.state == PlaybackState::Running {
            tracing::debug!("Ignored {} request while a run is in flight", generator);
            return None;
        }

        if mode == ApplyMode::Walls {
            grid.reset_walls();
        }
        grid.reset_visited_and_path();
        let result = generators::generate(grid, generator, seed);

        self.begin_run();
        tracing::info!(
            "Generating {}: {} cells to reveal as {:?}",
            generator,
            result.cells.len(),
            mode
        );
        let reveals = result.cells.iter().map(|&coord| match mode {
            ApplyMode::Walls => Reveal::Wall(coord),
            ApplyMode::Highlight => Reveal::Highlight(coord),
        });
        let reveals = reveals.collect::<Vec<_>>();
        self.schedule_all(self.config.generation_delay_ms, reveals, Reveal::GenerationDone);
        self.transition(PlaybackState::Running);
        Some(result)
    }

    /// Recomputes the last traversal and applies it synchronously.
    ///
    /// Only available once a traversal has finished; used for live feedback while
    /// editing a solved board. Returns `Ok(false)` when there is nothing to replay.
    pub fn replay(&mut self, grid: &mut Grid) -> Result<bool> {
        let solver = match (self.state, self.last_solver) {
            (PlaybackState::Finished, Some(solver)) => solver,
            _ => {
                tracing::debug!("Nothing to replay in state {}", self.state);
                return Ok(false);
            }
        };

        let result = solvers::solve(grid, solver)?;
        grid.reset_visited_and_path();
        for &coord in result.visited_order.iter() {
            grid.set_visited(coord);
        }
        self.path_outcome = Some(match result.path() {
            Ok(path) => {
                for (coord, direction) in with_directions(&path) {
                    grid.set_path(coord, direction);
                }
                PathOutcome::Found {
                    length: path.len() - 1,
                }
            }
            Err(Error::Unreachable) => PathOutcome::NotFound,
            Err(err) => return Err(err),
        });
        tracing::debug!("Replayed {} instantly: {:?}", solver, self.path_outcome);
        Ok(true)
    }

    /// Makes every outstanding reveal a no-op and returns to `Idle`.
    fn cancel(&mut self) {
        if self.state == PlaybackState::Running {
            tracing::info!("Cancelled run {}", self.run_id);
        }
        self.begin_run();
        self.transition(PlaybackState::Idle);
    }

    /// Full board reset. Cancels any run in flight.
    pub fn reset(&mut self, grid: &mut Grid) {
        self.cancel();
        grid.reset();
    }

    /// Wall-only reset. Cancels any run in flight and clears traversal marks.
    pub fn reset_walls(&mut self, grid: &mut Grid) {
        self.cancel();
        grid.reset_walls();
        grid.reset_visited_and_path();
    }

    /// Clears traversal marks after a finished run and returns to `Idle`.
    /// Ignored while a run is in flight.
    pub fn clear(&mut self, grid: &mut Grid) {
        if self.state == PlaybackState::Running {
            tracing::debug!("Ignored clear while a run is in flight");
            return;
        }
        grid.reset_visited_and_path();
        self.path_outcome = None;
        self.transition(PlaybackState::Idle);
    }

    /// Advances the logical clock by `dt_ms` and applies every reveal that came due.
    pub fn advance(&mut self, grid: &mut Grid, dt_ms: u64) -> usize {
        let until = self.scheduler.now().saturating_add(dt_ms);
        self.advance_to(grid, until)
    }

    /// Applies every reveal due at or before `time`, in order, and returns how many were applied.
    pub fn advance_to(&mut self, grid: &mut Grid, time: u64) -> usize {
        let mut applied = 0;
        while let Some((_, scheduled)) = self.scheduler.pop_due(time) {
            if self.apply(grid, scheduled) {
                applied += 1;
            }
        }
        self.scheduler.advance_to(time);
        applied
    }

    /// Drains the scheduler, reveals scheduled along the way included.
    pub fn run_to_completion(&mut self, grid: &mut Grid) -> usize {
        let mut applied = 0;
        while let Some(due) = self.scheduler.next_due() {
            applied += self.advance_to(grid, due);
        }
        applied
    }

    fn apply(&mut self, grid: &mut Grid, scheduled: Scheduled) -> bool {
        if scheduled.run != self.run_id || self.state != PlaybackState::Running {
            tracing::trace!(
                "Dropped stale {:?} from run {}",
                scheduled.reveal,
                scheduled.run
            );
            return false;
        }

        match scheduled.reveal {
            Reveal::Visit(coord) => grid.set_visited(coord),
            Reveal::VisitsDone => self.start_path_phase(),
            Reveal::Path(coord, direction) => grid.set_path(coord, direction),
            Reveal::PathDone => {
                tracing::info!("Run {} finished: {:?}", self.run_id, self.path_outcome);
                self.transition(PlaybackState::Finished);
            }
            Reveal::Wall(coord) => {
                if let Err(err) = grid.set_wall(coord, true) {
                    tracing::debug!("Skipped wall reveal: {}", err);
                }
            }
            Reveal::Highlight(coord) => grid.set_highlighted(coord),
            Reveal::GenerationDone => {
                tracing::info!("Generation run {} finished", self.run_id);
                self.transition(PlaybackState::Idle);
            }
        }
        true
    }

    /// Rebuilds the path of the pending traversal and schedules its reveal.
    /// An unreachable destination skips straight to `Finished`.
    fn start_path_phase(&mut self) {
        let Some(result) = self.pending.take() else {
            tracing::warn!("Visit phase of run {} ended without a traversal", self.run_id);
            self.transition(PlaybackState::Finished);
            return;
        };

        match result.path() {
            Ok(path) => {
                self.path_outcome = Some(PathOutcome::Found {
                    length: path.len() - 1,
                });
                let reveals = with_directions(&path)
                    .map(|(coord, direction)| Reveal::Path(coord, direction))
                    .collect::<Vec<_>>();
                self.schedule_all(self.config.path_delay_ms, reveals, Reveal::PathDone);
            }
            Err(err) => {
                tracing::info!("Run {} finished: {}", self.run_id, err);
                self.path_outcome = Some(PathOutcome::NotFound);
                self.transition(PlaybackState::Finished);
            }
        }
    }
}

/// Pairs each path cell with the direction of the step that entered it.
/// The first cell has no direction.
fn with_directions(path: &[Coord]) -> impl Iterator<Item = (Coord, Option<PathDirection>)> + '_ {
    path.iter().enumerate().map(move |(i, &coord)| {
        let direction = i
            .checked_sub(1)
            .and_then(|prev| PathDirection::between(path[prev], coord));
        (coord, direction)
    })
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::grid::{GridEvent, Vertex};

    fn scenario_grid(sender: Option<mpsc::Sender<GridEvent>>) -> Grid {
        let mut grid = Grid::new(5, 5, sender);
        grid.move_source(Coord::new(2, 1)).unwrap();
        grid.move_dest(Coord::new(2, 3)).unwrap();
        grid
    }

    fn visited_count(grid: &Grid) -> usize {
        grid.vertices().filter(|v| v.is_visited).count()
    }

    fn path_cells(grid: &Grid) -> Vec<Coord> {
        grid.vertices().filter(|v| v.is_path).map(|v| v.coord).collect()
    }

    #[test]
    fn test_visits_are_revealed_in_discovery_order() {
        let (tx, rx) = mpsc::channel();
        let mut grid = scenario_grid(Some(tx));
        let expected = solvers::solve(&grid, Solver::Bfs).unwrap().visited_order;
        rx.try_iter().for_each(drop);

        let mut playback = Playback::default();
        assert!(playback.visualize(&mut grid, Solver::Bfs).unwrap());
        assert_eq!(playback.state(), PlaybackState::Running);

        // One visit per step of the visit delay, the first one immediately
        assert_eq!(playback.advance(&mut grid, 0), 1);
        assert_eq!(visited_count(&grid), 1);
        playback.advance(&mut grid, 2);
        assert_eq!(visited_count(&grid), 2);

        playback.run_to_completion(&mut grid);
        assert_eq!(playback.state(), PlaybackState::Finished);
        let revealed = rx
            .try_iter()
            .filter_map(|event| match event {
                GridEvent::Update { coord, old, new } if !old.is_visited && new.is_visited => {
                    Some(coord)
                }
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(revealed, expected);
    }

    #[test]
    fn test_path_is_revealed_after_visits_with_directions() {
        let mut grid = scenario_grid(None);
        let mut playback = Playback::default();
        playback.visualize(&mut grid, Solver::Bfs).unwrap();

        let visits = solvers::solve(&grid, Solver::Bfs).unwrap().visited_order.len() as u64;
        // Last visit lands at (visits - 1) * delay; the path phase starts one step later
        playback.advance_to(&mut grid, (visits - 1) * 2);
        assert!(path_cells(&grid).is_empty());
        assert_eq!(playback.path_outcome(), None);

        playback.run_to_completion(&mut grid);
        assert_eq!(playback.path_outcome(), Some(PathOutcome::Found { length: 2 }));
        assert_eq!(
            path_cells(&grid),
            vec![Coord::new(2, 1), Coord::new(2, 2), Coord::new(2, 3)]
        );
        assert_eq!(grid[Coord::new(2, 1)].direction, None);
        assert_eq!(grid[Coord::new(2, 2)].direction, Some(PathDirection::Right));
        assert_eq!(grid[Coord::new(2, 3)].direction, Some(PathDirection::Right));
    }

    #[test]
    fn test_visualize_is_ignored_while_running() {
        let mut grid = scenario_grid(None);
        let mut playback = Playback::default();
        assert!(playback.visualize(&mut grid, Solver::Bfs).unwrap());
        assert!(!playback.visualize(&mut grid, Solver::Dfs).unwrap());
        assert_eq!(playback.last_solver(), Some(Solver::Bfs));
        assert!(playback
            .generate(&mut grid, Generator::VerticalStripes, ApplyMode::Walls, Some(0))
            .is_none());
        assert_eq!(playback.state(), PlaybackState::Running);
    }

    #[test]
    fn test_reset_cancels_outstanding_reveals() {
        let (tx, rx) = mpsc::channel();
        let mut grid = Grid::new(15, 30, Some(tx));
        let mut playback = Playback::default();
        playback.visualize(&mut grid, Solver::Dijkstra).unwrap();
        playback.advance(&mut grid, 10);
        assert!(visited_count(&grid) > 0);

        playback.reset(&mut grid);
        assert_eq!(playback.state(), PlaybackState::Idle);
        assert!(playback.next_due().is_some());
        rx.try_iter().for_each(drop);

        // Stale reveals come due but change nothing
        assert_eq!(playback.run_to_completion(&mut grid), 0);
        assert_eq!(rx.try_iter().count(), 0);
        assert_eq!(visited_count(&grid), 0);
        assert!(path_cells(&grid).is_empty());
        assert_eq!(playback.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_wall_reset_cancels_generation() {
        let mut grid = Grid::new(21, 41, None);
        let mut playback = Playback::default();
        playback.generate(&mut grid, Generator::RecurDiv, ApplyMode::Walls, Some(1));
        playback.advance(&mut grid, 20);
        playback.reset_walls(&mut grid);
        playback.run_to_completion(&mut grid);
        assert!(grid.vertices().all(|v| !v.is_wall));
        assert_eq!(playback.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_instant_replay_after_edit() {
        let mut grid = scenario_grid(None);
        let mut playback = Playback::default();
        assert!(!playback.replay(&mut grid).unwrap());

        playback.visualize(&mut grid, Solver::Bfs).unwrap();
        playback.run_to_completion(&mut grid);
        assert_eq!(playback.state(), PlaybackState::Finished);

        // Block the straight route and replay without any scheduled reveals
        grid.set_wall(Coord::new(2, 2), true).unwrap();
        assert!(playback.replay(&mut grid).unwrap());
        assert_eq!(playback.state(), PlaybackState::Finished);
        assert_eq!(playback.next_due(), None);
        assert_eq!(playback.path_outcome(), Some(PathOutcome::Found { length: 4 }));
        let path = path_cells(&grid);
        assert_eq!(path.len(), 5);
        assert!(!path.contains(&Coord::new(2, 2)));
    }

    #[test]
    fn test_unreachable_destination_still_reveals_visits() {
        let mut grid = Grid::from_rows(&["S.#..", "..#.D", "..#.."]);
        let mut playback = Playback::default();
        playback.visualize(&mut grid, Solver::AStar).unwrap();
        playback.run_to_completion(&mut grid);

        assert_eq!(playback.state(), PlaybackState::Finished);
        assert_eq!(playback.path_outcome(), Some(PathOutcome::NotFound));
        assert_eq!(visited_count(&grid), 5);
        assert!(path_cells(&grid).is_empty());
    }

    #[test]
    fn test_rerun_reproduces_the_same_board() {
        let mut grid = Grid::from_rows(&[
            "S..#......",
            ".#.#.####.",
            ".#...#....",
            ".####.#.#.",
            "......#.#D",
        ]);
        let mut playback = Playback::default();
        for solver in [Solver::Bfs, Solver::Dfs, Solver::Dijkstra] {
            playback.visualize(&mut grid, solver).unwrap();
            playback.run_to_completion(&mut grid);
            let first = grid.vertices().copied().collect::<Vec<Vertex>>();

            // Starting from Finished clears the board before running again
            playback.visualize(&mut grid, solver).unwrap();
            playback.run_to_completion(&mut grid);
            let second = grid.vertices().copied().collect::<Vec<Vertex>>();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_failed_runs_leave_the_grid_untouched() {
        let (tx, rx) = mpsc::channel();
        let mut grid = Grid::new(5, 5, Some(tx));
        let (source, _) = grid.source_and_dest();
        grid.force_update(source, |v| v.is_source = false);
        rx.try_iter().for_each(drop);

        let mut playback = Playback::default();
        assert!(matches!(
            playback.visualize(&mut grid, Solver::Bfs),
            Err(Error::State(_))
        ));
        assert!(matches!(
            playback.run_traversal(&mut grid, "greedy"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            playback.run_generation(&mut grid, "prim", ApplyMode::Walls, None),
            Err(Error::Config(_))
        ));
        assert_eq!(playback.state(), PlaybackState::Idle);
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn test_generation_applies_walls_or_highlights() {
        let mut grid = Grid::new(12, 20, None);
        let mut playback = Playback::default();

        let walls = playback
            .run_generation(&mut grid, "vertical-stripes", ApplyMode::Walls, Some(3))
            .unwrap()
            .unwrap();
        playback.run_to_completion(&mut grid);
        assert_eq!(playback.state(), PlaybackState::Idle);
        let mut expected = walls.cells.clone();
        expected.sort();
        let actual = grid
            .vertices()
            .filter(|v| v.is_wall)
            .map(|v| v.coord)
            .collect::<Vec<_>>();
        assert_eq!(actual, expected);

        let pattern = playback
            .generate(&mut grid, Generator::DiagonalLine, ApplyMode::Highlight, Some(3))
            .unwrap();
        playback.run_to_completion(&mut grid);
        // Walls from the previous run are kept in highlight mode
        assert_eq!(grid.vertices().filter(|v| v.is_wall).count(), expected.len());
        let highlighted = grid.vertices().filter(|v| v.is_highlighted).count();
        assert_eq!(highlighted, pattern.cells.len());
    }
}
