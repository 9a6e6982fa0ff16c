use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use parking_lot::Mutex;
use rand::Rng;

use crate::config::{
    DEFAULT_GENERATION_INTERVAL_MS, PARALLEL_THRESHOLD, SimulationConfig, clamp_interval,
};
use crate::domain::{CellState, EngineError, Grid, PatternFile, Result};

/// Lifecycle of the generation loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimState {
    /// Constructed, never started
    Idle,
    /// Background loop is producing generations
    Running,
    /// Loop stopped, generation counter kept
    Paused,
}

/// Counters for a status readout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Status {
    pub generation: u64,
    pub total: usize,
    pub alive: usize,
    pub dead: usize,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Number of generations: {}    {} Cells (alive: {}, dead: {})",
            self.generation, self.total, self.alive, self.dead
        )
    }
}

/// State shared between the owner and the generation loop
struct Shared {
    grid: Mutex<Grid>,
    generation: AtomicU64,
    keep_running: AtomicBool,
    interval_ms: AtomicU64,
}

impl Shared {
    /// Compute one generation and count it
    fn advance(&self) {
        {
            let mut grid = self.grid.lock();
            if grid.rows() * grid.cols() >= PARALLEL_THRESHOLD {
                grid.step_parallel();
            } else {
                grid.step();
            }
        }
        self.generation.fetch_add(1, Ordering::Relaxed);
    }

    /// Sleep for the configured interval, waking early once a pause is requested
    fn wait_interval(&self) {
        let interval = Duration::from_millis(self.interval_ms.load(Ordering::Relaxed));
        let deadline = Instant::now() + interval;
        while self.keep_running.load(Ordering::Acquire) {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::park_timeout(deadline - now);
        }
    }
}

/// Simulation orchestrates the grid, the generation counter and the
/// background loop. This is the surface a front end talks to.
///
/// Structural commands (reset, clear, resize, load) pause the loop before
/// replacing the grid, so they never race a generation in flight.
pub struct Simulation {
    shared: Arc<Shared>,
    state: SimState,
    worker: Option<JoinHandle<()>>,
}

impl Simulation {
    /// Create a simulation with a randomly seeded grid
    pub fn new(config: SimulationConfig) -> Self {
        let mut grid = Grid::new(config.nr_of_fields, config.field_size);
        grid.seed(&mut rand::rng());
        Self::from_grid(grid, config.interval_ms)
    }

    /// Wrap an existing grid
    pub fn from_grid(grid: Grid, interval_ms: u64) -> Self {
        Self {
            shared: Arc::new(Shared {
                grid: Mutex::new(grid),
                generation: AtomicU64::new(0),
                keep_running: AtomicBool::new(false),
                interval_ms: AtomicU64::new(clamp_interval(interval_ms)),
            }),
            state: SimState::Idle,
            worker: None,
        }
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SimState::Running
    }

    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::Relaxed)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.shared.interval_ms.load(Ordering::Relaxed))
    }

    /// Change the delay between generations. Takes effect at the next sleep.
    pub fn set_interval(&self, ms: u64) {
        let ms = clamp_interval(ms);
        info!("Updating generation interval to {} ms", ms);
        self.shared.interval_ms.store(ms, Ordering::Relaxed);
    }

    pub fn reset_interval(&self) {
        self.set_interval(DEFAULT_GENERATION_INTERVAL_MS);
    }

    /// Start the background generation loop. No-op when already running.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }

        info!("Starting generation loop");
        self.shared.keep_running.store(true, Ordering::Release);
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("generation-loop".into())
            .spawn(move || {
                while shared.keep_running.load(Ordering::Acquire) {
                    shared.advance();
                    shared.wait_interval();
                }
                debug!(
                    "Generation loop stopped at generation {}",
                    shared.generation.load(Ordering::Relaxed)
                );
            });

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                self.state = SimState::Running;
                Ok(())
            }
            Err(e) => {
                self.shared.keep_running.store(false, Ordering::Release);
                Err(EngineError::Io(e))
            }
        }
    }

    /// Stop the loop. Returns once the generation in flight (if any) has
    /// finished; no generation is counted after that.
    pub fn pause(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        info!("Pausing generation loop");
        self.shared.keep_running.store(false, Ordering::Release);
        worker.thread().unpark();
        if worker.join().is_err() {
            error!("Generation loop panicked");
        }
        self.state = SimState::Paused;
    }

    /// Compute exactly one generation. Ignored while running.
    pub fn step(&mut self) -> bool {
        if self.is_running() {
            debug!("Ignoring single step while running");
            return false;
        }
        self.shared.advance();
        debug!("Stepped to generation {}", self.generation());
        true
    }

    /// Replace the grid with a freshly seeded one of the same shape
    pub fn reset(&mut self) {
        self.reset_with(&mut rand::rng());
    }

    /// `reset` with a caller supplied random source
    pub fn reset_with<R: Rng>(&mut self, rng: &mut R) {
        info!("Resetting simulation");
        let (nr_of_fields, field_size) = self.shape();
        let mut grid = Grid::new(nr_of_fields, field_size);
        grid.seed(rng);
        self.replace_grid(grid);
    }

    /// Replace the grid with an all-dead one of the same shape
    pub fn clear(&mut self) {
        info!("Clearing simulation");
        let (nr_of_fields, field_size) = self.shape();
        self.replace_grid(Grid::new(nr_of_fields, field_size));
    }

    /// Replace the grid with an all-dead one of a new shape.
    /// The generation interval is kept.
    pub fn resize(&mut self, nr_of_fields: usize, field_size: usize) {
        info!("Resizing to {} fields of {} px", nr_of_fields, field_size);
        self.replace_grid(Grid::new(nr_of_fields, field_size));
    }

    /// Replace shape and contents from a pattern.
    /// A pattern whose payload disagrees with its header changes nothing.
    pub fn load_pattern(&mut self, pattern: &PatternFile) -> Result<()> {
        let grid = pattern.to_grid().inspect_err(|e| {
            warn!("Rejecting pattern: {}", e);
        })?;
        info!(
            "Loading pattern with {} fields of {} px",
            pattern.nr_of_fields, pattern.field_size
        );
        self.replace_grid(grid);
        Ok(())
    }

    /// Snapshot the current grid as a pattern
    pub fn export_pattern(&self) -> PatternFile {
        PatternFile::from_grid(&self.shared.grid.lock())
    }

    /// Flip the cell under a pixel
    pub fn toggle_at(&self, px: i32, py: i32) -> bool {
        self.shared.grid.lock().toggle_at(px, py)
    }

    /// Highlight the cell under a pixel
    pub fn highlight_at(&self, px: i32, py: i32) -> Option<(usize, usize)> {
        self.shared.grid.lock().highlight_at(px, py)
    }

    pub fn set_cell(&self, x: usize, y: usize, state: CellState) -> Result<()> {
        self.shared.grid.lock().set(x, y, state)
    }

    pub fn cell_state(&self, x: usize, y: usize) -> Result<CellState> {
        self.shared.grid.lock().get(x, y)
    }

    /// Run a read-only closure against the grid, e.g. to render it
    pub fn read_grid<T>(&self, f: impl FnOnce(&Grid) -> T) -> T {
        f(&self.shared.grid.lock())
    }

    pub fn status(&self) -> Status {
        let grid = self.shared.grid.lock();
        let total = grid.rows() * grid.cols();
        let alive = grid.count_alive();
        Status {
            generation: self.generation(),
            total,
            alive,
            dead: total - alive,
        }
    }

    fn shape(&self) -> (usize, usize) {
        let grid = self.shared.grid.lock();
        (grid.nr_of_fields(), grid.field_size())
    }

    fn replace_grid(&mut self, grid: Grid) {
        self.pause();
        *self.shared.grid.lock() = grid;
        self.shared.generation.store(0, Ordering::Relaxed);
        self.state = SimState::Paused;
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.pause();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pattern;
    use rand::{SeedableRng, rngs::StdRng};

    fn blinker() -> Simulation {
        let mut grid = Grid::new(5, 10);
        for y in 1..4 {
            grid.set(2, y, CellState::Alive).unwrap();
        }
        Simulation::from_grid(grid, 1)
    }

    #[test]
    fn test_starts_idle() {
        let sim = blinker();
        assert_eq!(sim.state(), SimState::Idle);
        assert_eq!(sim.generation(), 0);
        assert_eq!(sim.interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_step_counts_generations() {
        let mut sim = blinker();
        assert!(sim.step());
        assert_eq!(sim.generation(), 1);
        assert_eq!(sim.cell_state(1, 2).unwrap(), CellState::Alive);
        assert_eq!(sim.cell_state(2, 1).unwrap(), CellState::Dead);

        assert!(sim.step());
        assert_eq!(sim.generation(), 2);
        assert_eq!(sim.cell_state(2, 1).unwrap(), CellState::Alive);
    }

    #[test]
    fn test_pause_stops_generations() {
        let mut sim = blinker();
        sim.start().unwrap();
        assert_eq!(sim.state(), SimState::Running);
        thread::sleep(Duration::from_millis(50));

        sim.pause();
        assert_eq!(sim.state(), SimState::Paused);
        let stopped_at = sim.generation();
        assert!(stopped_at > 0);

        thread::sleep(Duration::from_millis(30));
        assert_eq!(sim.generation(), stopped_at);
    }

    #[test]
    fn test_start_twice_is_noop() {
        let mut sim = blinker();
        sim.start().unwrap();
        sim.start().unwrap();
        assert!(sim.is_running());
        sim.pause();
        assert!(!sim.is_running());
    }

    #[test]
    fn test_resume_after_pause_keeps_counter() {
        let mut sim = blinker();
        sim.step();
        sim.step();
        sim.start().unwrap();
        thread::sleep(Duration::from_millis(50));
        sim.pause();
        assert!(sim.generation() > 2);
    }

    #[test]
    fn test_pause_wakes_long_sleep() {
        let mut sim = blinker();
        sim.set_interval(1000);
        sim.start().unwrap();
        thread::sleep(Duration::from_millis(20));

        let before = Instant::now();
        sim.pause();
        assert!(before.elapsed() < Duration::from_millis(500));
        assert!(sim.generation() <= 1);
    }

    #[test]
    fn test_step_ignored_while_running() {
        let mut sim = blinker();
        sim.set_interval(1000);
        sim.start().unwrap();
        assert!(!sim.step());
        sim.pause();
        assert!(sim.step());
    }

    #[test]
    fn test_pause_when_idle_stays_idle() {
        let mut sim = blinker();
        sim.pause();
        assert_eq!(sim.state(), SimState::Idle);
    }

    #[test]
    fn test_reset_reseeds_same_shape() {
        let mut sim = Simulation::from_grid(Grid::new(30, 4), 250);
        sim.step();
        sim.start().unwrap();
        sim.reset_with(&mut StdRng::seed_from_u64(5));

        assert_eq!(sim.state(), SimState::Paused);
        assert_eq!(sim.generation(), 0);
        assert_eq!(sim.interval(), Duration::from_millis(250));

        let mut expected = Grid::new(30, 4);
        expected.seed(&mut StdRng::seed_from_u64(5));
        sim.read_grid(|grid| {
            assert_eq!(grid.nr_of_fields(), 30);
            assert_eq!(grid.field_size(), 4);
            assert_eq!(grid.to_rows(), expected.to_rows());
        });
    }

    #[test]
    fn test_clear_kills_everything() {
        let mut sim = blinker();
        sim.step();
        sim.clear();
        assert_eq!(sim.state(), SimState::Paused);
        assert_eq!(sim.generation(), 0);
        assert_eq!(sim.status().alive, 0);
    }

    #[test]
    fn test_resize_keeps_interval() {
        let mut sim = blinker();
        sim.set_interval(300);
        sim.start().unwrap();
        sim.resize(7, 3);

        assert_eq!(sim.state(), SimState::Paused);
        assert_eq!(sim.generation(), 0);
        assert_eq!(sim.interval(), Duration::from_millis(300));
        sim.read_grid(|grid| {
            assert_eq!((grid.rows(), grid.cols(), grid.field_size()), (7, 7, 3));
            assert_eq!(grid.count_alive(), 0);
        });
    }

    #[test]
    fn test_interval_is_clamped() {
        let sim = blinker();
        sim.set_interval(0);
        assert_eq!(sim.interval(), Duration::from_millis(1));
        sim.set_interval(60_000);
        assert_eq!(sim.interval(), Duration::from_millis(1000));
        sim.reset_interval();
        assert_eq!(sim.interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_load_pattern() {
        let mut sim = blinker();
        sim.step();
        let pattern = pattern::decode("jgol;3;10\nOXO\nXOX\nOXO").unwrap();
        sim.load_pattern(&pattern).unwrap();

        assert_eq!(sim.state(), SimState::Paused);
        assert_eq!(sim.generation(), 0);
        assert_eq!(sim.status().alive, 5);
        assert_eq!(sim.export_pattern(), pattern);
    }

    #[test]
    fn test_bad_pattern_changes_nothing() {
        let mut sim = blinker();
        sim.step();
        let before = sim.export_pattern();

        let bad = PatternFile {
            name: "jgol".into(),
            nr_of_fields: 4,
            field_size: 10,
            values: vec![vec![CellState::Alive; 4]; 3],
        };
        assert!(matches!(sim.load_pattern(&bad), Err(EngineError::ShapeMismatch { .. })));

        assert_eq!(sim.state(), SimState::Idle);
        assert_eq!(sim.generation(), 1);
        assert_eq!(sim.export_pattern(), before);
    }

    #[test]
    fn test_pixel_commands() {
        let sim = Simulation::from_grid(Grid::new(5, 10), 100);
        assert!(sim.toggle_at(15, 25));
        assert_eq!(sim.cell_state(2, 1).unwrap(), CellState::Alive);
        assert_eq!(sim.highlight_at(15, 25), Some((2, 1)));
        assert_eq!(sim.highlight_at(10, 25), None);
        assert!(sim.set_cell(9, 0, CellState::Alive).is_err());
    }

    #[test]
    fn test_pixel_commands_while_running() {
        let mut sim = Simulation::from_grid(Grid::new(20, 10), 1);
        sim.start().unwrap();

        for i in 0..50 {
            let px = 5 + (i * 37) % 190;
            let py = 5 + (i * 53) % 190;
            assert!(sim.toggle_at(px, py));
            sim.highlight_at(px, py);
            thread::sleep(Duration::from_millis(1));
        }

        sim.pause();
        assert_eq!(sim.state(), SimState::Paused);
        let status = sim.status();
        assert_eq!(status.total, 400);
        assert_eq!(status.alive + status.dead, status.total);
        sim.read_grid(|grid| {
            assert!(grid.cells().filter(|c| c.highlighted).count() <= 1);
            assert_eq!(grid.count_alive(), status.alive);
        });
    }

    #[test]
    fn test_status_line() {
        let sim = blinker();
        let status = sim.status();
        assert_eq!(
            status,
            Status {
                generation: 0,
                total: 25,
                alive: 3,
                dead: 22,
            }
        );
        assert_eq!(
            status.to_string(),
            "Number of generations: 0    25 Cells (alive: 3, dead: 22)"
        );
    }

    #[test]
    fn test_new_is_seeded_and_idle() {
        let sim = Simulation::new(SimulationConfig::default());
        assert_eq!(sim.state(), SimState::Idle);
        assert_eq!(sim.status().total, 6400);
    }
}
