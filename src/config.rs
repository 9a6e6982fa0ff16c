use std::time::Duration;

pub const DEFAULT_NR_OF_FIELDS: usize = 80;
/// Pixels per field
pub const DEFAULT_FIELD_SIZE: usize = 10;
pub const DEFAULT_GENERATION_INTERVAL_MS: u64 = 100;

pub const MIN_NR_OF_FIELDS: usize = 5;
pub const MAX_NR_OF_FIELDS: usize = 500;
pub const MIN_FIELD_SIZE: usize = 2;
pub const MAX_FIELD_SIZE: usize = 100;
pub const MIN_GENERATION_INTERVAL_MS: u64 = 1;
pub const MAX_GENERATION_INTERVAL_MS: u64 = 1000;

/// Grids with at least this many cells are stepped on the rayon pool
pub const PARALLEL_THRESHOLD: usize = 10_000;

/// Pattern file header tag
pub const PATTERN_NAME: &str = "jgol";
pub const PATTERN_FILE_SUFFIX: &str = "jgol";
pub const PATTERN_SEPARATOR: &str = ";";

/// Knobs a front end can turn: grid shape and generation speed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimulationConfig {
    pub nr_of_fields: usize,
    pub field_size: usize,
    pub interval_ms: u64,
}

impl SimulationConfig {
    /// Pull every value into its allowed range
    pub fn clamped(self) -> Self {
        Self {
            nr_of_fields: self.nr_of_fields.clamp(MIN_NR_OF_FIELDS, MAX_NR_OF_FIELDS),
            field_size: self.field_size.clamp(MIN_FIELD_SIZE, MAX_FIELD_SIZE),
            interval_ms: clamp_interval(self.interval_ms),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            nr_of_fields: DEFAULT_NR_OF_FIELDS,
            field_size: DEFAULT_FIELD_SIZE,
            interval_ms: DEFAULT_GENERATION_INTERVAL_MS,
        }
    }
}

pub fn clamp_interval(ms: u64) -> u64 {
    ms.clamp(MIN_GENERATION_INTERVAL_MS, MAX_GENERATION_INTERVAL_MS)
}
