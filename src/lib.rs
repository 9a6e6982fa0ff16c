// Domain layer - grid, transition rule, pattern files
pub mod domain;

// Application layer - simulation state machine and generation loop
pub mod application;

// Bounds and defaults shared by the engine and front ends
pub mod config;

// Re-exports for convenience
pub use domain::{Cell, CellState, EngineError, Grid, PatternFile};
pub use application::{SimState, Simulation, Status};
pub use config::SimulationConfig;
