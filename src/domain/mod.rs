mod cell;
mod error;
mod grid;
pub mod neighbors;
pub mod pattern;

pub use cell::{Cell, CellState};
pub use error::{EngineError, Result};
pub use grid::Grid;
pub use pattern::PatternFile;
