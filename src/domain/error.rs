use thiserror::Error;

/// Errors reported by the engine. All of them are recoverable.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Coordinate access outside the grid
    #[error("cell ({x}, {y}) is outside the {rows}x{cols} grid")]
    OutOfRange {
        x: usize,
        y: usize,
        rows: usize,
        cols: usize,
    },

    /// Bulk value source or pattern payload with the wrong dimensions
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// Malformed pattern file
    #[error("invalid pattern: {0}")]
    Format(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
