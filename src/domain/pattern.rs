//! Text pattern files.
//!
//! ```text
//! jgol;3;10
//! OXO
//! XOX
//! OXO
//! ```
//!
//! The header carries the format tag, the number of fields per side and the
//! field size in pixels. Each following line is one row, `O` for alive and
//! `X` for dead.

use std::fs;
use std::path::{Path, PathBuf};

use super::{CellState, EngineError, Grid, Result};
use crate::config::{MIN_FIELD_SIZE, PATTERN_FILE_SUFFIX, PATTERN_NAME, PATTERN_SEPARATOR};

/// Decoded contents of a pattern file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternFile {
    pub name: String,
    pub nr_of_fields: usize,
    pub field_size: usize,
    /// Row-major values, `nr_of_fields` rows of `nr_of_fields` each
    pub values: Vec<Vec<CellState>>,
}

impl PatternFile {
    /// Snapshot a grid
    pub fn from_grid(grid: &Grid) -> Self {
        Self {
            name: PATTERN_NAME.to_string(),
            nr_of_fields: grid.nr_of_fields(),
            field_size: grid.field_size(),
            values: grid.to_rows(),
        }
    }

    /// Check that the payload has the declared square shape
    pub fn validate(&self) -> Result<()> {
        let n = self.nr_of_fields;
        match self.values.iter().map(Vec::len).find(|&len| len != n) {
            Some(len) => Err(EngineError::ShapeMismatch {
                expected: (n, n),
                found: (self.values.len(), len),
            }),
            None if self.values.len() != n => Err(EngineError::ShapeMismatch {
                expected: (n, n),
                found: (self.values.len(), n),
            }),
            None => Ok(()),
        }
    }

    /// Build a fresh grid holding this pattern
    pub fn to_grid(&self) -> Result<Grid> {
        self.validate()?;
        let mut grid = Grid::new(self.nr_of_fields, self.field_size);
        grid.set_all(&self.values)?;
        Ok(grid)
    }

    pub fn encode(&self) -> String {
        let header = [
            self.name.clone(),
            self.nr_of_fields.to_string(),
            self.field_size.to_string(),
        ]
        .join(PATTERN_SEPARATOR);

        std::iter::once(header)
            .chain(
                self.values
                    .iter()
                    .map(|row| row.iter().map(|cell| cell.marker()).collect::<String>()),
            )
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Serialize a grid in pattern file format
pub fn encode(grid: &Grid) -> String {
    PatternFile::from_grid(grid).encode()
}

/// Parse pattern file text
pub fn decode(text: &str) -> Result<PatternFile> {
    let mut lines = text.lines();
    let header = lines
        .next()
        .ok_or_else(|| EngineError::Format("empty file".into()))?;

    let fields: Vec<&str> = header.split(PATTERN_SEPARATOR).collect();
    let [name, count, size] = fields[..] else {
        return Err(EngineError::Format(format!(
            "header must have 3 fields, found {}",
            fields.len()
        )));
    };

    if name != PATTERN_NAME {
        return Err(EngineError::Format(format!("unknown format tag {:?}", name)));
    }

    let count: i64 = parse_number(count, "field count")?;
    if count < 0 {
        return Err(EngineError::Format(format!("negative field count {}", count)));
    }
    let nr_of_fields = count as usize;

    let field_size: i64 = parse_number(size, "field size")?;
    if field_size < MIN_FIELD_SIZE as i64 {
        return Err(EngineError::Format(format!(
            "field size must be >= {}, found {}",
            MIN_FIELD_SIZE, field_size
        )));
    }

    let mut rows: Vec<&str> = lines.collect();
    while rows.last().is_some_and(|row| row.is_empty()) {
        rows.pop();
    }
    if rows.len() != nr_of_fields {
        return Err(EngineError::Format(format!(
            "expected {} rows, found {}",
            nr_of_fields,
            rows.len()
        )));
    }

    let values = rows
        .iter()
        .enumerate()
        .map(|(i, row)| decode_row(i, row, nr_of_fields))
        .collect::<Result<Vec<_>>>()?;

    Ok(PatternFile {
        name: name.to_string(),
        nr_of_fields,
        field_size: field_size as usize,
        values,
    })
}

fn parse_number(field: &str, what: &str) -> Result<i64> {
    field
        .trim()
        .parse()
        .map_err(|_| EngineError::Format(format!("{} is not a number: {:?}", what, field)))
}

fn decode_row(index: usize, row: &str, nr_of_fields: usize) -> Result<Vec<CellState>> {
    let values = row
        .chars()
        .map(|c| {
            CellState::from_marker(c).ok_or_else(|| {
                EngineError::Format(format!("row {}: unexpected character {:?}", index, c))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if values.len() != nr_of_fields {
        return Err(EngineError::Format(format!(
            "row {} has {} cells, expected {}",
            index,
            values.len(),
            nr_of_fields
        )));
    }
    Ok(values)
}

/// Append the pattern suffix unless the path already has it
pub fn with_suffix(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == PATTERN_FILE_SUFFIX) {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".");
        name.push(PATTERN_FILE_SUFFIX);
        PathBuf::from(name)
    }
}

/// Read and decode a pattern file
pub fn read_file(path: impl AsRef<Path>) -> Result<PatternFile> {
    let text = fs::read_to_string(path)?;
    decode(&text)
}

/// Encode and write a pattern file, returning the path actually written
pub fn write_file(path: impl AsRef<Path>, pattern: &PatternFile) -> Result<PathBuf> {
    let path = with_suffix(path.as_ref());
    let mut text = pattern.encode();
    text.push('\n');
    fs::write(&path, text)?;
    Ok(path)
}
