use super::{Cell, CellState, EngineError, Result, neighbors::count_live_neighbors};
use rand::Rng;
use rayon::prelude::*;

/// Grid owns the square field of cells.
///
/// Values live in two flat row-major buffers: `cells` is the current
/// generation and `next` is scratch space written by `step`. A step fills
/// `next` from `cells` only and then swaps the two, so no cell ever sees a
/// neighbor that was already updated in the same pass.
#[derive(Clone, Debug)]
pub struct Grid {
    nr_of_fields: usize,
    field_size: usize,
    cells: Vec<CellState>,
    next: Vec<CellState>,
    highlighted: Option<usize>,
}

impl Grid {
    /// Create a new `nr_of_fields` x `nr_of_fields` grid with all cells dead
    pub fn new(nr_of_fields: usize, field_size: usize) -> Self {
        let len = nr_of_fields * nr_of_fields;
        Self {
            nr_of_fields,
            field_size,
            cells: vec![CellState::Dead; len],
            next: vec![CellState::Dead; len],
            highlighted: None,
        }
    }

    pub const fn rows(&self) -> usize {
        self.nr_of_fields
    }

    pub const fn cols(&self) -> usize {
        self.nr_of_fields
    }

    /// Number of fields per side
    pub const fn nr_of_fields(&self) -> usize {
        self.nr_of_fields
    }

    /// Cell edge length in pixels
    pub const fn field_size(&self) -> usize {
        self.field_size
    }

    /// Width and height of the whole grid in pixels, saturating at `usize::MAX`
    pub const fn pixel_extent(&self) -> usize {
        self.nr_of_fields.saturating_mul(self.field_size)
    }

    /// Row-major index; callers guarantee bounds
    const fn index(&self, x: usize, y: usize) -> usize {
        x * self.cols() + y
    }

    fn checked_index(&self, x: usize, y: usize) -> Result<usize> {
        if x < self.rows() && y < self.cols() {
            Ok(self.index(x, y))
        } else {
            Err(EngineError::OutOfRange {
                x,
                y,
                rows: self.rows(),
                cols: self.cols(),
            })
        }
    }

    /// Get the value at row `x`, column `y`
    pub fn get(&self, x: usize, y: usize) -> Result<CellState> {
        self.checked_index(x, y).map(|idx| self.cells[idx])
    }

    /// Set the value at row `x`, column `y`
    pub fn set(&mut self, x: usize, y: usize, state: CellState) -> Result<()> {
        let idx = self.checked_index(x, y)?;
        self.cells[idx] = state;
        Ok(())
    }

    /// Unchecked liveness lookup for the neighbor scan
    pub(crate) fn is_alive(&self, x: usize, y: usize) -> bool {
        self.cells[self.index(x, y)].is_alive()
    }

    /// Full view of one position, for renderers
    pub fn cell(&self, x: usize, y: usize) -> Result<Cell> {
        let idx = self.checked_index(x, y)?;
        Ok(self.view(idx))
    }

    fn view(&self, idx: usize) -> Cell {
        Cell {
            x: idx / self.cols(),
            y: idx % self.cols(),
            size: self.field_size,
            state: self.cells[idx],
            highlighted: self.highlighted == Some(idx),
        }
    }

    /// Iterate over all cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.cells.len()).map(move |idx| self.view(idx))
    }

    /// Map a pixel to the cell whose square contains it.
    /// Rows follow the vertical axis (`py`), columns the horizontal one (`px`).
    pub fn cell_at_pixel(&self, px: i32, py: i32) -> Option<(usize, usize)> {
        if px < 0 || py < 0 || self.field_size == 0 {
            return None;
        }
        let x = py as usize / self.field_size;
        let y = px as usize / self.field_size;
        (x < self.rows() && y < self.cols()).then_some((x, y))
    }

    /// Flip the cell under the pixel. Returns false if the pixel is off the grid.
    pub fn toggle_at(&mut self, px: i32, py: i32) -> bool {
        match self.cell_at_pixel(px, py) {
            Some((x, y)) => {
                let idx = self.index(x, y);
                self.cells[idx] = self.cells[idx].toggle();
                true
            }
            None => false,
        }
    }

    /// Move the highlight to the cell strictly containing the pixel.
    ///
    /// A pixel lying on a grid line belongs to no cell, so at most one cell
    /// is ever highlighted and sometimes none is.
    pub fn highlight_at(&mut self, px: i32, py: i32) -> Option<(usize, usize)> {
        self.highlighted = self
            .cell_at_pixel(px, py)
            .filter(|_| px as usize % self.field_size != 0 && py as usize % self.field_size != 0)
            .map(|(x, y)| self.index(x, y));
        self.highlighted()
    }

    /// Position of the highlighted cell, if any
    pub fn highlighted(&self) -> Option<(usize, usize)> {
        self.highlighted.map(|idx| (idx / self.cols(), idx % self.cols()))
    }

    pub fn clear_highlight(&mut self) {
        self.highlighted = None;
    }

    /// Set every cell alive or dead with equal probability
    pub fn seed<R: Rng>(&mut self, rng: &mut R) {
        self.cells.iter_mut().for_each(|cell| {
            *cell = if rng.random_bool(0.5) {
                CellState::Alive
            } else {
                CellState::Dead
            };
        });
    }

    /// Replace all values from a row-major matrix of the same shape.
    /// Nothing is written unless every row matches.
    pub fn set_all(&mut self, values: &[Vec<CellState>]) -> Result<()> {
        let cols = self.cols();
        let bad_row = values.iter().map(Vec::len).find(|&len| len != cols);
        if values.len() != self.rows() || bad_row.is_some() {
            return Err(EngineError::ShapeMismatch {
                expected: (self.rows(), cols),
                found: (values.len(), bad_row.unwrap_or(cols)),
            });
        }

        self.cells
            .iter_mut()
            .zip(values.iter().flatten())
            .for_each(|(cell, value)| *cell = *value);
        Ok(())
    }

    /// Current values as a row-major matrix
    pub fn to_rows(&self) -> Vec<Vec<CellState>> {
        self.cells.chunks(self.cols().max(1)).map(<[CellState]>::to_vec).collect()
    }

    pub fn count_alive(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_alive()).count()
    }

    pub fn count_dead(&self) -> usize {
        self.cells.len() - self.count_alive()
    }

    /// Compute the next generation (serial)
    pub fn step(&mut self) {
        let mut next = std::mem::take(&mut self.next);
        let cols = self.cols();

        for (idx, slot) in next.iter_mut().enumerate() {
            let neighbors = count_live_neighbors(self, idx / cols, idx % cols);
            *slot = self.cells[idx].evolve(neighbors);
        }

        self.swap_in(next);
    }

    /// Parallel evolution using rayon, one task per row.
    /// Produces exactly the same generation as `step`.
    pub fn step_parallel(&mut self) {
        let mut next = std::mem::take(&mut self.next);
        let cols = self.cols();
        let current = &*self;

        next.par_chunks_mut(cols.max(1))
            .enumerate()
            .for_each(|(x, row)| {
                for (y, slot) in row.iter_mut().enumerate() {
                    let neighbors = count_live_neighbors(current, x, y);
                    *slot = current.cells[current.index(x, y)].evolve(neighbors);
                }
            });

        self.swap_in(next);
    }

    /// Make `next` the live buffer; the old one becomes scratch.
    /// Highlight does not carry over into a new generation.
    fn swap_in(&mut self, next: Vec<CellState>) {
        self.next = std::mem::replace(&mut self.cells, next);
        self.highlighted = None;
    }
}
