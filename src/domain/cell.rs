/// CellState is the value of a single grid position.
/// Each cell can be either Dead or Alive.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CellState {
    #[default]
    Dead,
    Alive,
}

impl CellState {
    /// Check if the cell is currently alive
    pub const fn is_alive(self) -> bool {
        matches!(self, CellState::Alive)
    }

    /// Flip between alive and dead
    pub const fn toggle(self) -> Self {
        match self {
            CellState::Alive => CellState::Dead,
            CellState::Dead => CellState::Alive,
        }
    }

    /// Pure function to compute the next state based on Conway's rules:
    /// 1. Live cell with 2-3 neighbors survives
    /// 2. Dead cell with exactly 3 neighbors becomes alive
    /// 3. All other cases result in death
    pub const fn evolve(self, neighbors: u8) -> Self {
        match (self, neighbors) {
            (CellState::Alive, 2 | 3) => CellState::Alive,
            (CellState::Dead, 3) => CellState::Alive,
            _ => CellState::Dead,
        }
    }

    /// Pattern file marker: 'O' alive, 'X' dead
    pub const fn marker(self) -> char {
        match self {
            CellState::Alive => 'O',
            CellState::Dead => 'X',
        }
    }

    pub const fn from_marker(c: char) -> Option<Self> {
        match c {
            'O' => Some(CellState::Alive),
            'X' => Some(CellState::Dead),
            _ => None,
        }
    }
}

/// Read-only view of one grid position, handed out to renderers.
///
/// `x` is the row (vertical pixel axis), `y` the column (horizontal pixel
/// axis). Position and size are fixed for the lifetime of the grid.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
    pub size: usize,
    pub state: CellState,
    pub highlighted: bool,
}

impl Cell {
    /// Strict containment test: a pixel on the cell border is outside.
    pub fn contains(&self, px: i32, py: i32) -> bool {
        if px < 0 || py < 0 || self.size == 0 {
            return false;
        }
        let (px, py) = (px as usize, py as usize);
        py / self.size == self.x
            && py % self.size != 0
            && px / self.size == self.y
            && px % self.size != 0
    }

    /// (left, top, width, height) in pixel space, saturating at `usize::MAX`
    pub const fn pixel_rect(&self) -> (usize, usize, usize, usize) {
        (
            self.y.saturating_mul(self.size),
            self.x.saturating_mul(self.size),
            self.size,
            self.size,
        )
    }
}
