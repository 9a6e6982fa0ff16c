use super::Grid;

/// Count live cells among the 8 positions around `(x, y)`.
///
/// Positions outside the grid count as dead: no toroidal wrapping and no
/// reflection at the edges.
pub fn count_live_neighbors(grid: &Grid, x: usize, y: usize) -> u8 {
    let rows = grid.rows() as isize;
    let cols = grid.cols() as isize;

    (-1isize..=1)
        .flat_map(|dx| (-1isize..=1).map(move |dy| (dx, dy)))
        .filter(|&(dx, dy)| dx != 0 || dy != 0)
        .map(|(dx, dy)| (x as isize + dx, y as isize + dy))
        .filter(|&(nx, ny)| nx >= 0 && nx < rows && ny >= 0 && ny < cols)
        .filter(|&(nx, ny)| grid.is_alive(nx as usize, ny as usize))
        .count() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CellState;

    fn full_grid(n: usize) -> Grid {
        let mut grid = Grid::new(n, 10);
        grid.set_all(&vec![vec![CellState::Alive; n]; n]).unwrap();
        grid
    }

    #[test]
    fn test_corner_sees_only_three_neighbors() {
        let grid = full_grid(5);
        assert_eq!(count_live_neighbors(&grid, 0, 0), 3);
        assert_eq!(count_live_neighbors(&grid, 4, 4), 3);
        assert_eq!(count_live_neighbors(&grid, 0, 4), 3);
    }

    #[test]
    fn test_edge_sees_five_neighbors() {
        let grid = full_grid(5);
        assert_eq!(count_live_neighbors(&grid, 0, 2), 5);
        assert_eq!(count_live_neighbors(&grid, 2, 4), 5);
    }

    #[test]
    fn test_interior_sees_eight_and_excludes_self() {
        let grid = full_grid(5);
        assert_eq!(count_live_neighbors(&grid, 2, 2), 8);
    }

    #[test]
    fn test_no_wrap_at_corner() {
        let mut grid = Grid::new(5, 10);
        // would be neighbors of (0, 0) on a torus
        grid.set(4, 4, CellState::Alive).unwrap();
        grid.set(0, 4, CellState::Alive).unwrap();
        grid.set(4, 0, CellState::Alive).unwrap();
        assert_eq!(count_live_neighbors(&grid, 0, 0), 0);
    }
}
