use crate::cell::Cell;
use crate::grid::{Grid, neighbors8_torus};

/// Live cells among the 8 toroidal neighbors of (row, col).
#[inline]
pub fn live_neighbor_count(cells: &Grid<Cell>, row: usize, col: usize) -> u8 {
    neighbors8_torus(row, col, cells.w, cells.h)
        .map(|(r, c)| cells.get(r, c) as u8)
        .sum()
}

/// B3/S23.
#[inline]
pub fn next_state(cell: Cell, live_neighbors: u8) -> Cell {
    match (cell, live_neighbors) {
        (Cell::Alive, 2) | (Cell::Alive, 3) => Cell::Alive,
        (Cell::Dead, 3) => Cell::Alive,
        _ => Cell::Dead,
    }
}

/// Next-generation state of one cell, reading only the current generation.
#[inline]
pub fn next_cell(cells: &Grid<Cell>, row: usize, col: usize) -> Cell {
    next_state(cells.get(row, col), live_neighbor_count(cells, row, col))
}

/// Fill `out` (one row, `cells.w` long) with the next generation of `row`.
pub fn next_row(cells: &Grid<Cell>, row: usize, out: &mut [Cell]) {
    debug_assert_eq!(out.len(), cells.w);
    for (col, slot) in out.iter_mut().enumerate() {
        *slot = next_cell(cells, row, col);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with(w: usize, h: usize, alive: &[(usize, usize)]) -> Grid<Cell> {
        let mut g = Grid::new(w, h);
        for &(r, c) in alive {
            g.set(r, c, Cell::Alive);
        }
        g
    }

    #[test]
    fn test_next_state_table() {
        for n in 0..=8u8 {
            let survive = if n == 2 || n == 3 { Cell::Alive } else { Cell::Dead };
            let birth = if n == 3 { Cell::Alive } else { Cell::Dead };
            assert_eq!(next_state(Cell::Alive, n), survive, "alive with {n}");
            assert_eq!(next_state(Cell::Dead, n), birth, "dead with {n}");
        }
    }

    #[test]
    fn test_count_wraps_both_axes() {
        let g = grid_with(5, 4, &[(0, 0)]);
        assert_eq!(live_neighbor_count(&g, 3, 4), 1);
        assert_eq!(live_neighbor_count(&g, 3, 0), 1);
        assert_eq!(live_neighbor_count(&g, 0, 4), 1);
        assert_eq!(live_neighbor_count(&g, 2, 2), 0);
    }

    #[test]
    fn test_count_excludes_self() {
        let g = grid_with(5, 5, &[(2, 2)]);
        assert_eq!(live_neighbor_count(&g, 2, 2), 0);
        assert_eq!(live_neighbor_count(&g, 1, 1), 1);
    }

    #[test]
    fn test_full_neighborhood() {
        let all: Vec<_> = (1..4).flat_map(|r| (1..4).map(move |c| (r, c))).collect();
        let g = grid_with(6, 6, &all);
        assert_eq!(live_neighbor_count(&g, 2, 2), 8);
        assert_eq!(next_cell(&g, 2, 2), Cell::Dead);
        assert_eq!(next_cell(&g, 1, 1), Cell::Alive);
    }

    #[test]
    fn test_next_row_blinker() {
        let g = grid_with(5, 5, &[(2, 1), (2, 2), (2, 3)]);
        let mut out = vec![Cell::Dead; 5];
        next_row(&g, 1, &mut out);
        assert_eq!(out, vec![Cell::Dead, Cell::Dead, Cell::Alive, Cell::Dead, Cell::Dead]);
        next_row(&g, 2, &mut out);
        assert_eq!(out, vec![Cell::Dead, Cell::Dead, Cell::Alive, Cell::Dead, Cell::Dead]);
    }
}
