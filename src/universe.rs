use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::cell::Cell;
use crate::config::{DEFAULT_HEIGHT, DEFAULT_WIDTH, Params, Seeding};
use crate::grid::Grid;
use crate::patterns::GLIDER;
use crate::rng::SplitMix64;
use crate::rules;

/// A toroidal Game of Life board.
///
/// Cells are stored row-major, one byte each. Every resize discards the previous
/// generation and leaves the board all dead. Addressing a cell outside
/// `height() x width()` is a programming error and panics.
#[derive(Clone, Debug)]
pub struct Universe {
    cells: Grid<Cell>,
    /// Scratch buffer the next generation is written into before the swap.
    next: Vec<Cell>,
    generation: u64,
}

impl Default for Universe {
    fn default() -> Self {
        Self::new()
    }
}

impl Universe {
    /// A `DEFAULT_WIDTH` x `DEFAULT_HEIGHT` board, all dead.
    pub fn new() -> Self {
        Self::with_size(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }

    pub fn with_size(width: usize, height: usize) -> Self {
        Self {
            cells: Grid::new(width, height),
            next: Vec::new(),
            generation: 0,
        }
    }

    /// Build a board from `params`, seeded with a `SplitMix64` keyed on `params.seed`.
    pub fn from_params(params: &Params) -> Self {
        let mut universe = Self::with_size(params.width, params.height);
        let mut rng = SplitMix64::new(params.seed);
        universe.seed(params.seeding, &mut rng, params.fill_probability);
        universe
    }

    pub fn width(&self) -> usize {
        self.cells.w
    }

    pub fn height(&self) -> usize {
        self.cells.h
    }

    /// Generations advanced since the board was last resized, cleared or refilled.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Flat index of (row, col). Does not wrap.
    #[inline]
    pub fn get_index(&self, row: usize, col: usize) -> usize {
        row * self.cells.w + col
    }

    #[inline]
    fn checked_index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.cells.h && col < self.cells.w,
            "cell ({row}, {col}) outside {}x{} universe",
            self.cells.w,
            self.cells.h
        );
        self.get_index(row, col)
    }

    /// Resize to `width` x `height`, all dead.
    pub fn set_size(&mut self, width: usize, height: usize) -> &mut Self {
        debug!(width, height, "resize");
        self.cells.resize(width, height);
        self.next = Vec::new();
        self.generation = 0;
        self
    }

    pub fn set_width(&mut self, width: usize) {
        let height = self.cells.h;
        self.set_size(width, height);
    }

    pub fn set_height(&mut self, height: usize) {
        let width = self.cells.w;
        self.set_size(width, height);
    }

    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.cells.data[self.checked_index(row, col)]
    }

    pub fn is_alive(&self, row: usize, col: usize) -> bool {
        self.cell(row, col).is_alive()
    }

    pub fn set_cell(&mut self, row: usize, col: usize, cell: Cell) {
        let i = self.checked_index(row, col);
        self.cells.data[i] = cell;
    }

    pub fn toggle_cell(&mut self, row: usize, col: usize) {
        let i = self.checked_index(row, col);
        self.cells.data[i] = self.cells.data[i].toggled();
    }

    pub fn clear(&mut self) {
        debug!("clear");
        self.cells.fill(Cell::Dead);
        self.generation = 0;
    }

    /// Refill every cell with an even alive/dead draw from `rng`.
    pub fn reset<R: Rng>(&mut self, rng: &mut R) {
        self.reset_with_probability(rng, 0.5);
    }

    /// Refill every cell, each alive with probability `p`.
    ///
    /// Panics if `p` is not within `[0, 1]`.
    pub fn reset_with_probability<R: Rng>(&mut self, rng: &mut R, p: f64) {
        debug!(p, cells = self.cells.data.len(), "reset");
        for cell in &mut self.cells.data {
            *cell = Cell::from(rng.gen_bool(p));
        }
        self.generation = 0;
    }

    /// Replace the board contents with one of the initial fills.
    pub fn seed<R: Rng>(&mut self, seeding: Seeding, rng: &mut R, p: f64) {
        match seeding {
            Seeding::Empty => self.clear(),
            Seeding::Stripes => {
                for (i, cell) in self.cells.data.iter_mut().enumerate() {
                    *cell = Cell::from(i % 2 == 0 || i % 7 == 0);
                }
                self.generation = 0;
            }
            Seeding::Spaceship => {
                self.clear();
                self.stamp(&GLIDER, 0, 0);
            }
            Seeding::Random => self.reset_with_probability(rng, p),
        }
    }

    /// Zero-copy view of the current generation, row-major.
    pub fn cells(&self) -> &[Cell] {
        &self.cells.data
    }

    /// The same view as raw bytes: 0 dead, 1 alive.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.cells.data.as_slice())
    }

    pub fn grid(&self) -> &Grid<Cell> {
        &self.cells
    }

    pub fn population(&self) -> usize {
        self.cells.data.iter().filter(|c| c.is_alive()).count()
    }

    pub fn live_neighbor_count(&self, row: usize, col: usize) -> u8 {
        self.checked_index(row, col);
        rules::live_neighbor_count(&self.cells, row, col)
    }

    /// Advance one generation.
    ///
    /// Rows of the next generation are computed in parallel from the current
    /// generation only, then swapped in.
    pub fn tick(&mut self) {
        let w = self.cells.w;
        if !self.cells.is_empty() {
            self.next.resize(self.cells.data.len(), Cell::Dead);
            let current = &self.cells;
            self.next
                .par_chunks_mut(w)
                .enumerate()
                .for_each(|(row, out)| rules::next_row(current, row, out));
            std::mem::swap(&mut self.cells.data, &mut self.next);
        }
        self.generation += 1;
        trace!(generation = self.generation, "tick");
    }

    pub fn tick_n(&mut self, n: usize) {
        for _ in 0..n {
            self.tick();
        }
    }
}
