/// Row-major flat grid. No per-cell objects.
/// Both axes wrap (toroidal topology).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid<T> {
    pub data: Vec<T>,
    pub w: usize,
    pub h: usize,
}

impl<T: Copy + Default> Grid<T> {
    /// Panics if `w * h` overflows `usize`.
    pub fn new(w: usize, h: usize) -> Self {
        let len = w.checked_mul(h).expect("grid area overflows usize");
        Self {
            data: vec![T::default(); len],
            w,
            h,
        }
    }

    #[inline]
    pub fn idx(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.h && col < self.w);
        row * self.w + col
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[self.idx(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, v: T) {
        let i = self.idx(row, col);
        self.data[i] = v;
    }

    /// Replace the dimensions. Prior contents are discarded, every cell is `T::default()`.
    pub fn resize(&mut self, w: usize, h: usize) {
        *self = Self::new(w, h);
    }

    pub fn fill(&mut self, v: T) {
        self.data.fill(v);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Wrap a signed (row, col) onto a `w` x `h` torus.
/// Returns None for an empty grid, where there is nothing to wrap onto.
#[inline]
pub fn wrap_rc(row: i64, col: i64, w: usize, h: usize) -> Option<(usize, usize)> {
    if w == 0 || h == 0 {
        return None;
    }
    let wr = row.rem_euclid(h as i64) as usize;
    let wc = col.rem_euclid(w as i64) as usize;
    Some((wr, wc))
}

/// 8-connected neighbors on the torus. Always yields exactly 8 positions; on grids
/// narrower than 3 cells some positions repeat.
pub fn neighbors8_torus(
    row: usize,
    col: usize,
    w: usize,
    h: usize,
) -> impl Iterator<Item = (usize, usize)> {
    // Offsets pre-wrapped as "add then mod": h - 1 stands in for -1.
    let up = if row == 0 { h - 1 } else { row - 1 };
    let down = if row + 1 == h { 0 } else { row + 1 };
    let left = if col == 0 { w - 1 } else { col - 1 };
    let right = if col + 1 == w { 0 } else { col + 1 };
    [
        (up, left), (up, col), (up, right),
        (row, left),           (row, right),
        (down, left), (down, col), (down, right),
    ]
    .into_iter()
}
