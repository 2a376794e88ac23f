use crate::cell::Cell;
use crate::grid::wrap_rc;
use crate::patterns::{GLIDER, PULSAR, Pattern};
use crate::universe::Universe;

impl Universe {
    /// Stamp a glider with its top-left at (row, col), wrapping at the edges.
    pub fn glider(&mut self, row: usize, col: usize) {
        self.stamp(&GLIDER, row, col);
    }

    /// Stamp a pulsar with its top-left at (row, col), wrapping at the edges.
    pub fn pulsar(&mut self, row: usize, col: usize) {
        self.stamp(&PULSAR, row, col);
    }

    /// Overlay `pattern` at (row, col). Cells outside the pattern are left as they are.
    pub fn stamp(&mut self, pattern: &Pattern, row: usize, col: usize) {
        let pairs = pattern
            .cells
            .iter()
            .map(|&(r, c)| (i64::from(r), i64::from(c)));
        self.stamp_pairs(
            pairs,
            i64::MIN,
            i64::MAX,
            row as i64,
            col as i64,
            pattern.cells.len() as i64,
        );
    }

    /// Set cells alive from a flat, alternating `row, col, row, col, ..` list.
    ///
    /// A pair is skipped unless both of its coordinates lie within `[min, max]`; this window
    /// applies to the source coordinates, before translation. Accepted pairs land on
    /// `(row_translate + r, col_translate + c)` wrapped onto the board. At most `limit`
    /// cells are set, in input order; `limit <= 0` sets none. A trailing unpaired value
    /// is ignored.
    ///
    /// Returns the number of cells set.
    pub fn cells_from_pattern(
        &mut self,
        coords: &[i64],
        min: i64,
        max: i64,
        row_translate: i64,
        col_translate: i64,
        limit: i64,
    ) -> usize {
        let pairs = coords.chunks_exact(2).map(|p| (p[0], p[1]));
        self.stamp_pairs(pairs, min, max, row_translate, col_translate, limit)
    }

    fn stamp_pairs(
        &mut self,
        pairs: impl Iterator<Item = (i64, i64)>,
        min: i64,
        max: i64,
        row_translate: i64,
        col_translate: i64,
        limit: i64,
    ) -> usize {
        let (w, h) = (self.width(), self.height());
        // Translation reduced onto the board up front; an empty board has nothing to land on.
        let Some((row_base, col_base)) = wrap_rc(row_translate, col_translate, w, h) else {
            return 0;
        };
        let limit = usize::try_from(limit).unwrap_or(0);
        let mut stamped = 0;
        for (r, c) in pairs {
            if stamped >= limit {
                break;
            }
            if r < min || r > max || c < min || c > max {
                continue;
            }
            let row = (row_base + r.rem_euclid(h as i64) as usize) % h;
            let col = (col_base + c.rem_euclid(w as i64) as usize) % w;
            self.set_cell(row, col, Cell::Alive);
            stamped += 1;
        }
        stamped
    }
}
