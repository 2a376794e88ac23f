use std::fmt;

use rayon::prelude::*;

use crate::cell::Cell;
use crate::universe::Universe;

pub const DEAD_GLYPH: char = '◻';
pub const ALIVE_GLYPH: char = '◼';

const DEAD_COLOR: [u8; 4] = [0, 0, 0, 255];
const ALIVE_COLOR: [u8; 4] = [255, 255, 255, 255];

#[inline]
fn glyph(cell: Cell) -> char {
    match cell {
        Cell::Dead => DEAD_GLYPH,
        Cell::Alive => ALIVE_GLYPH,
    }
}

/// One line per row, one glyph per cell, rows separated by `\n` (no trailing newline).
impl fmt::Display for Universe {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let w = self.width();
        if w == 0 {
            // Still one (empty) line per row.
            for _ in 1..self.height() {
                writeln!(f)?;
            }
            return Ok(());
        }
        for (row, line) in self.cells().chunks(w).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            for &cell in line {
                write!(f, "{}", glyph(cell))?;
            }
        }
        Ok(())
    }
}

impl Universe {
    /// Text snapshot of the current generation.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

/// Pixel dimensions of the `render_rgba` output for `scale`, or `None` when the raster's
/// byte length would not fit in `usize`.
pub fn raster_size(universe: &Universe, scale: usize) -> Option<(usize, usize)> {
    let scale = scale.max(1);
    let px_w = universe.width().checked_mul(scale)?;
    let px_h = universe.height().checked_mul(scale)?;
    px_w.checked_mul(px_h)?.checked_mul(4)?;
    Some((px_w, px_h))
}

/// RGBA8 raster, each cell drawn as a `scale` x `scale` block.
/// Returns the pixels with their `(width * scale, height * scale)` dimensions, or `None`
/// when that size overflows.
pub fn render_rgba(universe: &Universe, scale: usize) -> Option<(Vec<u8>, usize, usize)> {
    let (px_w, px_h) = raster_size(universe, scale)?;
    let scale = scale.max(1);
    let w = universe.width();
    let mut rgba = vec![0u8; px_w * px_h * 4];
    if rgba.is_empty() {
        return Some((rgba, px_w, px_h));
    }

    let cells = universe.cells();
    rgba.par_chunks_mut(px_w * 4)
        .enumerate()
        .for_each(|(y, line)| {
            let row = &cells[(y / scale) * w..(y / scale + 1) * w];
            for x in 0..px_w {
                let color = match row[x / scale] {
                    Cell::Dead => DEAD_COLOR,
                    Cell::Alive => ALIVE_COLOR,
                };
                line[x * 4..x * 4 + 4].copy_from_slice(&color);
            }
        });

    Some((rgba, px_w, px_h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_layout() {
        let mut u = Universe::with_size(3, 2);
        u.toggle_cell(0, 2);
        u.toggle_cell(1, 0);
        assert_eq!(u.render(), "◻◻◼\n◼◻◻");
    }

    #[test]
    fn test_render_line_counts() {
        let u = Universe::with_size(7, 5);
        let text = u.render();
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|l| l.chars().count() == 7));
    }

    #[test]
    fn test_render_zero_width_keeps_rows() {
        let u = Universe::with_size(0, 3);
        assert_eq!(u.render(), "\n\n");
        assert_eq!(Universe::with_size(4, 0).render(), "");
    }

    #[test]
    fn test_rgba_scaling() {
        let mut u = Universe::with_size(2, 1);
        u.toggle_cell(0, 1);
        let (px, w, h) = render_rgba(&u, 2).unwrap();
        assert_eq!((w, h), (4, 2));
        assert_eq!(px.len(), 4 * 2 * 4);
        // Second pixel row, fourth pixel: inside the alive block.
        let i = (4 + 3) * 4;
        assert_eq!(&px[i..i + 4], &ALIVE_COLOR);
        assert_eq!(&px[4..8], &DEAD_COLOR);
    }

    #[test]
    fn test_raster_size_overflow() {
        let u = Universe::with_size(3, 2);
        assert_eq!(raster_size(&u, 0), Some((3, 2)));
        assert_eq!(raster_size(&u, usize::MAX), None);
        assert_eq!(raster_size(&u, usize::MAX / 8), None);
        assert!(render_rgba(&u, usize::MAX).is_none());
    }
}
