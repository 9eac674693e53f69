//! Sub-cell dot canvas.
//!
//! A dot grid at 2x horizontal and 4x vertical resolution over the cell
//! buffer. Each character cell owns 8 dots; the lit subset selects one of
//! the 256 glyphs in the Unicode braille patterns block (`U+2800 +
//! pattern`). Dot plots are last-write-wins within a tick, and the canvas
//! carries no state across ticks -- persistence of trails is the caller's
//! job (re-plot each tick from decaying state).

use super::buffer::CellBuffer;
use super::cell::{Cell, Color};

/// Dots per cell, horizontally.
pub const DOTS_X: u32 = 2;
/// Dots per cell, vertically.
pub const DOTS_Y: u32 = 4;

/// First code point of the braille patterns block.
const BRAILLE_BASE: u32 = 0x2800;

/// Braille bit for the dot at `(col, row)` within a cell.
/// The block's bit layout is historical: rows 0-2 pack column-major, row 3
/// got bits 6 and 7 when the 6-dot block grew to 8.
const DOT_BITS: [[u8; 2]; 4] = [
    [0x01, 0x08],
    [0x02, 0x10],
    [0x04, 0x20],
    [0x40, 0x80],
];

// ---------------------------------------------------------------------------
// DotCanvas
// ---------------------------------------------------------------------------

/// Accumulates lit dots for one tick, then composites into the back buffer.
#[derive(Debug)]
pub struct DotCanvas {
    cols: u16,
    rows: u16,
    /// Lit-dot bitmask per cell.
    patterns: Vec<u8>,
    /// Per-dot colors, slot = row * 2 + col. Only lit slots are meaningful.
    colors: Vec<[Color; 8]>,
}

impl DotCanvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        let cells = cols as usize * rows as usize;
        Self {
            cols,
            rows,
            patterns: vec![0; cells],
            colors: vec![[Color::WHITE; 8]; cells],
        }
    }

    /// Canvas width in dots.
    pub fn dot_width(&self) -> u32 {
        self.cols as u32 * DOTS_X
    }

    /// Canvas height in dots.
    pub fn dot_height(&self) -> u32 {
        self.rows as u32 * DOTS_Y
    }

    /// Reset every dot to off.
    pub fn clear(&mut self) {
        self.patterns.fill(0);
    }

    /// Reallocate for a resized surface, all dots off.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        *self = DotCanvas::new(cols, rows);
    }

    /// Light one dot, in dot coordinates. Out-of-range plots are ignored.
    /// A second plot on the same dot in the same tick wins outright -- no
    /// additive blending, so replaying identical plots is deterministic.
    pub fn plot(&mut self, dot_x: i32, dot_y: i32, color: Color) {
        if dot_x < 0 || dot_y < 0 {
            return;
        }
        let (dot_x, dot_y) = (dot_x as u32, dot_y as u32);
        if dot_x >= self.dot_width() || dot_y >= self.dot_height() {
            return;
        }
        let cell = (dot_y / DOTS_Y) as usize * self.cols as usize + (dot_x / DOTS_X) as usize;
        let (col, row) = ((dot_x % DOTS_X) as usize, (dot_y % DOTS_Y) as usize);
        self.patterns[cell] |= DOT_BITS[row][col];
        self.colors[cell][row * DOTS_X as usize + col] = color;
    }

    /// The braille glyph for a lit-dot bitmask.
    pub fn glyph_for(pattern: u8) -> char {
        // The whole braille block is valid scalar values.
        char::from_u32(BRAILLE_BASE + pattern as u32).unwrap_or(' ')
    }

    /// Composite every cell with at least one lit dot into `back`: braille
    /// glyph, foreground averaging the lit dots' colors (the single color
    /// when one dot is lit), background preserved from whatever the
    /// non-particle render pass already wrote. All-dots-off cells are left
    /// untouched. Returns how many cells were written.
    pub fn composite_into(&self, back: &mut CellBuffer) -> usize {
        let mut written = 0;
        for cell_y in 0..self.rows {
            for cell_x in 0..self.cols {
                let cell = cell_y as usize * self.cols as usize + cell_x as usize;
                let pattern = self.patterns[cell];
                if pattern == 0 {
                    continue;
                }

                let (mut r, mut g, mut b, mut lit) = (0u32, 0u32, 0u32, 0u32);
                for row in 0..DOTS_Y as usize {
                    for col in 0..DOTS_X as usize {
                        if pattern & DOT_BITS[row][col] != 0 {
                            let c = self.colors[cell][row * DOTS_X as usize + col];
                            r += c.r as u32;
                            g += c.g as u32;
                            b += c.b as u32;
                            lit += 1;
                        }
                    }
                }
                let fg = Color::new((r / lit) as u8, (g / lit) as u8, (b / lit) as u8);

                let bg = back
                    .get(cell_x, cell_y)
                    .map(|c| c.bg)
                    .unwrap_or(Cell::BLANK.bg);
                back.set(
                    cell_x,
                    cell_y,
                    Cell {
                        glyph: Self::glyph_for(pattern),
                        fg,
                        bg,
                    },
                );
                written += 1;
            }
        }
        written
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
