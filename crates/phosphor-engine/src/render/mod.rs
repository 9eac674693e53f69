//! Character-cell render stack: cell buffer pair, diff flush, and the
//! braille sub-cell canvas, bundled as a [`Surface`].
//!
//! The surface does buffer arithmetic only. The presentation layer takes
//! the [`CellWrite`] list from [`Surface::flush`] and turns it into actual
//! terminal writes; nothing in here touches a device.

pub mod buffer;
pub mod canvas;
pub mod cell;

pub use buffer::{BufferPair, CellBuffer, CellWrite};
pub use canvas::{DotCanvas, DOTS_X, DOTS_Y};
pub use cell::{palette, Cell, Color};

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

/// The full render surface: glyph cells plus the sub-cell dot layer.
#[derive(Debug)]
pub struct Surface {
    pair: BufferPair,
    canvas: DotCanvas,
}

impl Surface {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            pair: BufferPair::new(width, height),
            canvas: DotCanvas::new(width, height),
        }
    }

    pub fn width(&self) -> u16 {
        self.pair.width()
    }

    pub fn height(&self) -> u16 {
        self.pair.height()
    }

    /// Write a glyph cell into the back buffer.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        self.pair.set(x, y, cell);
    }

    /// Light a sub-cell dot (dot coordinates: 2x horizontal, 4x vertical).
    pub fn plot(&mut self, dot_x: i32, dot_y: i32, color: Color) {
        self.canvas.plot(dot_x, dot_y, color);
    }

    /// Start a fresh tick's frame: back buffer and dot canvas both cleared.
    pub fn clear_frame(&mut self) {
        self.pair.clear_back();
        self.canvas.clear();
    }

    /// Reallocate for a new surface size. The next flush emits the full
    /// frame -- a signaled discontinuity, not an error.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.pair.resize(width, height);
        self.canvas.resize(width, height);
    }

    /// Whether the next flush will emit the full frame.
    pub fn needs_full_redraw(&self) -> bool {
        self.pair.needs_full_redraw()
    }

    /// Composite the dot canvas into the back buffer, then diff against the
    /// front buffer and emit the minimal write list. The canvas is cleared;
    /// it carries no state into the next tick.
    pub fn flush(&mut self) -> Vec<CellWrite> {
        if self.canvas.composite_into(self.pair.back_mut()) > 0 {
            self.pair.mark_dirty();
        }
        self.canvas.clear();
        self.pair.flush()
    }
}

// ---------------------------------------------------------------------------
// Frame hashing
// ---------------------------------------------------------------------------

/// Hash an emitted write stream. Two runs of the same seeded simulation must
/// produce identical hashes frame for frame; used by determinism tests and
/// available to applications as a cheap replay checksum.
pub fn frame_hash(writes: &[CellWrite]) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    for w in writes {
        hasher.update(&w.x.to_le_bytes());
        hasher.update(&w.y.to_le_bytes());
        hasher.update(&(w.cell.glyph as u32).to_le_bytes());
        hasher.update(&[w.cell.fg.r, w.cell.fg.g, w.cell.fg.b]);
        hasher.update(&[w.cell.bg.r, w.cell.bg.g, w.cell.bg.b]);
    }
    hasher.finalize()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
