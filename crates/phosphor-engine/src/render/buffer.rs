//! Double-buffered cell grid with dirty-cell diffing.
//!
//! Gameplay writes into the back buffer; [`BufferPair::flush`] emits only
//! the cells that differ from the front buffer, then promotes back to front
//! and clears the new back to [`Cell::BLANK`]. No screen clears, no
//! redundant writes.
//!
//! A resize reallocates both buffers and drops the diff baseline: the next
//! flush emits every coordinate exactly once. That is a signaled
//! discontinuity, not an error.

use super::cell::Cell;

// ---------------------------------------------------------------------------
// CellBuffer
// ---------------------------------------------------------------------------

/// A row-major `width x height` grid of [`Cell`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl CellBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; width as usize * height as usize],
        }
    }

    #[inline]
    fn offset(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.offset(x, y).map(|i| &self.cells[i])
    }

    /// Write a cell. Out-of-bounds writes are silently ignored -- callers
    /// draw world-space shapes that routinely clip the surface edge.
    /// Returns whether the write landed.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        match self.offset(x, y) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    /// Reset every cell to [`Cell::BLANK`].
    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }
}

// ---------------------------------------------------------------------------
// BufferPair
// ---------------------------------------------------------------------------

/// One emitted cell update: paint `cell` at `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellWrite {
    pub x: u16,
    pub y: u16,
    pub cell: Cell,
}

/// Front/back buffer pair with a diffing flush.
#[derive(Debug)]
pub struct BufferPair {
    front: CellBuffer,
    back: CellBuffer,
    /// False until the first flush after construction or a resize; while
    /// false the front buffer is not a valid diff baseline and the next
    /// flush emits the full frame.
    baseline: bool,
    /// Whether the back buffer was touched since the last flush. An
    /// untouched back buffer makes flush a no-op (nothing to present).
    dirty: bool,
}

impl BufferPair {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            front: CellBuffer::new(width, height),
            back: CellBuffer::new(width, height),
            baseline: false,
            dirty: false,
        }
    }

    pub fn width(&self) -> u16 {
        self.front.width()
    }

    pub fn height(&self) -> u16 {
        self.front.height()
    }

    /// Write into the back buffer.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if self.back.set(x, y, cell) {
            self.dirty = true;
        }
    }

    /// Read back-buffer state (the frame under composition).
    pub fn back(&self) -> &CellBuffer {
        &self.back
    }

    pub(crate) fn back_mut(&mut self) -> &mut CellBuffer {
        &mut self.back
    }

    /// Clear the back buffer for a fresh frame's writes. Counts as a write:
    /// a cleared frame presents as blank.
    pub fn clear_back(&mut self) {
        self.back.clear();
        self.dirty = true;
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether the next [`flush`](Self::flush) will emit the full frame.
    pub fn needs_full_redraw(&self) -> bool {
        !self.baseline
    }

    /// Reallocate both buffers for a new surface size. The diff baseline is
    /// invalidated; the next flush emits every coordinate exactly once.
    pub fn resize(&mut self, width: u16, height: u16) {
        tracing::debug!(width, height, "surface resized, forcing full redraw");
        self.front = CellBuffer::new(width, height);
        self.back = CellBuffer::new(width, height);
        self.baseline = false;
        self.dirty = false;
    }

    /// Emit every cell where back differs from front, then promote the back
    /// buffer to front and clear the new back to [`Cell::BLANK`].
    ///
    /// With no baseline (fresh pair or just-resized), the whole frame is
    /// emitted, every coordinate exactly once. With a baseline and an
    /// untouched back buffer there is no frame to present, so the call is a
    /// no-op and emits nothing.
    pub fn flush(&mut self) -> Vec<CellWrite> {
        if self.baseline && !self.dirty {
            return Vec::new();
        }

        let width = self.back.width();
        let height = self.back.height();
        let mut writes = Vec::new();

        for y in 0..height {
            for x in 0..width {
                let (Some(back), Some(front)) = (self.back.get(x, y), self.front.get(x, y)) else {
                    continue;
                };
                if !self.baseline || back != front {
                    writes.push(CellWrite { x, y, cell: *back });
                }
            }
        }

        std::mem::swap(&mut self.front, &mut self.back);
        self.back.clear();
        self.baseline = true;
        self.dirty = false;
        writes
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
