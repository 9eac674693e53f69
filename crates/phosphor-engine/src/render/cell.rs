//! Cells, colors, and the neon palette.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// An RGB color. Kept as channels (not a terminal palette index) so the
/// sub-cell compositor can average lit-dot colors; the presentation layer
/// quantizes to whatever the output device supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);
}

/// The neon combat palette.
pub mod palette {
    use super::Color;

    pub const NEON_CYAN: Color = Color::new(0, 255, 255);
    pub const NEON_MAGENTA: Color = Color::new(255, 0, 255);
    pub const NEON_YELLOW: Color = Color::new(255, 255, 0);
    pub const NEON_GREEN: Color = Color::new(0, 255, 0);
    pub const NEON_RED: Color = Color::new(255, 0, 0);
    pub const NEON_ORANGE: Color = Color::new(255, 135, 0);
    pub const NEON_PINK: Color = Color::new(255, 0, 175);

    pub const GRAY_LIGHT: Color = Color::new(208, 208, 208);
    pub const GRAY_MED: Color = Color::new(138, 138, 138);
    pub const GRAY_DARK: Color = Color::new(68, 68, 68);
    pub const GRAY_DARKER: Color = Color::new(38, 38, 38);
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One character cell: glyph plus foreground and background color.
///
/// Equality is full-cell equality -- the diff engine treats a color-only
/// change as a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub glyph: char,
    pub fg: Color,
    pub bg: Color,
}

impl Cell {
    /// The defined blank cell the back buffer resets to between frames.
    pub const BLANK: Cell = Cell {
        glyph: ' ',
        fg: Color::WHITE,
        bg: Color::BLACK,
    };

    /// A glyph over the default background.
    pub const fn new(glyph: char, fg: Color) -> Self {
        Self {
            glyph,
            fg,
            bg: Color::BLACK,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::BLANK
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
