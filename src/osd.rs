//! Drawing interface implemented by the on-screen-display renderer.
//!
//! The spectrograph computes every coordinate and value itself; a canvas just
//! plots what it is told.

/// Pixel level written by a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Black,
    White,
}

/// Whether the drawn pixel covers the video underneath.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mask {
    Transparent,
    Opaque,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Outlined8x8,
    Font8x10,
}

impl Font {
    /// Glyph cell size in pixels.
    pub fn glyph_size(self) -> (i32, i32) {
        match self {
            Font::Outlined8x8 => (8, 8),
            Font::Font8x10 => (8, 10),
        }
    }
}

/// Line, pixel and text primitives in absolute pixel coordinates.
pub trait OsdCanvas {
    /// Horizontal line from `x0` to `x1` inclusive.
    fn hline(&mut self, x0: i32, x1: i32, y: i32, level: Level, mask: Mask);

    /// Vertical line from `y0` to `y1` inclusive, either order.
    fn vline(&mut self, x: i32, y0: i32, y1: i32, level: Level, mask: Mask);

    fn pixel(&mut self, x: i32, y: i32, level: Level, mask: Mask);

    /// ASCII text anchored at `(x, y)`.
    fn text(&mut self, text: &str, x: i32, y: i32, valign: VAlign, halign: HAlign, font: Font);
}
