//! Character-grid canvas for drawing OSD frames in a terminal.

use std::fmt;
use crate::osd::{Font, HAlign, Level, Mask, OsdCanvas, VAlign};

const BLANK: char = ' ';

/// Rasterizes OSD draw calls into a grid of characters, one cell per
/// `cell_width` x `cell_height` pixels.
#[derive(Debug, Clone)]
pub struct TextCanvas {
    cols: usize,
    rows: usize,
    cell_width: i32,
    cell_height: i32,
    cells: Vec<char>,
}

impl TextCanvas {
    /// Canvas for a `width` x `height` pixel screen. Cell sizes below one
    /// pixel are raised to one.
    pub fn new(width: i32, height: i32, cell_width: i32, cell_height: i32) -> Self {
        let cell_width = cell_width.max(1);
        let cell_height = cell_height.max(1);
        let cols = (width.max(0) / cell_width) as usize;
        let rows = (height.max(0) / cell_height) as usize;
        Self {
            cols,
            rows,
            cell_width,
            cell_height,
            cells: vec![BLANK; cols * rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = BLANK);
    }

    /// Character at grid position, `None` outside the grid.
    pub fn cell(&self, col: usize, row: usize) -> Option<char> {
        (col < self.cols && row < self.rows).then(|| self.cells[row * self.cols + col])
    }

    fn put(&mut self, col: i32, row: i32, ch: char) {
        if col < 0 || row < 0 {
            return;
        }
        let (col, row) = (col as usize, row as usize);
        if col < self.cols && row < self.rows {
            self.cells[row * self.cols + col] = ch;
        }
    }

    fn plot(&mut self, x: i32, y: i32, level: Level, mask: Mask) {
        let ch = match (level, mask) {
            (Level::White, Mask::Opaque) => '#',
            (Level::White, Mask::Transparent) => '+',
            (Level::Black, Mask::Opaque) => ':',
            // Transparent black leaves the cell alone
            (Level::Black, Mask::Transparent) => return,
        };
        self.put(x.div_euclid(self.cell_width), y.div_euclid(self.cell_height), ch);
    }
}

impl OsdCanvas for TextCanvas {
    fn hline(&mut self, x0: i32, x1: i32, y: i32, level: Level, mask: Mask) {
        let (from, to) = (x0.min(x1), x0.max(x1));
        for x in from..=to {
            self.plot(x, y, level, mask);
        }
    }

    fn vline(&mut self, x: i32, y0: i32, y1: i32, level: Level, mask: Mask) {
        let (from, to) = (y0.min(y1), y0.max(y1));
        for y in from..=to {
            self.plot(x, y, level, mask);
        }
    }

    fn pixel(&mut self, x: i32, y: i32, level: Level, mask: Mask) {
        self.plot(x, y, level, mask);
    }

    fn text(&mut self, text: &str, x: i32, y: i32, valign: VAlign, halign: HAlign, font: Font) {
        let (_, glyph_height) = font.glyph_size();
        let len = text.chars().count() as i32;

        let anchor_col = x.div_euclid(self.cell_width);
        let first_col = match halign {
            HAlign::Left => anchor_col,
            HAlign::Center => anchor_col - len / 2,
            HAlign::Right => anchor_col - len + 1,
        };
        let top = match valign {
            VAlign::Top => y,
            VAlign::Middle => y - glyph_height / 2,
            VAlign::Bottom => y - glyph_height + 1,
        };
        let row = top.div_euclid(self.cell_height);

        for (i, ch) in text.chars().enumerate() {
            self.put(first_col + i as i32, row, if ch.is_ascii() { ch } else { '?' });
        }
    }
}

impl fmt::Display for TextCanvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols.max(1)) {
            let line: String = row.iter().collect();
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
