// SPDX-License-Identifier: MIT
//
// FrameBuffer — the 2D cell grid that everything paints to.
//
// Design:
//
//   - Flat `Vec<Cell>` with row-major indexing (`y * width + x`). A row is
//     contiguous, so the renderer's left-to-right walk is a linear scan.
//
//   - Coordinates are signed. Anything outside `0..width × 0..height` is
//     simply not there: writes are dropped, reads return the default cell.
//     Callers drawing near an edge never need their own bounds checks, and
//     text running off the right side clips for free.
//
//   - Dimensions are fixed at construction and always positive. A buffer
//     with zero or negative size is a programming error and panics; a
//     `resize` to such a size is ignored.
//
//   - Text is laid out one cell per Unicode scalar value unless the caller
//     opts into display-width advance, in which case wide characters (CJK,
//     most emoji) take two cells: the glyph and a continuation cell.
//
// Locking lives one level up in `Screen`; this type is plain data.

use unicode_width::UnicodeWidthChar;

use crate::cell::Cell;
use crate::color::Color;
use crate::style::Style;

// ─── TextAdvance ────────────────────────────────────────────────────────────────

/// How far the cursor moves per character when drawing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextAdvance {
    /// One cell per Unicode scalar value, whatever its display width.
    ///
    /// A wide CJK glyph still advances by one, so whatever follows it on the
    /// row ends up visually shifted by a column.
    #[default]
    Codepoint,
    /// Advance by terminal column width. Wide characters occupy a second,
    /// continuation cell; zero-width characters are dropped.
    DisplayWidth,
}

// ─── FrameBuffer ────────────────────────────────────────────────────────────────

/// A fixed-size grid of terminal cells.
///
/// # Examples
///
/// ```
/// use cellterm::buffer::FrameBuffer;
/// use cellterm::cell::Cell;
/// use cellterm::color::Color;
/// use cellterm::style::Style;
///
/// let mut buf = FrameBuffer::new(80, 24);
/// buf.set(5, 3, Cell::new('X', Color::RED, Color::DEFAULT, Style::BOLD));
/// assert_eq!(buf.get(5, 3).ch, 'X');
///
/// // Out of range: silently ignored, reads back as the default cell.
/// assert!(!buf.set(80, 0, Cell::new('Y', Color::RED, Color::DEFAULT, Style::NONE)));
/// assert_eq!(buf.get(80, 0), Cell::EMPTY);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    // ─── Construction ────────────────────────────────────────────────────

    /// Create a buffer filled with default cells.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is not positive.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        assert!(
            width > 0 && height > 0,
            "invalid screen dimensions: width={width}, height={height}"
        );
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; area(width, height)],
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Whether `(x, y)` is inside the grid.
    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// Flat index of an in-bounds position.
    #[inline]
    #[allow(clippy::cast_sign_loss)] // callers check in_bounds first
    const fn index(&self, x: i32, y: i32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// The cell at `(x, y)`, or the default cell when out of range.
    #[inline]
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Cell {
        if self.in_bounds(x, y) {
            self.cells[self.index(x, y)]
        } else {
            Cell::EMPTY
        }
    }

    /// All cells, row-major.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// A single row, or `None` when `y` is out of range.
    #[must_use]
    pub fn row(&self, y: i32) -> Option<&[Cell]> {
        if y < 0 || y >= self.height {
            return None;
        }
        let start = self.index(0, y);
        Some(&self.cells[start..start + self.row_len()])
    }

    /// Rows top to bottom.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[Cell]> {
        self.cells.chunks_exact(self.row_len())
    }

    #[allow(clippy::cast_sign_loss)] // width > 0
    const fn row_len(&self) -> usize {
        self.width as usize
    }

    // ─── Writes ──────────────────────────────────────────────────────────

    /// Write a cell. Out-of-range writes are dropped.
    ///
    /// Returns `true` if the position was in range.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            tracing::trace!(x, y, "cell write out of range dropped");
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    /// Reset every cell to the default cell.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Change the grid size, keeping the overlapping top-left rectangle.
    ///
    /// Ignored if either dimension is not positive. Cells outside the old
    /// grid start out as the default cell; cells outside the new grid are
    /// lost. Returns `true` if the resize happened.
    pub fn resize(&mut self, width: i32, height: i32) -> bool {
        if width <= 0 || height <= 0 {
            return false;
        }

        let mut cells = vec![Cell::EMPTY; area(width, height)];
        let keep_w = len(self.width.min(width));
        let keep_h = len(self.height.min(height));
        let (old_w, new_w) = (len(self.width), len(width));

        for y in 0..keep_h {
            let src = y * old_w;
            let dst = y * new_w;
            cells[dst..dst + keep_w].copy_from_slice(&self.cells[src..src + keep_w]);
        }

        self.width = width;
        self.height = height;
        self.cells = cells;
        true
    }

    // ─── Text ────────────────────────────────────────────────────────────

    /// Place one character at `(x, y)` and return how many columns it took.
    ///
    /// With [`TextAdvance::Codepoint`] this is exactly one [`set`](Self::set)
    /// and always advances by one. With [`TextAdvance::DisplayWidth`]:
    ///
    /// - zero-width characters write nothing and advance by zero;
    /// - a wide character writes itself plus a continuation cell at `x + 1`;
    /// - a wide character whose second column would fall off the right edge
    ///   is written as a space instead, since half a glyph is garbage on
    ///   every terminal; one starting off-grid writes nothing;
    /// - overwriting either half of an existing wide character turns the
    ///   other half into a plain space so no orphan is left behind.
    #[allow(clippy::too_many_arguments)]
    pub fn put_char(
        &mut self,
        x: i32,
        y: i32,
        ch: char,
        fg: Color,
        bg: Color,
        style: Style,
        advance: TextAdvance,
    ) -> i32 {
        if advance == TextAdvance::Codepoint {
            self.set(x, y, Cell::new(ch, fg, bg, style));
            return 1;
        }

        match ch.width().unwrap_or(0) {
            0 => 0,
            1 => {
                self.break_wide_char_at(x, y);
                self.set(x, y, Cell::new(ch, fg, bg, style));
                1
            }
            _ => {
                if !self.in_bounds(x, y) {
                    return 2;
                }
                self.break_wide_char_at(x, y);
                if x + 1 >= self.width {
                    self.set(x, y, Cell::new(' ', fg, bg, style));
                } else {
                    self.break_wide_char_at(x + 1, y);
                    self.set(x, y, Cell::new(ch, fg, bg, style));
                    self.set(x + 1, y, Cell::continuation(fg, bg, style));
                }
                2
            }
        }
    }

    /// Draw a string left to right from `(x, y)` with one set of attributes.
    ///
    /// Characters past the right edge are dropped by the out-of-range rule;
    /// there is no wrapping. Returns the number of columns advanced.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_text(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        fg: Color,
        bg: Color,
        style: Style,
        advance: TextAdvance,
    ) -> i32 {
        let mut col = x;
        for ch in text.chars() {
            let w = self.put_char(col, y, ch, fg, bg, style, advance);
            col = col.saturating_add(w);
        }
        col.saturating_sub(x)
    }

    /// Break any wide character that touches `(x, y)`.
    ///
    /// - If `(x, y)` is a continuation cell, its owner at `x - 1` becomes a
    ///   space.
    /// - If the cell after `(x, y)` is a continuation, it belonged to a wide
    ///   character starting here and is reset.
    fn break_wide_char_at(&mut self, x: i32, y: i32) {
        if !self.in_bounds(x, y) {
            return;
        }

        let idx = self.index(x, y);
        if self.cells[idx].is_continuation() && x > 0 {
            let prev = self.index(x - 1, y);
            self.cells[prev].ch = ' ';
        }

        if x + 1 < self.width {
            let next = self.index(x + 1, y);
            if self.cells[next].is_continuation() {
                self.cells[next] = Cell::EMPTY;
            }
        }
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameBuffer({}x{})", self.width, self.height)
    }
}

/// A positive dimension as a length.
#[inline]
#[allow(clippy::cast_sign_loss)] // only called with positive values
const fn len(n: i32) -> usize {
    n as usize
}

#[inline]
const fn area(width: i32, height: i32) -> usize {
    len(width) * len(height)
}

// ─── Tests ──────────────────────────────────────────────────────────────────────
