// SPDX-License-Identifier: MIT
//
// Cell — one character position on screen.
//
// A cell is a character plus the attribute triple that decides how it looks:
// foreground, background, style. The renderer compares that triple between
// neighbors to decide whether it has to emit SGR codes at all.
//
// Cells are small `Copy` values. The buffer owns them; nothing else keeps a
// reference.

use std::fmt;

use crate::color::Color;
use crate::style::Style;

/// Character stored in the second column of a wide character when the buffer
/// advances by display width. The renderer never prints it.
const CONTINUATION: char = '\0';

/// A single terminal cell.
///
/// ```
/// use cellterm::cell::Cell;
/// use cellterm::color::Color;
/// use cellterm::style::Style;
///
/// let mut cell = Cell::new('X', Color::RED, Color::BLUE, Style::BOLD);
/// assert_ne!(cell, Cell::EMPTY);
///
/// cell.clear();
/// assert_eq!(cell, Cell::EMPTY);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Character to display.
    pub ch: char,
    /// Foreground (text) color.
    pub fg: Color,
    /// Background color.
    pub bg: Color,
    /// Text attributes.
    pub style: Style,
}

impl Cell {
    /// Space, default colors, no style.
    pub const EMPTY: Self = Self {
        ch: ' ',
        fg: Color::DEFAULT,
        bg: Color::DEFAULT,
        style: Style::NONE,
    };

    #[inline]
    #[must_use]
    pub const fn new(ch: char, fg: Color, bg: Color, style: Style) -> Self {
        Self { ch, fg, bg, style }
    }

    /// The cell that follows a wide character. Carries the same colors so
    /// the background fill stays continuous.
    ///
    /// Stored as `'\0'`. Only display-width rendering treats it specially;
    /// under codepoint advance a `'\0'` cell is an ordinary character.
    #[inline]
    #[must_use]
    pub const fn continuation(fg: Color, bg: Color, style: Style) -> Self {
        Self {
            ch: CONTINUATION,
            fg,
            bg,
            style,
        }
    }

    // ─── Queries ──────────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn is_continuation(&self) -> bool {
        self.ch == CONTINUATION
    }

    /// Whether this is exactly the default cell.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// Whether `other` renders with the same colors and style, ignoring the
    /// character.
    #[inline]
    #[must_use]
    pub fn same_style(&self, other: &Self) -> bool {
        self.fg == other.fg && self.bg == other.bg && self.style == other.style
    }

    // ─── Mutation ─────────────────────────────────────────────────────────

    /// Reset to the default cell in place.
    #[inline]
    pub const fn clear(&mut self) {
        *self = Self::EMPTY;
    }

    #[inline]
    #[must_use]
    pub const fn with_fg(self, fg: Color) -> Self {
        Self { fg, ..self }
    }

    #[inline]
    #[must_use]
    pub const fn with_bg(self, bg: Color) -> Self {
        Self { bg, ..self }
    }

    #[inline]
    #[must_use]
    pub const fn with_style(self, style: Style) -> Self {
        Self { style, ..self }
    }
}

impl Default for Cell {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_continuation() {
            return write!(f, "Cell(continuation)");
        }
        write!(f, "Cell({:?}", self.ch)?;
        if !self.fg.is_default() {
            write!(f, ", fg={:?}", self.fg)?;
        }
        if !self.bg.is_default() {
            write!(f, ", bg={:?}", self.bg)?;
        }
        if !self.style.is_empty() {
            write!(f, ", {:?}", self.style)?;
        }
        write!(f, ")")
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_cell_fields() {
        let cell = Cell::default();
        assert_eq!(cell.ch, ' ');
        assert_eq!(cell.fg, Color::DEFAULT);
        assert_eq!(cell.bg, Color::DEFAULT);
        assert_eq!(cell.style, Style::NONE);
        assert!(cell.is_empty());
    }

    #[test]
    fn new_keeps_all_fields() {
        let cell = Cell::new('Z', Color::rgb(1, 2, 3), Color::index(200), Style::DIM);
        assert_eq!(cell.ch, 'Z');
        assert_eq!(cell.fg, Color::rgb(1, 2, 3));
        assert_eq!(cell.bg, Color::index(200));
        assert_eq!(cell.style, Style::DIM);
    }

    #[test]
    fn clear_resets_styled_cell() {
        let mut cell = Cell::new('X', Color::RED, Color::BLUE, Style::BOLD | Style::REVERSE);
        cell.clear();
        assert_eq!(cell, Cell::EMPTY);
    }

    #[test]
    fn equality_checks_every_field() {
        let base = Cell::new('A', Color::RED, Color::BLUE, Style::BOLD);
        assert_eq!(base, base);
        assert_ne!(base, Cell { ch: 'B', ..base });
        assert_ne!(base, base.with_fg(Color::GREEN));
        assert_ne!(base, base.with_bg(Color::GREEN));
        assert_ne!(base, base.with_style(Style::ITALIC));
    }

    #[test]
    fn same_style_ignores_character() {
        let a = Cell::new('A', Color::RED, Color::DEFAULT, Style::NONE);
        let b = Cell::new('B', Color::RED, Color::DEFAULT, Style::NONE);
        assert!(a.same_style(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn same_style_sees_each_attribute() {
        let a = Cell::EMPTY;
        assert!(!a.same_style(&a.with_fg(Color::RED)));
        assert!(!a.same_style(&a.with_bg(Color::RED)));
        assert!(!a.same_style(&a.with_style(Style::CONCEAL)));
    }

    #[test]
    fn continuation_carries_attributes() {
        let cell = Cell::continuation(Color::CYAN, Color::rgb(9, 9, 9), Style::UNDERLINE);
        assert!(cell.is_continuation());
        assert_eq!(cell.fg, Color::CYAN);
        assert_eq!(cell.bg, Color::rgb(9, 9, 9));
        assert!(!Cell::EMPTY.is_continuation());
    }

    #[test]
    fn unicode_cell() {
        assert_eq!(Cell::EMPTY.with_fg(Color::RED).ch, ' ');
        let cell = Cell { ch: '日', ..Cell::EMPTY };
        assert_eq!(cell.ch, '日');
    }

    #[test]
    fn debug_formats() {
        assert_eq!(format!("{:?}", Cell::EMPTY), "Cell(' ')");
        let cell = Cell::new('A', Color::RED, Color::DEFAULT, Style::BOLD);
        let dbg = format!("{cell:?}");
        assert!(dbg.contains("Cell('A'"));
        assert!(dbg.contains("fg=ansi16(1)"));
        assert!(dbg.contains("BOLD"));
        assert!(!dbg.contains("bg="));
        assert_eq!(
            format!("{:?}", Cell::continuation(Color::DEFAULT, Color::DEFAULT, Style::NONE)),
            "Cell(continuation)"
        );
    }

    proptest! {
        #[test]
        fn clear_always_yields_default(
            ch in any::<char>(),
            r in any::<u8>(),
            idx in any::<u8>(),
            bits in 0u16..0x200,
        ) {
            let mut cell = Cell::new(ch, Color::rgb(r, 0, 0), Color::index(idx), Style::from_bits_truncate(bits));
            cell.clear();
            prop_assert_eq!(cell, Cell::default());
        }
    }
}
