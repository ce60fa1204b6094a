// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit; the renderer makes those. This module
// only knows the byte-level encoding of every sequence cellterm sends.
//
// The encodings are fixed: call sites and terminals in the wild depend on
// these exact bytes, so the tests below pin every one of them.

use std::io::{self, Write};

use crate::color::{Color, ColorMode};
use crate::style::Style;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to the top-left corner (CUP with no parameters).
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[H")
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Reset all SGR attributes to terminal defaults (SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

/// Row separator. CR LF rather than a bare LF: in raw mode the driver no
/// longer maps LF to CR LF, so a bare LF would drift the column.
#[inline]
pub fn line_break(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\r\n")
}

/// Initial screen setup: clear, home, hide cursor.
pub fn setup(w: &mut impl Write) -> io::Result<()> {
    clear_screen(w)?;
    cursor_home(w)?;
    cursor_hide(w)
}

/// Undo what [`setup`] changed that a termios restore doesn't: attributes
/// and cursor visibility.
pub fn teardown(w: &mut impl Write) -> io::Result<()> {
    reset(w)?;
    cursor_show(w)
}

// ─── Colors ──────────────────────────────────────────────────────────────────

/// Set the foreground (text) color.
///
/// 16-color indices use the compact codes (30–37, 90–97), 256-color indices
/// the `38;5;N` form, RGB the `38;2;R;G;B` form.
pub fn fg(w: &mut impl Write, color: Color) -> io::Result<()> {
    match color.mode() {
        ColorMode::Default => w.write_all(b"\x1b[39m"),
        ColorMode::Indexed16 => {
            let idx = u16::from(color.palette_index());
            if idx < 8 {
                write!(w, "\x1b[{}m", 30 + idx)
            } else {
                write!(w, "\x1b[{}m", 90 + idx - 8)
            }
        }
        ColorMode::Indexed256 => write!(w, "\x1b[38;5;{}m", color.palette_index()),
        ColorMode::TrueColor => {
            let (r, g, b) = color.channels();
            write!(w, "\x1b[38;2;{r};{g};{b}m")
        }
    }
}

/// Set the background color.
///
/// Same encoding strategy as [`fg`] with the background codes
/// (40–47, 100–107, `48;5;N`, `48;2;R;G;B`).
pub fn bg(w: &mut impl Write, color: Color) -> io::Result<()> {
    match color.mode() {
        ColorMode::Default => w.write_all(b"\x1b[49m"),
        ColorMode::Indexed16 => {
            let idx = u16::from(color.palette_index());
            if idx < 8 {
                write!(w, "\x1b[{}m", 40 + idx)
            } else {
                write!(w, "\x1b[{}m", 100 + idx - 8)
            }
        }
        ColorMode::Indexed256 => write!(w, "\x1b[48;5;{}m", color.palette_index()),
        ColorMode::TrueColor => {
            let (r, g, b) = color.channels();
            write!(w, "\x1b[48;2;{r};{g};{b}m")
        }
    }
}

// ─── Text Attributes ─────────────────────────────────────────────────────────

/// Emit one SGR sequence per set flag, in flag order.
///
/// `Style::BOLD | Style::UNDERLINE` becomes `\x1b[1m\x1b[4m`. Writes nothing
/// for an empty style.
pub fn style(w: &mut impl Write, style: Style) -> io::Result<()> {
    for code in style.sgr_params() {
        write!(w, "\x1b[{code}m")?;
    }
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
