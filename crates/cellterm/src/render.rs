// SPDX-License-Identifier: MIT
//
// Full-frame renderer with run-length attribute suppression.
//
// Every call walks the whole buffer, row-major, and writes:
//
//   ESC[H                       once, cursor to origin
//   ESC[0m fg? bg? style?       whenever (fg, bg, style) differs from the
//                               last triple emitted in this walk
//   <char>                      for every cell
//   CR LF                       between rows (never after the last)
//   ESC[0m                      once at the end
//
// The "last emitted" triple starts out empty, so the first cell always gets
// its reset. Consecutive cells sharing a triple cost one character each.
// That is the only saving: there is no memory of the previous frame and no
// cursor jumping, so an unchanged screen costs as much as a new one.
//
// Under display-width advance, the second column of a wide glyph holds a
// continuation cell that prints nothing, since the glyph already covers it.
// Under codepoint advance there are no continuation cells and every
// character goes out as stored, NUL included.
//
// Writes go straight to the sink. The first failing write ends the walk and
// comes back as `Error::Render` naming the step, so a broken pipe shows up
// as "failed to write character" rather than a bare I/O error. The buffer
// is only ever read.

use std::io::{self, Write};

use unicode_width::UnicodeWidthChar;

use crate::ansi;
use crate::buffer::{FrameBuffer, TextAdvance};
use crate::cell::Cell;
use crate::color::{Color, ColorDepth};
use crate::error::{Error, RenderOp, Result};
use crate::style::Style;

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// Counters from one render walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Cells visited.
    pub cells: usize,
    /// Times the attribute triple changed (and SGR codes were written).
    pub attribute_changes: usize,
    /// Bytes handed to the sink.
    pub bytes_written: usize,
}

// ─── CellWriter ──────────────────────────────────────────────────────────────

/// The attribute triple as last written to the terminal.
type Attrs = (Color, Color, Style);

/// Stateful cell encoder that skips SGR codes the terminal already has.
///
/// Colors are reduced to the configured [`ColorDepth`] before comparison,
/// so two RGB colors that land on the same palette entry share a run.
struct CellWriter {
    depth: ColorDepth,
    advance: TextAdvance,
    last: Option<Attrs>,
    changes: usize,
}

impl CellWriter {
    const fn new(depth: ColorDepth, advance: TextAdvance) -> Self {
        Self {
            depth,
            advance,
            last: None,
            changes: 0,
        }
    }

    /// Emit one cell. `prev` is the cell to its left on the same row.
    fn render_cell(&mut self, out: &mut impl Write, cell: &Cell, prev: Option<&Cell>) -> Result<()> {
        let attrs = (
            cell.fg.downgrade(self.depth),
            cell.bg.downgrade(self.depth),
            cell.style,
        );
        if self.last != Some(attrs) {
            Self::apply(out, attrs)?;
            self.last = Some(attrs);
            self.changes += 1;
        }

        if self.advance == TextAdvance::DisplayWidth && cell.is_continuation() {
            // The wide glyph to the left already covered this column.
            if prev.is_some_and(|p| p.ch.width() == Some(2)) {
                return Ok(());
            }
            // Orphaned continuation: keep the row width intact.
            return out
                .write_all(b" ")
                .map_err(|e| Error::render(RenderOp::Character, e));
        }

        let mut enc = [0u8; 4];
        out.write_all(cell.ch.encode_utf8(&mut enc).as_bytes())
            .map_err(|e| Error::render(RenderOp::Character, e))
    }

    /// Reset, then set whatever differs from the terminal defaults.
    fn apply(out: &mut impl Write, (fg, bg, style): Attrs) -> Result<()> {
        ansi::reset(out).map_err(|e| Error::render(RenderOp::ResetAttributes, e))?;
        if !fg.is_default() {
            ansi::fg(out, fg).map_err(|e| Error::render(RenderOp::Foreground, e))?;
        }
        if !bg.is_default() {
            ansi::bg(out, bg).map_err(|e| Error::render(RenderOp::Background, e))?;
        }
        if !style.is_empty() {
            ansi::style(out, style).map_err(|e| Error::render(RenderOp::Style, e))?;
        }
        Ok(())
    }
}

// ─── Byte counting ───────────────────────────────────────────────────────────

/// Pass-through writer that counts accepted bytes.
struct Counting<'a, W: Write> {
    inner: &'a mut W,
    bytes: usize,
}

impl<W: Write> Write for Counting<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.bytes += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

// ─── render_to ───────────────────────────────────────────────────────────────

/// Serialize the whole buffer to `out` and flush it.
///
/// `advance` must match the advance the buffer was drawn with: it decides
/// whether `'\0'` cells are continuations or ordinary characters.
///
/// # Errors
///
/// Returns [`Error::Render`] for the first write (or the final flush) that
/// fails. Nothing after the failing step is written.
///
/// # Examples
///
/// ```
/// use cellterm::buffer::{FrameBuffer, TextAdvance};
/// use cellterm::color::{Color, ColorDepth};
/// use cellterm::render::render_to;
/// use cellterm::style::Style;
///
/// let mut buf = FrameBuffer::new(2, 1);
/// buf.draw_text(0, 0, "hi", Color::RED, Color::DEFAULT, Style::NONE, TextAdvance::Codepoint);
///
/// let mut out = Vec::new();
/// render_to(&buf, &mut out, ColorDepth::TrueColor, TextAdvance::Codepoint)?;
/// assert_eq!(out, b"\x1b[H\x1b[0m\x1b[31mhi\x1b[0m");
/// # Ok::<(), cellterm::Error>(())
/// ```
pub fn render_to<W: Write>(
    buf: &FrameBuffer,
    out: &mut W,
    depth: ColorDepth,
    advance: TextAdvance,
) -> Result<RenderStats> {
    let _span = tracing::debug_span!(
        "cellterm.render",
        width = buf.width(),
        height = buf.height(),
        ?depth,
        ?advance
    )
    .entered();

    let mut out = Counting { inner: out, bytes: 0 };
    let mut writer = CellWriter::new(depth, advance);

    ansi::cursor_home(&mut out).map_err(|e| Error::render(RenderOp::CursorHome, e))?;

    let rows = buf.rows();
    let last_row = rows.len().saturating_sub(1);
    for (y, row) in rows.enumerate() {
        let mut prev = None;
        for cell in row {
            writer.render_cell(&mut out, cell, prev)?;
            prev = Some(cell);
        }
        if y < last_row {
            ansi::line_break(&mut out).map_err(|e| Error::render(RenderOp::LineBreak, e))?;
        }
    }

    ansi::reset(&mut out).map_err(|e| Error::render(RenderOp::FinalReset, e))?;
    out.flush().map_err(|e| Error::render(RenderOp::Flush, e))?;

    let stats = RenderStats {
        cells: buf.cells().len(),
        attribute_changes: writer.changes,
        bytes_written: out.bytes,
    };
    tracing::trace!(?stats, "frame rendered");
    Ok(stats)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
