// SPDX-License-Identifier: MIT
//
// Screen — the thread-safe handle applications draw through.
//
// Owns three things, each behind its own lock:
//
//   buffer   RwLock<FrameBuffer>   cell writes take it exclusively, reads and
//                                  rendering share it
//   sink     Mutex<Option<W>>      where rendered bytes go (stdout by default);
//                                  only `into_writer` takes it out
//   session  Mutex<Option<..>>     the raw-mode terminal, if any
//
// Lock order is always buffer → sink → session, so no two operations can
// deadlock. `draw_text` re-acquires the buffer lock per character: another
// writer may land between two characters of the same string.
//
// Poisoned locks are recovered. The buffer is plain `Copy` cells, so a
// writer that panicked mid-operation cannot leave it structurally invalid.
//
// A screen built with `new`/`with_writer` has no session: nothing is put
// into raw mode, and `close` only writes the teardown bytes. That is also
// how the tests drive it.
//
// A screen that still holds a session when dropped (or turned back into its
// writer) closes itself first, so the terminal never stays raw with the
// cursor hidden. Headless screens write nothing on drop.

use std::io::{self, Stdout, Write};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::ansi;
use crate::buffer::{FrameBuffer, TextAdvance};
use crate::cell::Cell;
use crate::color::{Color, ColorDepth};
use crate::error::{Error, Result};
use crate::render::{self, RenderStats};
use crate::style::Style;
use crate::terminal::{TerminalSession, Tty};

// ─── ScreenOptions ──────────────────────────────────────────────────────────

/// Knobs for how a [`Screen`] draws.
///
/// ```
/// use cellterm::{ColorDepth, ScreenOptions, TextAdvance};
///
/// let opts = ScreenOptions::new()
///     .color_depth(ColorDepth::Indexed256)
///     .text_advance(TextAdvance::DisplayWidth);
/// assert!(opts.hide_cursor);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenOptions {
    /// Colors richer than this are reduced before encoding.
    pub color_depth: ColorDepth,
    /// How `draw_text` advances across the row.
    pub text_advance: TextAdvance,
    /// Hide the cursor when the screen is set up.
    pub hide_cursor: bool,
}

impl ScreenOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            color_depth: ColorDepth::TrueColor,
            text_advance: TextAdvance::Codepoint,
            hide_cursor: true,
        }
    }

    #[must_use]
    pub const fn color_depth(mut self, depth: ColorDepth) -> Self {
        self.color_depth = depth;
        self
    }

    #[must_use]
    pub const fn text_advance(mut self, advance: TextAdvance) -> Self {
        self.text_advance = advance;
        self
    }

    #[must_use]
    pub const fn hide_cursor(mut self, hide: bool) -> Self {
        self.hide_cursor = hide;
        self
    }
}

impl Default for ScreenOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Screen ─────────────────────────────────────────────────────────────────

type Session = Box<dyn TerminalSession + Send>;

/// A drawable terminal screen.
///
/// All drawing methods take `&self`, so a `Screen` can be shared between
/// threads (behind an `Arc`) and painted from several of them at once.
///
/// # Examples
///
/// ```
/// use cellterm::{Cell, Color, Screen, Style};
///
/// let screen = Screen::new(20, 2);
/// screen.draw_text(0, 0, "hello", Color::GREEN, Color::DEFAULT, Style::BOLD);
/// assert_eq!(screen.get_cell(1, 0).ch, 'e');
/// assert_eq!(screen.get_cell(99, 0), Cell::default());
/// ```
pub struct Screen<W: Write = Stdout> {
    buffer: RwLock<FrameBuffer>,
    sink: Mutex<Option<W>>,
    session: Mutex<Option<Session>>,
    options: ScreenOptions,
    closed: bool,
}

impl Screen<Stdout> {
    /// Take over the terminal on stdout with default options.
    ///
    /// Checks that stdout is a terminal, sizes the buffer to it, enters raw
    /// mode, then clears the screen, homes and hides the cursor.
    ///
    /// # Errors
    ///
    /// [`Error::NotATerminal`] when stdout is not a terminal;
    /// [`Error::SetupFailed`] when the size query, raw mode or the setup
    /// write fails. Raw mode is undone before a setup-write error returns.
    pub fn init() -> Result<Self> {
        Self::init_with(ScreenOptions::default())
    }

    /// [`init`](Self::init) with explicit options.
    ///
    /// # Errors
    ///
    /// See [`init`](Self::init).
    pub fn init_with(options: ScreenOptions) -> Result<Self> {
        Self::open(io::stdout(), Box::new(Tty::new()), options)
    }

    /// A headless screen that renders to stdout without touching the
    /// terminal mode.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is not positive.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_writer(width, height, io::stdout(), ScreenOptions::default())
    }
}

impl<W: Write> Screen<W> {
    /// A headless screen that renders into `sink`.
    ///
    /// No setup sequence is written; the first [`show`](Self::show) is the
    /// first output.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is not positive.
    #[must_use]
    pub fn with_writer(width: i32, height: i32, sink: W, options: ScreenOptions) -> Self {
        Self::assemble(FrameBuffer::new(width, height), sink, None, options)
    }

    /// Set up a screen on an arbitrary terminal session.
    ///
    /// Runs the same steps as [`Screen::init`], in order: terminal check,
    /// size query, raw mode, buffer allocation, setup write.
    ///
    /// # Errors
    ///
    /// See [`Screen::init`]. A zero-sized terminal is reported as
    /// [`Error::SetupFailed`].
    pub fn open(mut sink: W, mut session: Session, options: ScreenOptions) -> Result<Self> {
        let _span = tracing::info_span!("cellterm.init").entered();

        if !session.is_terminal() {
            return Err(Error::NotATerminal);
        }

        let size = session.size().map_err(Error::SetupFailed)?;
        if size.is_empty() {
            return Err(Error::SetupFailed(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("terminal reported {}x{} cells", size.cols, size.rows),
            )));
        }

        session.enter_raw().map_err(Error::SetupFailed)?;

        let buffer = FrameBuffer::new(i32::from(size.cols), i32::from(size.rows));

        if let Err(e) = write_setup(&mut sink, options.hide_cursor) {
            if let Err(restore_err) = session.restore() {
                tracing::warn!(error = %restore_err, "restore after failed setup also failed");
            }
            return Err(Error::SetupFailed(e));
        }

        tracing::info!(cols = size.cols, rows = size.rows, "screen initialized");
        Ok(Self::assemble(buffer, sink, Some(session), options))
    }

    fn assemble(buffer: FrameBuffer, sink: W, session: Option<Session>, options: ScreenOptions) -> Self {
        Self {
            buffer: RwLock::new(buffer),
            sink: Mutex::new(Some(sink)),
            session: Mutex::new(session),
            options,
            closed: false,
        }
    }

    // ─── Options ─────────────────────────────────────────────────────────

    #[must_use]
    pub const fn options(&self) -> ScreenOptions {
        self.options
    }

    /// Replace the options. Takes effect on the next draw or show; the
    /// cursor visibility chosen at setup is not revisited.
    pub const fn set_options(&mut self, options: ScreenOptions) {
        self.options = options;
    }

    // ─── Cells ───────────────────────────────────────────────────────────

    /// `(width, height)` of the buffer.
    #[must_use]
    pub fn size(&self) -> (i32, i32) {
        self.read().size()
    }

    /// Write one cell. Out-of-range positions are ignored.
    pub fn set_cell(&self, x: i32, y: i32, cell: Cell) {
        self.write().set(x, y, cell);
    }

    /// The cell at `(x, y)`, or the default cell when out of range.
    #[must_use]
    pub fn get_cell(&self, x: i32, y: i32) -> Cell {
        self.read().get(x, y)
    }

    /// Reset every cell to the default cell. Nothing is written to the
    /// terminal until the next [`show`](Self::show).
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Draw `text` left to right from `(x, y)`, clipping at the right edge.
    ///
    /// The buffer lock is taken once per character.
    pub fn draw_text(&self, x: i32, y: i32, text: &str, fg: Color, bg: Color, style: Style) {
        let advance = self.options.text_advance;
        let mut col = x;
        for ch in text.chars() {
            let w = self.write().put_char(col, y, ch, fg, bg, style, advance);
            col = col.saturating_add(w);
        }
    }

    /// Change the buffer size, keeping the overlapping content.
    ///
    /// Ignored if either dimension is not positive.
    pub fn resize(&self, width: i32, height: i32) {
        if self.write().resize(width, height) {
            tracing::debug!(width, height, "screen resized");
        } else {
            tracing::debug!(width, height, "resize to non-positive size ignored");
        }
    }

    // ─── Output ──────────────────────────────────────────────────────────

    /// Render the whole buffer to the sink and flush it.
    ///
    /// Holds the buffer read lock for the whole walk, so the frame is one
    /// consistent snapshot; writers wait until it is done.
    ///
    /// # Errors
    ///
    /// [`Error::Render`] naming the step whose write failed.
    pub fn show(&self) -> Result<RenderStats> {
        let buffer = self.read();
        let mut sink = lock(&self.sink);
        let Some(out) = sink.as_mut() else {
            return Ok(RenderStats::default());
        };
        render::render_to(&buffer, out, self.options.color_depth, self.options.text_advance)
    }

    /// Flush the sink and wait for the terminal to take the bytes.
    ///
    /// # Errors
    ///
    /// [`Error::Sync`] when either step fails.
    pub fn sync(&self) -> Result<()> {
        if let Some(out) = lock(&self.sink).as_mut() {
            out.flush().map_err(Error::Sync)?;
        }
        if let Some(session) = lock(&self.session).as_ref() {
            session.drain().map_err(Error::Sync)?;
        }
        Ok(())
    }

    /// Reset attributes, show the cursor and leave raw mode.
    ///
    /// Safe to call more than once; only the first call does anything.
    ///
    /// # Errors
    ///
    /// [`Error::RestoreFailed`] when the teardown write or the terminal
    /// restore fails. Both are attempted regardless.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let written = match self.sink.get_mut().unwrap_or_else(PoisonError::into_inner) {
            Some(sink) => ansi::teardown(sink).and_then(|()| sink.flush()),
            None => Ok(()),
        };

        let session = self
            .session
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let restored = session.map_or(Ok(()), |mut s| s.restore());

        written.and(restored).map_err(Error::RestoreFailed)?;
        tracing::info!("screen closed");
        Ok(())
    }

    /// Whether [`close`](Self::close) has run.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Give back the sink, dropping the buffer.
    ///
    /// A screen still holding a terminal session is closed first, so the
    /// teardown bytes are the last thing in the returned sink.
    ///
    /// # Panics
    ///
    /// Never in practice: the sink is only taken out here, and this
    /// consumes the screen.
    pub fn into_writer(mut self) -> W {
        self.release();
        self.sink
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .expect("sink is only taken by into_writer")
    }

    /// Close the screen if it still owns a terminal session.
    fn release(&mut self) {
        if self.closed {
            return;
        }
        let holds_session = self
            .session
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        if !holds_session {
            return;
        }
        if let Err(e) = self.close() {
            tracing::warn!(error = %e, "closing screen on drop failed");
        }
    }

    // ─── Locks ───────────────────────────────────────────────────────────

    fn read(&self) -> RwLockReadGuard<'_, FrameBuffer> {
        self.buffer.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, FrameBuffer> {
        self.buffer.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write> Drop for Screen<W> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<W: Write> std::fmt::Debug for Screen<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (width, height) = self.size();
        f.debug_struct("Screen")
            .field("width", &width)
            .field("height", &height)
            .field("options", &self.options)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clear, home and (optionally) hide the cursor, then flush.
fn write_setup(w: &mut impl Write, hide_cursor: bool) -> io::Result<()> {
    if hide_cursor {
        ansi::setup(w)?;
    } else {
        ansi::clear_screen(w)?;
        ansi::cursor_home(w)?;
    }
    w.flush()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
