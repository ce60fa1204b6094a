// SPDX-License-Identifier: MIT
//
// cellterm — a terminal screen buffer with an ANSI renderer.
//
// Applications paint cells (a character plus foreground, background and
// style) into an in-memory grid, then `show` serializes the whole grid as
// ANSI/SGR escape sequences. Attribute codes are only re-emitted when the
// attributes change from one cell to the next.
//
// Colors come in three tiers (24-bit RGB, the 256-color palette, the 16
// basic colors) plus the terminal default, and can be reduced one way to a
// lower tier for terminals that cannot do better.
//
// The grid is guarded by a reader/writer lock, so a `Screen` can be drawn
// into from several threads. Raw-mode handling lives behind the
// `TerminalSession` trait; everything else is plain data and byte encoding,
// and runs the same against a `Vec<u8>` as against a real terminal.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod color;
pub mod error;
pub mod render;
pub mod screen;
pub mod style;
pub mod terminal;

pub use buffer::{FrameBuffer, TextAdvance};
pub use cell::Cell;
pub use color::{Color, ColorDepth, ColorMode};
pub use error::{Error, RenderOp, Result};
pub use render::{RenderStats, render_to};
pub use screen::{Screen, ScreenOptions};
pub use style::Style;
pub use terminal::{Size, TerminalSession, Tty};
