// SPDX-License-Identifier: MIT
//
// Errors surfaced at the public boundary.
//
// Out-of-range cell access is not here on purpose: it is defined behavior
// (writes dropped, reads default), not a failure.

use std::fmt;
use std::io;

/// Which step of a render walk was writing when the sink failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderOp {
    CursorHome,
    ResetAttributes,
    Foreground,
    Background,
    Style,
    Character,
    LineBreak,
    FinalReset,
    Flush,
}

impl fmt::Display for RenderOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CursorHome => "move cursor",
            Self::ResetAttributes => "reset attributes",
            Self::Foreground => "set foreground color",
            Self::Background => "set background color",
            Self::Style => "set style",
            Self::Character => "write character",
            Self::LineBreak => "write newline",
            Self::FinalReset => "reset final attributes",
            Self::Flush => "flush output",
        })
    }
}

/// Everything that can go wrong talking to the terminal.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Standard output is not a terminal.
    #[error("not a terminal")]
    NotATerminal,

    /// Querying the size, entering raw mode or writing the setup sequence
    /// failed.
    #[error("terminal setup failed: {0}")]
    SetupFailed(#[source] io::Error),

    /// Putting the terminal back the way it was failed.
    #[error("terminal restore failed: {0}")]
    RestoreFailed(#[source] io::Error),

    /// The output sink failed part-way through a frame. The terminal may be
    /// left mid-sequence; the buffer is untouched.
    #[error("failed to {op}: {source}")]
    Render {
        op: RenderOp,
        #[source]
        source: io::Error,
    },

    /// Flushing the output sink failed.
    #[error("sync failed: {0}")]
    Sync(#[source] io::Error),
}

impl Error {
    /// Tag an I/O failure with the render step it came from.
    #[must_use]
    pub const fn render(op: RenderOp, source: io::Error) -> Self {
        Self::Render { op, source }
    }

    /// The render step that failed, if this is a render error.
    #[must_use]
    pub const fn render_op(&self) -> Option<RenderOp> {
        match self {
            Self::Render { op, .. } => Some(*op),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn sentinel_messages() {
        assert_eq!(Error::NotATerminal.to_string(), "not a terminal");
        let e = Error::SetupFailed(io::Error::other("no tty"));
        assert_eq!(e.to_string(), "terminal setup failed: no tty");
        let e = Error::RestoreFailed(io::Error::other("EIO"));
        assert_eq!(e.to_string(), "terminal restore failed: EIO");
    }

    #[test]
    fn render_error_names_the_step() {
        let e = Error::render(RenderOp::Foreground, io::Error::other("broken pipe"));
        assert_eq!(e.to_string(), "failed to set foreground color: broken pipe");
        assert_eq!(e.render_op(), Some(RenderOp::Foreground));
        assert!(e.source().is_some());
    }

    #[test]
    fn render_op_none_for_other_errors() {
        assert_eq!(Error::NotATerminal.render_op(), None);
    }

    #[test]
    fn every_step_has_a_description() {
        let ops = [
            RenderOp::CursorHome,
            RenderOp::ResetAttributes,
            RenderOp::Foreground,
            RenderOp::Background,
            RenderOp::Style,
            RenderOp::Character,
            RenderOp::LineBreak,
            RenderOp::FinalReset,
            RenderOp::Flush,
        ];
        for op in ops {
            assert!(!op.to_string().is_empty());
        }
    }
}
