// SPDX-License-Identifier: MIT
//
// Terminal session — raw mode, size query and guaranteed restore.
//
// Safety: termios (tcgetattr, tcsetattr, tcdrain), ioctl (TIOCGWINSZ),
// isatty and the raw fd write in the panic hook are plain POSIX calls with
// no safe wrapper in std. Each unsafe block is a single call.
#![allow(unsafe_code)]
//
// `TerminalSession` is the seam between the screen and the OS: the screen
// never touches termios itself, which keeps it testable against a fake
// session. `Tty` is the real one, always operating on stdout's fd.
//
// A session that entered raw mode puts the terminal back on drop, and the
// first successful `enter_raw` installs a process-wide panic hook that does
// the same before the panic message prints. The hook writes straight to fd 1 rather
// than through `io::stdout()`: the panic may have happened while the stdout
// lock was held mid-frame.

use std::io;
#[cfg(not(unix))]
use std::io::Write;
use std::sync::Once;
#[cfg(unix)]
use std::sync::{Mutex, PoisonError};

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

impl Size {
    #[inline]
    #[must_use]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    /// Whether either dimension is zero.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.cols == 0 || self.rows == 0
    }
}

// ─── TerminalSession ────────────────────────────────────────────────────────

/// The OS-level terminal operations a [`Screen`](crate::screen::Screen)
/// needs.
///
/// `enter_raw` and `restore` pair up: after a successful `enter_raw`, one
/// `restore` must put the terminal back exactly as it was. Calling
/// `restore` when raw mode is not active is a no-op.
pub trait TerminalSession {
    /// Whether the output is attached to a terminal.
    fn is_terminal(&self) -> bool;

    /// Current size in cells.
    ///
    /// # Errors
    ///
    /// Fails when the size cannot be queried.
    fn size(&self) -> io::Result<Size>;

    /// Switch to raw mode, remembering the previous state.
    ///
    /// # Errors
    ///
    /// Fails when the terminal state cannot be read or changed.
    fn enter_raw(&mut self) -> io::Result<()>;

    /// Return to the state saved by [`enter_raw`](Self::enter_raw).
    ///
    /// # Errors
    ///
    /// Fails when the saved state cannot be applied.
    fn restore(&mut self) -> io::Result<()>;

    /// Block until everything written so far has reached the terminal.
    ///
    /// # Errors
    ///
    /// Fails when the OS reports an error while draining.
    fn drain(&self) -> io::Result<()> {
        Ok(())
    }
}

// ─── Queries ────────────────────────────────────────────────────────────────

/// Query the size of the terminal on stdout via `ioctl(TIOCGWINSZ)`.
///
/// # Errors
///
/// Returns the OS error if the ioctl fails (stdout is not a terminal, for
/// instance).
#[cfg(unix)]
pub fn query_size() -> io::Result<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(Size::new(ws.ws_col, ws.ws_row))
}

#[cfg(not(unix))]
pub fn query_size() -> io::Result<Size> {
    Err(io::Error::new(io::ErrorKind::Unsupported, "terminal size query unsupported"))
}

/// Whether stdout is connected to a terminal.
#[cfg(unix)]
#[must_use]
pub fn stdout_is_tty() -> bool {
    unsafe { libc::isatty(libc::STDOUT_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn stdout_is_tty() -> bool {
    false
}

// ─── Panic-Safe Restore ─────────────────────────────────────────────────────

/// Saved termios for the panic hook, which cannot reach the `Tty` itself.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

#[cfg(unix)]
fn restore_termios_from_backup() {
    let guard = TERMIOS_BACKUP.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(ref original) = *guard {
        unsafe {
            let _ = libc::tcsetattr(libc::STDOUT_FILENO, libc::TCSANOW, original);
        }
    }
}

/// Reset attributes, show cursor. The same bytes `Screen::close` writes.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[0m\x1b[?25h";

static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Chain a hook in front of the current panic hook that restores the
/// terminal first, so the panic message lands on a usable terminal.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Tty ────────────────────────────────────────────────────────────────────

/// The process's controlling terminal, reached through stdout.
///
/// ```no_run
/// use cellterm::terminal::{TerminalSession, Tty};
///
/// let mut tty = Tty::new();
/// if tty.is_terminal() {
///     tty.enter_raw()?;
///     // ... draw ...
///     tty.restore()?;
/// }
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Default)]
pub struct Tty {
    #[cfg(unix)]
    original: Option<libc::termios>,
}

impl Tty {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            #[cfg(unix)]
            original: None,
        }
    }

    /// Whether raw mode is currently active through this handle.
    #[cfg(unix)]
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        self.original.is_some()
    }

    #[cfg(not(unix))]
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        false
    }
}

impl std::fmt::Debug for Tty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tty").field("raw", &self.is_raw()).finish()
    }
}

#[cfg(unix)]
impl TerminalSession for Tty {
    fn is_terminal(&self) -> bool {
        stdout_is_tty()
    }

    fn size(&self) -> io::Result<Size> {
        query_size()
    }

    fn enter_raw(&mut self) -> io::Result<()> {
        if self.original.is_some() {
            return Ok(());
        }

        let fd = libc::STDOUT_FILENO;
        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }
            let original = termios;

            // cfmakeraw equivalent.
            termios.c_iflag &= !(libc::IGNBRK
                | libc::BRKINT
                | libc::PARMRK
                | libc::ISTRIP
                | libc::INLCR
                | libc::IGNCR
                | libc::ICRNL
                | libc::IXON);
            termios.c_oflag &= !libc::OPOST;
            termios.c_lflag &=
                !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
            termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
            termios.c_cflag |= libc::CS8;
            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) != 0 {
                return Err(io::Error::last_os_error());
            }

            self.original = Some(original);
            *TERMIOS_BACKUP.lock().unwrap_or_else(PoisonError::into_inner) = Some(original);
        }
        install_panic_hook();

        tracing::debug!("raw mode entered");
        Ok(())
    }

    fn restore(&mut self) -> io::Result<()> {
        let Some(ref original) = self.original else {
            return Ok(());
        };

        unsafe {
            if libc::tcsetattr(libc::STDOUT_FILENO, libc::TCSAFLUSH, original) != 0 {
                return Err(io::Error::last_os_error());
            }
        }

        *TERMIOS_BACKUP.lock().unwrap_or_else(PoisonError::into_inner) = None;
        self.original = None;
        tracing::debug!("terminal mode restored");
        Ok(())
    }

    fn drain(&self) -> io::Result<()> {
        if self.original.is_none() {
            return Ok(());
        }
        if unsafe { libc::tcdrain(libc::STDOUT_FILENO) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

#[cfg(not(unix))]
impl TerminalSession for Tty {
    fn is_terminal(&self) -> bool {
        stdout_is_tty()
    }

    fn size(&self) -> io::Result<Size> {
        query_size()
    }

    fn enter_raw(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "raw mode unsupported"))
    }

    fn restore(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for Tty {
    fn drop(&mut self) {
        if self.is_raw() {
            let _ = self.restore();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
