// SPDX-License-Identifier: MIT
//
// Terminal setup for the length of one animation.
//
// Safety: termios (tcgetattr/tcsetattr), ioctl(TIOCGWINSZ), isatty and the
// raw fd write in the panic hook are POSIX calls with no safe wrapper in
// std. Each unsafe block is a single call.
#![allow(unsafe_code)]
//
// While the animation plays the terminal is on the alternate screen with
// the cursor hidden, and stdin is in raw mode:
//
//   - no echo, no line buffering: the acknowledgement keypress arrives as
//     soon as it is typed.
//   - no ISIG: Ctrl-C arrives as byte 0x03, which the reader reports as an
//     interrupt, instead of killing the process between a frame's bytes.
//
// `RawMode` is a guard for the termios half. `Terminal` pairs it with the
// screen half and puts both back on `leave()`, on drop, or (since a panic
// may unwind past neither) from a panic hook that writes straight to fd 1.

use std::io::{self, Write};
#[cfg(unix)]
use std::sync::Mutex;
use std::sync::Once;

use crate::ansi;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns.
    pub cols: u16,
    /// Number of rows.
    pub rows: u16,
}

impl Size {
    /// Used when stdout isn't a terminal (pipes, CI).
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };

    /// Ask the kernel for stdout's window size.
    #[cfg(unix)]
    #[must_use]
    pub fn query() -> Option<Self> {
        let mut win: libc::winsize = unsafe { std::mem::zeroed() };
        let rc = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut win) };
        if rc != 0 || win.ws_col == 0 || win.ws_row == 0 {
            return None;
        }
        Some(Self {
            cols: win.ws_col,
            rows: win.ws_row,
        })
    }

    #[cfg(not(unix))]
    #[must_use]
    pub fn query() -> Option<Self> {
        None
    }

    /// The window size, or [`Size::FALLBACK`].
    #[must_use]
    pub fn current() -> Self {
        Self::query().unwrap_or(Self::FALLBACK)
    }
}

/// Whether stdin is a terminal. Raw mode is skipped when it isn't.
#[cfg(unix)]
#[must_use]
pub fn stdin_is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) == 1 }
}

#[cfg(not(unix))]
#[must_use]
pub fn stdin_is_tty() -> bool {
    false
}

// ─── RawMode ────────────────────────────────────────────────────────────────

/// termios the panic hook restores. Set while a [`RawMode`] is alive.
#[cfg(unix)]
static SAVED_TERMIOS: Mutex<Option<libc::termios>> = Mutex::new(None);

/// stdin in raw mode; the previous settings come back on drop.
#[cfg(unix)]
pub struct RawMode {
    saved: libc::termios,
}

#[cfg(unix)]
impl RawMode {
    /// Switch stdin to raw mode. `Ok(None)` when stdin isn't a terminal.
    ///
    /// # Errors
    ///
    /// Returns the OS error if termios can't be read or written.
    pub fn enable() -> io::Result<Option<Self>> {
        if !stdin_is_tty() {
            return Ok(None);
        }

        let mut saved: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut saved) } != 0 {
            return Err(io::Error::last_os_error());
        }

        let mut raw = saved;
        raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::IXON | libc::ISTRIP);
        raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN);
        raw.c_cflag |= libc::CS8;
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;
        set_termios(&raw)?;

        if let Ok(mut slot) = SAVED_TERMIOS.lock() {
            *slot = Some(saved);
        }
        Ok(Some(Self { saved }))
    }
}

#[cfg(unix)]
impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = set_termios(&self.saved);
        if let Ok(mut slot) = SAVED_TERMIOS.lock() {
            *slot = None;
        }
    }
}

#[cfg(unix)]
fn set_termios(termios: &libc::termios) -> io::Result<()> {
    if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, termios) } == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// No termios off unix; raw mode is a no-op.
#[cfg(not(unix))]
pub struct RawMode;

#[cfg(not(unix))]
impl RawMode {
    /// Always `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Never.
    pub const fn enable() -> io::Result<Option<Self>> {
        Ok(None)
    }
}

// ─── Panic Hook ─────────────────────────────────────────────────────────────

/// Close any synchronized update, reset colors, show the cursor, and leave
/// the alternate screen last so the shell comes back intact.
#[rustfmt::skip]
const PANIC_RESTORE: &[u8] = b"\
    \x1b[?2026l\
    \x1b[0m\
    \x1b[?25h\
    \x1b[?1049l";

static HOOK: Once = Once::new();

fn install_panic_hook() {
    HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_after_panic();
            previous(info);
        }));
    });
}

/// Runs inside the panic hook. The stdout lock may be held by the frame
/// that panicked, so the escape bytes go to fd 1 directly.
fn restore_after_panic() {
    #[cfg(unix)]
    {
        unsafe {
            let _ = libc::write(
                libc::STDOUT_FILENO,
                PANIC_RESTORE.as_ptr().cast(),
                PANIC_RESTORE.len(),
            );
        }
        if let Ok(slot) = SAVED_TERMIOS.lock() {
            if let Some(saved) = slot.as_ref() {
                unsafe {
                    libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, saved);
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        let mut out = io::stdout();
        let _ = out.write_all(PANIC_RESTORE);
        let _ = out.flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Owns the terminal while an animation is on screen.
///
/// ```no_run
/// use cascade_term::terminal::Terminal;
///
/// let mut term = Terminal::new();
/// term.enter()?;
/// // ... paint frames ...
/// term.leave()?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Terminal {
    raw: Option<RawMode>,
    size: Size,
    active: bool,
}

impl Terminal {
    /// Capture the window size. Nothing is changed until
    /// [`enter`](Self::enter).
    #[must_use]
    pub fn new() -> Self {
        Self {
            raw: None,
            size: Size::current(),
            active: false,
        }
    }

    /// Size captured at construction. Resizes during a run are ignored.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Whether the terminal is currently set up for the animation.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Raw mode, alternate screen, hidden cursor, blank screen. Calling it
    /// again while active does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if termios or the screen setup write fails.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        install_panic_hook();
        self.raw = RawMode::enable()?;

        let mut setup = Vec::with_capacity(32);
        ansi::enter_alt_screen(&mut setup)?;
        ansi::cursor_hide(&mut setup)?;
        ansi::clear_screen(&mut setup)?;
        write_now(&setup)?;

        self.active = true;
        Ok(())
    }

    /// Undo [`enter`](Self::enter). Calling it while inactive does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the screen restore write fails. Raw mode is
    /// dropped either way.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let mut teardown = Vec::with_capacity(32);
        ansi::end_sync(&mut teardown)?;
        ansi::reset(&mut teardown)?;
        ansi::cursor_show(&mut teardown)?;
        ansi::exit_alt_screen(&mut teardown)?;
        let written = write_now(&teardown);

        self.raw = None;
        written
    }
}

fn write_now(bytes: &[u8]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    out.write_all(bytes)?;
    out.flush()
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
