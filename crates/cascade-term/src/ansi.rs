// SPDX-License-Identifier: MIT
//
// ANSI escape sequence encoding.
//
// Stateless writers for the handful of terminal commands the animation
// needs: cursor placement and visibility, screen clearing, SGR color and
// attribute changes, synchronized output, and the alternate screen. Deciding
// *when* to emit is `CellWriter`'s job.
//
// Coordinates are 0-indexed here and converted to the 1-indexed form the
// terminal expects.
use std::io::{self, Write};

use crate::cell::Attr;
use crate::color::CellColor;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` (CUP).
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
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

/// Reset all SGR state (SGR 0). Tracked color/attribute state is stale
/// afterwards.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

// ─── Color ───────────────────────────────────────────────────────────────────

/// Set the foreground color.
///
/// Indices 0–7 and 8–15 use the compact SGR 30–37 / 90–97 forms; everything
/// else uses the 256-color form `38;5;N`.
pub fn fg(w: &mut impl Write, color: CellColor) -> io::Result<()> {
    match color {
        CellColor::Default => w.write_all(b"\x1b[39m"),
        CellColor::Ansi256(idx @ 0..=7) => write!(w, "\x1b[{}m", 30 + u16::from(idx)),
        CellColor::Ansi256(idx @ 8..=15) => write!(w, "\x1b[{}m", 82 + u16::from(idx)),
        CellColor::Ansi256(idx) => write!(w, "\x1b[38;5;{idx}m"),
    }
}

// ─── Attributes ──────────────────────────────────────────────────────────────

const SGR_CODES: [(Attr, &[u8]); 3] = [
    (Attr::BOLD, b"1"),
    (Attr::DIM, b"2"),
    (Attr::ITALIC, b"3"),
];

/// Emit the SGR codes for `attr` as one sequence, e.g. `\x1b[1;3m`.
/// Writes nothing for an empty set.
pub fn attrs(w: &mut impl Write, attr: Attr) -> io::Result<()> {
    if attr.is_empty() {
        return Ok(());
    }

    w.write_all(b"\x1b[")?;
    let mut sep = false;
    for (flag, code) in SGR_CODES {
        if attr.contains(flag) {
            if sep {
                w.write_all(b";")?;
            }
            w.write_all(code)?;
            sep = true;
        }
    }
    w.write_all(b"m")
}

// ─── Synchronized Output ─────────────────────────────────────────────────────

/// Begin synchronized output (DEC 2026): the terminal holds the frame until
/// [`end_sync`].
#[inline]
pub fn begin_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026h")
}

/// End synchronized output.
#[inline]
pub fn end_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026l")
}

// ─── Alternate Screen ────────────────────────────────────────────────────────

/// Enter the alternate screen (DEC 1049).
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Leave the alternate screen, restoring the shell's content.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
