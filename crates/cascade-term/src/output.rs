// SPDX-License-Identifier: MIT
//
// Output buffering and stateful change encoding.
//
//   OutputBuffer: collects a whole frame's bytes so the terminal sees one
//   write() per tick instead of one per escape sequence.
//
//   CellWriter: remembers where the cursor is and which color/attributes
//   are active, so a run of same-colored neighbours in a row of changes
//   costs one cursor move and one SGR sequence, then just characters.

use std::io::{self, Write};

use crate::ansi;
use crate::cell::Attr;
use crate::color::CellColor;
use crate::diff::Change;

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// Byte buffer holding one frame of ANSI output.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 8_192;

impl OutputBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append a character as UTF-8.
    #[inline]
    pub fn write_char(&mut self, ch: char) {
        let mut enc = [0u8; 4];
        self.buf
            .extend_from_slice(ch.encode_utf8(&mut enc).as_bytes());
    }

    /// Drop the contents, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write everything to `w`, flush it, and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Real flushing happens in flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── CellWriter ──────────────────────────────────────────────────────────────

/// Encodes [`Change`]s, skipping escapes the terminal state makes redundant.
///
/// - Cursor moves are skipped when the change sits right after the last
///   one on the same row (the terminal auto-advances).
/// - Attribute changes go through SGR 0 when attributes are dropped, which
///   also forgets the tracked color.
/// - The foreground color is emitted only when it differs.
#[allow(clippy::struct_field_names)]
pub struct CellWriter {
    last_x: i32,
    last_y: i32,
    last_fg: Option<CellColor>,
    last_attrs: Attr,
}

impl CellWriter {
    /// Create a writer with no tracked state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_x: -1,
            last_y: -1,
            last_fg: None,
            last_attrs: Attr::empty(),
        }
    }

    /// Forget all tracked state. Call at the start of every frame, since
    /// the frame ends with an SGR reset.
    pub const fn reset_state(&mut self) {
        *self = Self::new();
    }

    /// Encode one change.
    pub fn write_change(&mut self, out: &mut OutputBuffer, change: &Change) {
        let x = i32::from(change.x);
        let y = i32::from(change.y);
        let cell = change.cell;

        if y != self.last_y || x != self.last_x + 1 {
            ansi::cursor_to(out, change.x, change.y).ok();
        }

        if cell.attrs != self.last_attrs {
            if !self.last_attrs.is_empty() {
                ansi::reset(out).ok();
                self.last_fg = None;
            }
            ansi::attrs(out, cell.attrs).ok();
            self.last_attrs = cell.attrs;
        }

        if self.last_fg != Some(cell.fg) {
            ansi::fg(out, cell.fg).ok();
            self.last_fg = Some(cell.fg);
        }

        out.write_char(cell.ch);

        self.last_x = x;
        self.last_y = y;
    }

    /// Encode a whole change list as one synchronized frame.
    ///
    /// An empty list produces no bytes at all.
    pub fn write_frame(&mut self, out: &mut OutputBuffer, changes: &[Change]) {
        if changes.is_empty() {
            return;
        }
        self.reset_state();
        ansi::begin_sync(out).ok();
        for change in changes {
            self.write_change(out, change);
        }
        ansi::reset(out).ok();
        ansi::end_sync(out).ok();
    }
}

impl Default for CellWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
