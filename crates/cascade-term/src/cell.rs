// SPDX-License-Identifier: MIT
//
// Cell: one character position of the animation grid.
//
// A cell is a character plus a foreground color and a small set of text
// attributes. The noise effect paints palette-indexed colors, the streamer
// paints plain text in the terminal default color, and the completion
// marker is painted bold. Nothing else is needed, so the cell stays small
// and `Copy`, which keeps the diff loop a straight slice comparison.

use crate::color::CellColor;

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text attributes stored as a compact bitfield.
    ///
    /// These map directly to SGR parameters:
    ///
    /// ```
    /// use cascade_term::cell::Attr;
    ///
    /// let style = Attr::BOLD | Attr::DIM;
    /// assert!(style.contains(Attr::BOLD));
    /// assert!(!style.contains(Attr::ITALIC));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1: increased intensity.
        const BOLD   = 1 << 0;
        /// SGR 2: decreased intensity (faint).
        const DIM    = 1 << 1;
        /// SGR 3: italic.
        const ITALIC = 1 << 2;
    }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// A single grid cell: character, foreground color, attributes.
///
/// The default cell is a space in the terminal's default color. Cells are
/// compared with the derived `PartialEq`, so a change in character *or*
/// color *or* attributes makes the diff renderer emit the cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Character to display.
    pub ch: char,
    /// Foreground color. [`CellColor::Default`] means "unset".
    pub fg: CellColor,
    /// Text attributes.
    pub attrs: Attr,
}

impl Cell {
    /// An empty cell: space, default color, no attributes.
    pub const EMPTY: Self = Self {
        ch: ' ',
        fg: CellColor::Default,
        attrs: Attr::empty(),
    };

    /// Create a cell with a character and default styling.
    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            ch,
            fg: CellColor::Default,
            attrs: Attr::empty(),
        }
    }

    /// Create a cell with a character and a foreground color.
    #[inline]
    #[must_use]
    pub const fn colored(ch: char, fg: CellColor) -> Self {
        Self {
            ch,
            fg,
            attrs: Attr::empty(),
        }
    }

    /// Set the foreground color.
    #[inline]
    #[must_use]
    pub const fn with_fg(self, fg: CellColor) -> Self {
        Self { fg, ..self }
    }

    /// Set text attributes.
    #[inline]
    #[must_use]
    pub const fn with_attrs(self, attrs: Attr) -> Self {
        Self { attrs, ..self }
    }

    /// Whether this cell is visually empty (space, default color, no attrs).
    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }

    /// Whether two cells share colors and attributes, ignoring the character.
    #[inline]
    #[must_use]
    pub fn same_style(self, other: &Self) -> bool {
        self.fg == other.fg && self.attrs == other.attrs
    }
}

impl Default for Cell {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cell({:?}", self.ch)?;
        if self.fg != CellColor::Default {
            write!(f, ", fg={:?}", self.fg)?;
        }
        if !self.attrs.is_empty() {
            write!(f, ", {:?}", self.attrs)?;
        }
        write!(f, ")")
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
