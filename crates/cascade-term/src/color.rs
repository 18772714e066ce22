// SPDX-License-Identifier: MIT
//
// Cell colors.
//
// The animation only ever paints two kinds of foreground: an index into the
// terminal's 256-color palette (noise gradients are lists of such indices)
// or the terminal default (plain streamed text). `CellColor` is exactly
// that, small and cheap to compare in the diff loop.

use std::fmt;

/// Compact foreground color stored in every [`Cell`](crate::cell::Cell).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellColor {
    /// ANSI 256-color palette index.
    Ansi256(u8),

    /// Terminal default color ("unset").
    #[default]
    Default,
}

impl CellColor {
    /// Whether this is the terminal default color.
    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }

    /// The palette index, or `None` for [`CellColor::Default`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> Option<u8> {
        match self {
            Self::Ansi256(idx) => Some(idx),
            Self::Default => None,
        }
    }
}

impl From<u8> for CellColor {
    fn from(idx: u8) -> Self {
        Self::Ansi256(idx)
    }
}

impl fmt::Debug for CellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ansi256(idx) => write!(f, "ansi({idx})"),
            Self::Default => write!(f, "default"),
        }
    }
}

impl fmt::Display for CellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
