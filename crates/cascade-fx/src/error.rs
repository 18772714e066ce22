//! Configuration errors.
//!
//! Everything that can go wrong with an animation is caught when it is
//! built: a zero cadence would divide by zero on the first tick, and a row
//! that doesn't fit the grid would panic on its first paint. Both are
//! rejected up front as a [`ConfigError`], so a constructed effect or loop
//! never fails at tick time.

/// A rejected effect, row, or loop configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A cadence of zero. `what` names the field (`"char_cadence"`, ...).
    #[error("{what} must be at least 1")]
    ZeroCadence {
        /// Which cadence was zero.
        what: &'static str,
    },

    /// `gradient_length` of zero would expand the palette to nothing.
    #[error("gradient_length must be at least 1")]
    ZeroGradientLength,

    /// A palette with no colors.
    #[error("palette must contain at least one color")]
    EmptyPalette,

    /// An indicator needs at least two slots to move between.
    #[error("indicator length {length} is too short (minimum 2)")]
    IndicatorTooShort {
        /// The rejected length.
        length: u16,
    },

    /// A row index at or past the grid height.
    #[error("row {row} is outside a grid of height {height}")]
    RowOutOfBounds {
        /// The rejected row.
        row: u16,
        /// Grid height.
        height: u16,
    },

    /// Something on a row would be painted past the right edge.
    #[error("row {row} paints up to column {end}, past a grid of width {width}")]
    SpanOutOfBounds {
        /// The offending row.
        row: u16,
        /// One past the last column the row would paint.
        end: u32,
        /// Grid width.
        width: u16,
    },

    /// Two rows configured for the same grid row. They would paint over
    /// each other.
    #[error("row {row} is configured more than once")]
    DuplicateRow {
        /// The repeated row index.
        row: u16,
    },

    /// An animation with nothing to animate.
    #[error("at least one row is required")]
    NoRows,
}

/// Reject a zero cadence.
///
/// # Errors
///
/// Returns [`ConfigError::ZeroCadence`] naming `what` if `value` is zero.
pub const fn nonzero_cadence(value: u32, what: &'static str) -> Result<u32, ConfigError> {
    if value == 0 {
        Err(ConfigError::ZeroCadence { what })
    } else {
        Ok(value)
    }
}
