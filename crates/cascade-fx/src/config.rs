//! Row and loop configuration.
//!
//! Plain data with defaults. Nothing here is checked until a row is
//! validated against the grid it will paint into
//! ([`RowConfig::validate`]), which the animation loop does for every row
//! before building anything.
//!
//! # Row layout
//!
//! A row paints up to three spans left to right:
//!
//! ```text
//! <noise strip> <indicator> <text>
//! ^noise_x      ^indicator_x ^text_x
//! ```
//!
//! Without an explicit [`RowLayout`] the spans are packed with one blank
//! column between them, starting at column 0.

use std::time::Duration;

use crate::error::{ConfigError, nonzero_cadence};
use crate::indicator::{self, DEFAULT_MESSAGE};
use crate::palette::{GRAYSCALE, GradientPalette};

/// Default pause between ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(10);

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

/// Settings for a row's noise strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseConfig {
    /// Number of slots.
    pub length: u16,
    /// Characters roll every `char_cadence` frames.
    pub char_cadence: u32,
    /// The gradient scrolls every `color_cadence` frames.
    pub color_cadence: u32,
    /// How many slots each palette color spans.
    pub gradient_length: u16,
    /// Base 256-color indices, before expansion.
    pub palette: Vec<u8>,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            length: 30,
            char_cadence: 1,
            color_cadence: 1,
            gradient_length: 1,
            palette: GRAYSCALE.to_vec(),
        }
    }
}

/// Which indicator motion a row uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndicatorKind {
    /// Bounce between the ends.
    #[default]
    Pendulum,
    /// Walk to the end, one lap at a time.
    Traveling,
}

/// Settings for a row's indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorConfig {
    /// Motion.
    pub kind: IndicatorKind,
    /// Number of marker slots (at least 2).
    pub length: u16,
    /// The marker moves every `cadence` frames.
    pub cadence: u32,
    /// Shown in bold once the row finishes.
    pub message: String,
}

impl IndicatorConfig {
    /// Columns the indicator can occupy, running or finished.
    #[must_use]
    pub fn span_width(&self) -> usize {
        indicator::span_width(self.length, &self.message)
    }
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            kind: IndicatorKind::default(),
            length: 4,
            cadence: 1,
            message: DEFAULT_MESSAGE.to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// When a row's noise freezes on its own, unblocking the row below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DoneTrigger {
    /// Only when the row finalizes after its text is fully shown.
    #[default]
    StreamComplete,
    /// After this many animated ticks.
    AfterFrames(u64),
    /// After a traveling indicator completes this many laps. Rows without
    /// one fall back to [`DoneTrigger::StreamComplete`].
    IndicatorLaps(u32),
}

/// Column offsets of a row's three spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    /// First column of the noise strip.
    pub noise_x: u16,
    /// First column of the indicator.
    pub indicator_x: u16,
    /// First column of the text.
    pub text_x: u16,
}

impl RowLayout {
    /// Pack the spans from column 0 with one blank column between them.
    #[must_use]
    pub fn packed(noise_len: u16, indicator_width: Option<usize>) -> Self {
        let indicator_x = noise_len.saturating_add(1);
        let text_x = indicator_width.map_or(indicator_x, |w| {
            let w = u16::try_from(w).unwrap_or(u16::MAX);
            indicator_x.saturating_add(w).saturating_add(1)
        });
        Self {
            noise_x: 0,
            indicator_x,
            text_x,
        }
    }
}

/// Everything about one row of the animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowConfig {
    /// Grid row the pipeline paints.
    pub row: u16,
    /// Text revealed by the streamer.
    pub text: String,
    /// Noise strip settings.
    pub noise: NoiseConfig,
    /// First frame the text may start revealing.
    pub start_frame: u64,
    /// A character is revealed every `reveal_cadence` frames.
    pub reveal_cadence: u32,
    /// Optional indicator between noise and text.
    pub indicator: Option<IndicatorConfig>,
    /// When the noise freezes on its own.
    pub done_trigger: DoneTrigger,
    /// Explicit offsets, or `None` to pack the spans.
    pub layout: Option<RowLayout>,
}

impl RowConfig {
    /// A row with default effects.
    #[must_use]
    pub fn new(row: u16, text: impl Into<String>) -> Self {
        Self {
            row,
            text: text.into(),
            noise: NoiseConfig::default(),
            start_frame: 0,
            reveal_cadence: 1,
            indicator: None,
            done_trigger: DoneTrigger::default(),
            layout: None,
        }
    }

    /// The offsets this row paints at.
    #[must_use]
    pub fn resolved_layout(&self) -> RowLayout {
        self.layout.unwrap_or_else(|| {
            RowLayout::packed(
                self.noise.length,
                self.indicator.as_ref().map(IndicatorConfig::span_width),
            )
        })
    }

    /// Check every setting, and that the row fits a `width x height` grid.
    ///
    /// # Errors
    ///
    /// The first problem found, as a [`ConfigError`].
    pub fn validate(&self, width: u16, height: u16) -> Result<(), ConfigError> {
        nonzero_cadence(self.noise.char_cadence, "char_cadence")?;
        nonzero_cadence(self.noise.color_cadence, "color_cadence")?;
        GradientPalette::new(&self.noise.palette, self.noise.gradient_length)?;
        nonzero_cadence(self.reveal_cadence, "reveal_cadence")?;
        if let Some(ind) = &self.indicator {
            nonzero_cadence(ind.cadence, "indicator_cadence")?;
            if ind.length < 2 {
                return Err(ConfigError::IndicatorTooShort { length: ind.length });
            }
        }

        if self.row >= height {
            return Err(ConfigError::RowOutOfBounds {
                row: self.row,
                height,
            });
        }

        let layout = self.resolved_layout();
        let mut spans = vec![(layout.noise_x, usize::from(self.noise.length))];
        if let Some(ind) = &self.indicator {
            spans.push((layout.indicator_x, ind.span_width()));
        }
        spans.push((layout.text_x, self.text.chars().count()));
        for (x, len) in spans {
            let end = u64::from(x) + len as u64;
            if end > u64::from(width) {
                return Err(ConfigError::SpanOutOfBounds {
                    row: self.row,
                    end: u32::try_from(end).unwrap_or(u32::MAX),
                    width,
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Loop
// ---------------------------------------------------------------------------

/// How rows unblock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sequencing {
    /// Each row waits for the noise of the row above to finish.
    #[default]
    Waterfall,
    /// Every row starts at once.
    Parallel,
}

/// Loop-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopConfig {
    /// Pause between ticks.
    pub tick_interval: Duration,
    /// Row gating.
    pub sequencing: Sequencing,
    /// Block for a keypress after the last row finishes.
    pub wait_for_ack: bool,
    /// Seed for every row's random source. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            sequencing: Sequencing::default(),
            wait_for_ack: true,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // -- layout -------------------------------------------------------------

    #[test]
    fn packed_layout_without_indicator() {
        let layout = RowConfig::new(0, "Hi").resolved_layout();
        assert_eq!(
            layout,
            RowLayout {
                noise_x: 0,
                indicator_x: 31,
                text_x: 31
            }
        );
    }

    #[test]
    fn packed_layout_leaves_room_for_indicator() {
        let mut row = RowConfig::new(0, "Hi");
        row.noise.length = 5;
        row.indicator = Some(IndicatorConfig::default());
        // "Generating" + 4 slots = 14 columns.
        assert_eq!(row.resolved_layout().text_x, 6 + 14 + 1);
    }

    #[test]
    fn explicit_layout_wins() {
        let mut row = RowConfig::new(0, "Hi");
        row.layout = Some(RowLayout {
            noise_x: 2,
            indicator_x: 0,
            text_x: 40,
        });
        assert_eq!(row.resolved_layout().text_x, 40);
    }

    // -- validate -----------------------------------------------------------

    #[test]
    fn default_row_fits_default_terminal() {
        assert_eq!(RowConfig::new(3, "Hello world").validate(80, 24), Ok(()));
    }

    #[test]
    fn row_past_bottom_rejected() {
        assert_eq!(
            RowConfig::new(24, "x").validate(80, 24),
            Err(ConfigError::RowOutOfBounds {
                row: 24,
                height: 24
            })
        );
    }

    #[test]
    fn text_past_right_edge_rejected() {
        // Text starts at column 31.
        assert_eq!(
            RowConfig::new(0, "abcdef").validate(36, 1),
            Err(ConfigError::SpanOutOfBounds {
                row: 0,
                end: 37,
                width: 36
            })
        );
    }

    #[test]
    fn indicator_span_checked() {
        let mut row = RowConfig::new(0, "");
        row.noise.length = 1;
        row.indicator = Some(IndicatorConfig {
            message: "Message generated!".to_owned(),
            ..IndicatorConfig::default()
        });
        // Indicator at column 2, widest text 19 columns.
        assert_eq!(
            row.validate(20, 1),
            Err(ConfigError::SpanOutOfBounds {
                row: 0,
                end: 21,
                width: 20
            })
        );
    }

    #[test]
    fn bad_settings_rejected() {
        let mut row = RowConfig::new(0, "x");
        row.reveal_cadence = 0;
        assert_eq!(
            row.validate(80, 1),
            Err(ConfigError::ZeroCadence {
                what: "reveal_cadence"
            })
        );

        let mut row = RowConfig::new(0, "x");
        row.indicator = Some(IndicatorConfig {
            length: 1,
            ..IndicatorConfig::default()
        });
        assert_eq!(
            row.validate(80, 1),
            Err(ConfigError::IndicatorTooShort { length: 1 })
        );

        let mut row = RowConfig::new(0, "x");
        row.noise.palette.clear();
        assert_eq!(row.validate(80, 1), Err(ConfigError::EmptyPalette));
    }

    #[test]
    fn loop_defaults() {
        let cfg = LoopConfig::default();
        assert_eq!(cfg.tick_interval, Duration::from_millis(10));
        assert_eq!(cfg.sequencing, Sequencing::Waterfall);
        assert!(cfg.wait_for_ack);
        assert_eq!(cfg.seed, None);
    }
}
