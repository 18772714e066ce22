//! One row of the animation.
//!
//! A [`RowPipeline`] owns a row's noise strip, optional indicator and text
//! streamer, and moves them through four phases:
//!
//! ```text
//! Waiting ──unblocked──▶ Animating ──text shown / noise froze──▶ Revealing ──finalize──▶ Done
//! ```
//!
//! The phase is derived from the parts, never stored. A row is unblocked by
//! the loop (row 0 always is; row *i* once row *i-1*'s noise is done), and
//! once it has started it keeps running regardless of its predecessor.
//!
//! Per tick the order is fixed: finalize if the text finished on an earlier
//! tick, advance the parts if unblocked, then paint.

use rand::rngs::StdRng;
use tracing::debug;

use cascade_term::buffer::Grid;
use cascade_term::cell::Cell;

use crate::config::{DoneTrigger, RowConfig, RowLayout};
use crate::error::ConfigError;
use crate::indicator::{IndicatorSlot, Travel};
use crate::noise::GradientNoise;
use crate::streamer::TextStreamer;

/// Where a row is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowPhase {
    /// Blocked on the row above. Only the idle indicator is painted.
    Waiting,
    /// Noise running, text still revealing.
    Animating,
    /// The text is fully shown or the noise froze itself; not finalized yet.
    Revealing,
    /// Noise and indicator frozen, completion message showing.
    Done,
}

/// A row's effects and the sequencing between them.
#[derive(Debug, Clone)]
pub struct RowPipeline {
    row: u16,
    layout: RowLayout,
    noise: GradientNoise,
    indicator: IndicatorSlot,
    indicator_width: u16,
    message: String,
    streamer: TextStreamer,
    done_trigger: DoneTrigger,
    animated_ticks: u64,
    started: bool,
    finalized: bool,
}

impl RowPipeline {
    /// Build a row's effects. Geometry is checked separately by
    /// [`RowConfig::validate`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any effect rejects its settings.
    pub fn new(config: &RowConfig, rng: StdRng) -> Result<Self, ConfigError> {
        let indicator = IndicatorSlot::from_config(config.indicator.as_ref())?;
        let (indicator_width, message) = config.indicator.as_ref().map_or_else(
            || (0, String::new()),
            |ind| {
                let width = u16::try_from(ind.span_width()).unwrap_or(u16::MAX);
                (width, ind.message.clone())
            },
        );

        Ok(Self {
            row: config.row,
            layout: config.resolved_layout(),
            noise: GradientNoise::new(&config.noise, rng)?,
            indicator,
            indicator_width,
            message,
            streamer: TextStreamer::new(
                &config.text,
                config.start_frame,
                config.reveal_cadence,
            )?,
            done_trigger: config.done_trigger,
            animated_ticks: 0,
            started: false,
            finalized: false,
        })
    }

    // -- phase --------------------------------------------------------------

    /// The current phase.
    #[must_use]
    pub const fn phase(&self) -> RowPhase {
        if self.finalized {
            RowPhase::Done
        } else if !self.started {
            RowPhase::Waiting
        } else if self.noise.is_done() || self.streamer.is_complete() {
            RowPhase::Revealing
        } else {
            RowPhase::Animating
        }
    }

    /// Whether this row's noise has stopped. The row below waits on this.
    #[must_use]
    pub const fn noise_done(&self) -> bool {
        self.noise.is_done()
    }

    /// Whether the text is fully revealed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.streamer.is_complete()
    }

    /// Whether the row has finalized.
    #[must_use]
    pub const fn is_finalized(&self) -> bool {
        self.finalized
    }

    // -- ticking ------------------------------------------------------------

    /// Run one frame: finalize if due, advance if `unblocked` (or already
    /// started), paint into `grid`.
    pub fn tick(&mut self, frame: u64, unblocked: bool, grid: &mut Grid) {
        self.finalize_if_complete();
        if (unblocked || self.started) && !self.finalized {
            self.advance(frame);
        }
        self.paint(grid);
    }

    /// Finalize if due and paint, without advancing anything. Used once
    /// after the last row finishes so it gets its completion message.
    pub fn settle(&mut self, grid: &mut Grid) {
        self.finalize_if_complete();
        self.paint(grid);
    }

    fn finalize_if_complete(&mut self) {
        if self.streamer.is_complete() && !self.finalized {
            self.finalize();
        }
    }

    /// Freeze noise and indicator and switch the indicator to its
    /// completion message. Idempotent.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        self.noise.mark_done();
        self.indicator.mark_done(&self.message);
        self.finalized = true;
        debug!(row = self.row, "row finalized");
    }

    fn advance(&mut self, frame: u64) {
        if !self.started {
            self.started = true;
            debug!(row = self.row, frame, "row unblocked");
        }

        let was_done = self.noise.is_done();
        self.noise.generate(frame);
        if self.indicator.update(frame) == Some(Travel::Arrived) {
            debug!(row = self.row, laps = self.indicator.laps(), "indicator lap");
        }
        self.streamer.generate(frame);
        self.animated_ticks += 1;

        let trigger_fired = match self.done_trigger {
            DoneTrigger::StreamComplete => false,
            DoneTrigger::AfterFrames(n) => self.animated_ticks >= n,
            DoneTrigger::IndicatorLaps(n) => {
                !self.indicator.is_none() && self.indicator.laps() >= n
            }
        };
        if trigger_fired && !was_done {
            self.noise.mark_done();
            debug!(row = self.row, frame, "noise froze");
        }
    }

    /// Write this row's spans into `grid`. A waiting row shows its idle
    /// indicator and nothing else.
    ///
    /// # Panics
    ///
    /// Panics if the row doesn't fit `grid`; validate the config first.
    pub fn paint(&self, grid: &mut Grid) {
        let y = self.row;
        if !self.indicator.is_none() {
            grid.fill_span(self.layout.indicator_x, y, self.indicator_width, Cell::EMPTY);
            grid.put_cells(self.layout.indicator_x, y, self.indicator.cells());
        }
        if !self.started {
            return;
        }
        grid.put_cells(self.layout.noise_x, y, self.noise.cells());
        grid.put_cells(
            self.layout.text_x,
            y,
            self.streamer.revealed().iter().map(|&ch| Cell::new(ch)),
        );
    }

    // -- accessors ----------------------------------------------------------

    /// Grid row this pipeline paints.
    #[must_use]
    pub const fn row(&self) -> u16 {
        self.row
    }

    /// Column offsets.
    #[must_use]
    pub const fn layout(&self) -> RowLayout {
        self.layout
    }

    /// The noise strip.
    #[must_use]
    pub const fn noise(&self) -> &GradientNoise {
        &self.noise
    }

    /// Replace the noise strip's palette.
    ///
    /// # Errors
    ///
    /// [`ConfigError::EmptyPalette`] if `base` is empty.
    pub fn set_palette(&mut self, base: &[u8]) -> Result<(), ConfigError> {
        self.noise.set_palette(base)
    }

    /// The indicator.
    #[must_use]
    pub const fn indicator(&self) -> &IndicatorSlot {
        &self.indicator
    }

    /// The text streamer.
    #[must_use]
    pub const fn streamer(&self) -> &TextStreamer {
        &self.streamer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IndicatorConfig, IndicatorKind};
    use cascade_term::cell::Attr;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;

    fn row_config(text: &str) -> RowConfig {
        let mut cfg = RowConfig::new(0, text);
        cfg.noise.length = 4;
        cfg
    }

    fn pipeline(cfg: &RowConfig) -> RowPipeline {
        RowPipeline::new(cfg, StdRng::seed_from_u64(1)).unwrap()
    }

    // -- phases -------------------------------------------------------------

    #[test]
    fn walks_through_every_phase() {
        let mut p = pipeline(&row_config("ab"));
        let mut grid = Grid::new(20, 1);
        assert_eq!(p.phase(), RowPhase::Waiting);

        p.tick(0, false, &mut grid);
        assert_eq!(p.phase(), RowPhase::Waiting);

        p.tick(0, true, &mut grid);
        assert_eq!(p.phase(), RowPhase::Animating);

        p.tick(1, true, &mut grid);
        assert_eq!(p.phase(), RowPhase::Revealing);
        assert!(!p.noise_done());

        p.tick(2, true, &mut grid);
        assert_eq!(p.phase(), RowPhase::Done);
        assert!(p.noise_done());
    }

    #[test]
    fn keeps_running_once_started() {
        let mut p = pipeline(&row_config("abc"));
        let mut grid = Grid::new(20, 1);
        p.tick(0, true, &mut grid);
        p.tick(1, false, &mut grid);
        assert_eq!(p.streamer().revealed_len(), 2);
        assert_eq!(p.phase(), RowPhase::Animating);
    }

    #[test]
    fn never_unblocked_row_stays_put() {
        let mut p = pipeline(&row_config("abc"));
        let mut grid = Grid::new(20, 1);
        for frame in 0..5 {
            p.tick(frame, false, &mut grid);
        }
        assert_eq!(p.streamer().revealed_len(), 0);
        assert_eq!(p.phase(), RowPhase::Waiting);
        assert!(!p.noise_done());
    }

    // -- painting -----------------------------------------------------------

    #[test]
    fn waiting_row_paints_nothing() {
        let mut p = pipeline(&row_config("ab"));
        let mut grid = Grid::new(20, 1);
        p.tick(0, false, &mut grid);
        assert_eq!(grid.text_lines(), vec![String::new()]);
    }

    #[test]
    fn waiting_row_shows_idle_indicator() {
        let mut cfg = row_config("ab");
        cfg.indicator = Some(IndicatorConfig {
            kind: IndicatorKind::Traveling,
            length: 3,
            cadence: 1,
            message: "ok".to_owned(),
        });
        let mut p = pipeline(&cfg);
        let mut grid = Grid::new(40, 1);
        p.tick(0, false, &mut grid);
        p.tick(1, false, &mut grid);

        let line = grid.row_text(0).unwrap();
        let start = usize::from(p.layout().indicator_x);
        assert_eq!(line.trim_end(), format!("{:start$}Generating...", ""));
        assert_eq!(p.indicator().laps(), 0);
    }

    #[test]
    fn paints_noise_and_text_at_offsets() {
        let mut p = pipeline(&row_config("ab"));
        let mut grid = Grid::new(20, 1);
        p.tick(0, true, &mut grid);
        p.tick(1, true, &mut grid);
        let line = grid.row_text(0).unwrap();
        assert!(line[..4].chars().all(|c| c != ' '));
        assert_eq!(&line[5..7], "ab");
    }

    #[test]
    fn indicator_span_is_cleared_before_message() {
        let mut cfg = row_config("a");
        cfg.start_frame = 1;
        cfg.indicator = Some(IndicatorConfig {
            kind: IndicatorKind::Pendulum,
            length: 4,
            cadence: 1,
            message: "ok".to_owned(),
        });
        let mut p = pipeline(&cfg);
        let layout = p.layout();
        let mut grid = Grid::new(40, 1);
        p.tick(0, true, &mut grid);
        p.tick(1, true, &mut grid);
        assert_eq!(p.phase(), RowPhase::Revealing);
        p.tick(2, true, &mut grid);
        assert_eq!(p.phase(), RowPhase::Done);

        let line = grid.row_text(0).unwrap();
        let start = usize::from(layout.indicator_x);
        assert_eq!(&line[start..start + 14], format!("{:<14}", " ok"));
        assert!(grid.get(layout.indicator_x + 1, 0).unwrap().attrs.contains(Attr::BOLD));
    }

    // -- done triggers ------------------------------------------------------

    #[test]
    fn after_frames_freezes_noise_early() {
        let mut cfg = row_config("abcdef");
        cfg.done_trigger = DoneTrigger::AfterFrames(2);
        let mut p = pipeline(&cfg);
        let mut grid = Grid::new(20, 1);
        p.tick(0, true, &mut grid);
        assert!(!p.noise_done());
        p.tick(1, true, &mut grid);
        assert!(p.noise_done());
        assert_eq!(p.phase(), RowPhase::Revealing);

        // The text keeps going after the noise stops.
        p.tick(2, true, &mut grid);
        assert_eq!(p.streamer().revealed_len(), 3);
    }

    #[test]
    fn indicator_laps_freeze_noise() {
        let mut cfg = row_config("abcdefghij");
        cfg.done_trigger = DoneTrigger::IndicatorLaps(1);
        cfg.indicator = Some(IndicatorConfig {
            kind: IndicatorKind::Traveling,
            length: 3,
            cadence: 1,
            ..IndicatorConfig::default()
        });
        let mut p = pipeline(&cfg);
        let mut grid = Grid::new(60, 1);
        for frame in 0..2 {
            p.tick(frame, true, &mut grid);
        }
        assert!(!p.noise_done());
        p.tick(2, true, &mut grid);
        assert!(p.noise_done());
        assert_eq!(p.indicator().laps(), 1);
    }

    #[test]
    fn laps_trigger_without_indicator_waits_for_text() {
        let mut cfg = row_config("ab");
        cfg.done_trigger = DoneTrigger::IndicatorLaps(0);
        let mut p = pipeline(&cfg);
        let mut grid = Grid::new(20, 1);
        p.tick(0, true, &mut grid);
        assert!(!p.noise_done());
    }

    #[test]
    fn settle_finalizes_without_advancing() {
        let mut p = pipeline(&row_config("a"));
        let mut grid = Grid::new(20, 1);
        p.tick(0, true, &mut grid);
        assert_eq!(p.phase(), RowPhase::Revealing);
        let chars = p.noise().chars().to_vec();
        p.settle(&mut grid);
        assert_eq!(p.phase(), RowPhase::Done);
        assert_eq!(p.noise().chars(), chars.as_slice());
    }
}
