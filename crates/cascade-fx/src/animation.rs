//! The animation loop.
//!
//! Owns everything for one run: the frame clock, the row pipelines in top
//! to bottom order, the double-buffered renderer, and the [`Surface`] the
//! changes are painted to. One iteration is:
//!
//! ```text
//! check cancel ─▶ tick every row into the back grid ─▶ diff ─▶ paint ─▶ commit ─▶ clock + 1
//! ```
//!
//! The run ends when the last row's text is fully revealed. A settle pass
//! then finalizes any row still waiting for it (so the last row gets its
//! completion message), and the loop blocks once for a keypress.
//! Cancellation (the token, Ctrl-C, SIGINT) ends the run after the current
//! tick and skips the wait.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, trace};

use cascade_term::diff::DiffRenderer;
use cascade_term::reader::Input;
use cascade_term::surface::Surface;

use crate::clock::FrameClock;
use crate::config::{LoopConfig, RowConfig, Sequencing};
use crate::error::ConfigError;
use crate::pipeline::RowPipeline;

/// How long each acknowledgement poll blocks before rechecking the token.
const ACK_POLL: Duration = Duration::from_millis(50);

/// Spreads one seed across rows so neighbours don't share a sequence.
const ROW_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

// ---------------------------------------------------------------------------
// CancelToken
// ---------------------------------------------------------------------------

/// Shared flag that stops a run after its current tick.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that hasn't fired.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether `cancel` has been called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of a single [`AnimationLoop::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// More ticks to go.
    Running,
    /// The last row's text is fully shown.
    Finished,
    /// Cancelled before the tick ran.
    Cancelled,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every row played out.
    Completed {
        /// Ticks executed.
        frames: u64,
    },
    /// Stopped early by the token or an interrupt.
    Cancelled {
        /// Ticks executed before the stop.
        frames: u64,
    },
}

impl RunOutcome {
    /// Ticks executed.
    #[must_use]
    pub const fn frames(self) -> u64 {
        match self {
            Self::Completed { frames } | Self::Cancelled { frames } => frames,
        }
    }
}

// ---------------------------------------------------------------------------
// AnimationLoop
// ---------------------------------------------------------------------------

/// Drives every row of one animation onto a [`Surface`].
pub struct AnimationLoop<S: Surface> {
    clock: FrameClock,
    pipelines: Vec<RowPipeline>,
    renderer: DiffRenderer,
    surface: S,
    cancel: CancelToken,
    config: LoopConfig,
}

impl<S: Surface> AnimationLoop<S> {
    /// Build a loop over a `width x height` grid.
    ///
    /// Rows are ordered by row index; under [`Sequencing::Waterfall`] each
    /// row waits for the one before it in that order.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoRows`] for an empty row list, the first row that
    /// fails [`RowConfig::validate`], or [`ConfigError::DuplicateRow`] when
    /// two configs share a row index.
    pub fn new(
        width: u16,
        height: u16,
        mut rows: Vec<RowConfig>,
        config: LoopConfig,
        surface: S,
    ) -> Result<Self, ConfigError> {
        if rows.is_empty() {
            return Err(ConfigError::NoRows);
        }
        for row in &rows {
            row.validate(width, height)?;
        }
        rows.sort_by_key(|row| row.row);
        if let Some(pair) = rows.windows(2).find(|pair| pair[0].row == pair[1].row) {
            return Err(ConfigError::DuplicateRow { row: pair[0].row });
        }

        let pipelines = rows
            .iter()
            .map(|row| RowPipeline::new(row, row_rng(config.seed, row.row)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            clock: FrameClock::new(),
            pipelines,
            renderer: DiffRenderer::new(width, height),
            surface,
            cancel: CancelToken::new(),
            config,
        })
    }

    /// A handle that cancels this loop from elsewhere.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run one iteration.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface fails to paint.
    pub fn tick(&mut self) -> io::Result<TickOutcome> {
        if self.cancel.is_cancelled() {
            return Ok(TickOutcome::Cancelled);
        }
        if self.surface.poll_input() == Some(Input::Interrupt) {
            self.cancel.cancel();
            return Ok(TickOutcome::Cancelled);
        }
        if self.is_finished() {
            return Ok(TickOutcome::Finished);
        }

        let frame = self.clock.frame();
        for i in 0..self.pipelines.len() {
            let unblocked = match self.config.sequencing {
                Sequencing::Parallel => true,
                Sequencing::Waterfall => i == 0 || self.pipelines[i - 1].noise_done(),
            };
            self.pipelines[i].tick(frame, unblocked, self.renderer.back_mut());
        }
        self.flush()?;
        self.clock.advance();

        Ok(if self.is_finished() {
            TickOutcome::Finished
        } else {
            TickOutcome::Running
        })
    }

    /// Diff, paint, commit.
    fn flush(&mut self) -> io::Result<()> {
        let changes = self.renderer.diff();
        trace!(
            frame = self.clock.frame(),
            changed = changes.len(),
            skipped = self.renderer.stats().cells_skipped,
            "frame painted"
        );
        self.surface.paint(&changes)?;
        self.renderer.commit();
        Ok(())
    }

    /// Tick until the last row finishes or the run is cancelled, then
    /// settle and wait for acknowledgement.
    ///
    /// The surface is set up before the first tick and restored before
    /// returning, including on error.
    ///
    /// # Errors
    ///
    /// Returns the first surface error.
    pub fn run(&mut self) -> io::Result<RunOutcome> {
        self.surface.begin()?;
        let result = self.run_ticks();
        let restored = self.surface.end();
        let outcome = result?;
        restored?;
        Ok(outcome)
    }

    fn run_ticks(&mut self) -> io::Result<RunOutcome> {
        info!(rows = self.pipelines.len(), "animation started");
        loop {
            match self.tick()? {
                TickOutcome::Running => thread::sleep(self.config.tick_interval),
                TickOutcome::Finished => break,
                TickOutcome::Cancelled => {
                    let frames = self.clock.frame();
                    info!(frames, "animation cancelled");
                    return Ok(RunOutcome::Cancelled { frames });
                }
            }
        }

        self.settle()?;
        let frames = self.clock.frame();
        info!(frames, "animation finished");

        if self.config.wait_for_ack {
            self.wait_for_ack()?;
        }
        Ok(RunOutcome::Completed { frames })
    }

    /// Finalize rows whose text completed and paint the result, without
    /// advancing the clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface fails to paint.
    pub fn settle(&mut self) -> io::Result<()> {
        for pipeline in &mut self.pipelines {
            pipeline.settle(self.renderer.back_mut());
        }
        self.flush()
    }

    /// Block until any input arrives or the token fires.
    fn wait_for_ack(&mut self) -> io::Result<()> {
        while !self.cancel.is_cancelled() {
            if let Some(input) = self.surface.wait_input(ACK_POLL)? {
                if input == Input::Interrupt {
                    self.cancel.cancel();
                }
                break;
            }
        }
        Ok(())
    }

    /// Whether the last row's text is fully shown.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.pipelines.last().is_some_and(RowPipeline::is_complete)
    }

    /// Frames ticked so far.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.clock.frame()
    }

    /// The rows, top to bottom.
    #[must_use]
    pub fn pipelines(&self) -> &[RowPipeline] {
        &self.pipelines
    }

    /// Mutable access to the rows, e.g. to swap a palette mid-run.
    pub fn pipelines_mut(&mut self) -> &mut [RowPipeline] {
        &mut self.pipelines
    }

    /// The renderer; its front grid is what was last painted.
    #[must_use]
    pub const fn renderer(&self) -> &DiffRenderer {
        &self.renderer
    }

    /// The surface.
    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Take the surface back.
    #[must_use]
    pub fn into_surface(self) -> S {
        self.surface
    }
}

/// A row's random source: derived from the loop seed, or from the OS.
fn row_rng(seed: Option<u64>, row: u16) -> StdRng {
    seed.map_or_else(StdRng::from_os_rng, |seed| {
        StdRng::seed_from_u64(seed ^ u64::from(row).wrapping_mul(ROW_SEED_MIX))
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DoneTrigger;
    use crate::pipeline::RowPhase;
    use cascade_term::surface::HeadlessSurface;
    use pretty_assertions::assert_eq;

    fn rows(texts: &[&str]) -> Vec<RowConfig> {
        texts
            .iter()
            .zip(0u16..)
            .map(|(text, row)| {
                let mut cfg = RowConfig::new(row, *text);
                cfg.noise.length = 3;
                cfg
            })
            .collect()
    }

    fn config() -> LoopConfig {
        LoopConfig {
            tick_interval: Duration::ZERO,
            seed: Some(7),
            ..LoopConfig::default()
        }
    }

    fn build(texts: &[&str], config: LoopConfig) -> AnimationLoop<HeadlessSurface> {
        let height = u16::try_from(texts.len()).unwrap();
        AnimationLoop::new(20, height, rows(texts), config, HeadlessSurface::new(20, height))
            .unwrap()
    }

    // -- construction -------------------------------------------------------

    #[test]
    fn no_rows_rejected() {
        let err = AnimationLoop::new(10, 1, Vec::new(), config(), HeadlessSurface::new(10, 1))
            .err()
            .unwrap();
        assert_eq!(err, ConfigError::NoRows);
    }

    #[test]
    fn geometry_checked_against_grid() {
        let err = AnimationLoop::new(10, 1, rows(&["a", "b"]), config(), HeadlessSurface::new(10, 1))
            .err()
            .unwrap();
        assert_eq!(err, ConfigError::RowOutOfBounds { row: 1, height: 1 });
    }

    #[test]
    fn duplicate_rows_rejected() {
        let mut configs = rows(&["Hello", "ab", "cd"]);
        configs[2].row = 0;
        let err = AnimationLoop::new(20, 2, configs, config(), HeadlessSurface::new(20, 2))
            .err()
            .unwrap();
        assert_eq!(err, ConfigError::DuplicateRow { row: 0 });
    }

    #[test]
    fn rows_sorted_top_to_bottom() {
        let mut configs = rows(&["a", "b"]);
        configs.reverse();
        let anim =
            AnimationLoop::new(20, 2, configs, config(), HeadlessSurface::new(20, 2)).unwrap();
        let order: Vec<u16> = anim.pipelines().iter().map(RowPipeline::row).collect();
        assert_eq!(order, vec![0, 1]);
    }

    // -- ticking ------------------------------------------------------------

    #[test]
    fn tick_advances_clock_and_paints() {
        let mut anim = build(&["abc"], config());
        assert_eq!(anim.tick().unwrap(), TickOutcome::Running);
        assert_eq!(anim.frame(), 1);
        assert_eq!(anim.surface().frames().len(), 1);
        assert!(!anim.surface().frames()[0].is_empty());
    }

    #[test]
    fn front_grid_matches_surface() {
        let mut anim = build(&["ab", "cd"], config());
        for _ in 0..4 {
            anim.tick().unwrap();
        }
        assert_eq!(anim.renderer().front(), anim.surface().screen());
    }

    #[test]
    fn waterfall_holds_second_row() {
        let mut anim = build(&["abc", "xyz"], config());
        anim.tick().unwrap();
        assert_eq!(anim.pipelines()[1].phase(), RowPhase::Waiting);
    }

    #[test]
    fn parallel_starts_every_row() {
        let mut anim = build(
            &["abc", "xyz"],
            LoopConfig {
                sequencing: Sequencing::Parallel,
                ..config()
            },
        );
        anim.tick().unwrap();
        assert_eq!(anim.pipelines()[1].phase(), RowPhase::Animating);
    }

    #[test]
    fn finished_tick_does_nothing() {
        let mut anim = build(&["a"], config());
        assert_eq!(anim.tick().unwrap(), TickOutcome::Finished);
        assert_eq!(anim.tick().unwrap(), TickOutcome::Finished);
        assert_eq!(anim.frame(), 1);
    }

    // -- running ------------------------------------------------------------

    #[test]
    fn run_completes_settles_and_waits_once() {
        let mut anim = build(&["ab", "cd"], config());
        let outcome = anim.run().unwrap();
        assert!(matches!(outcome, RunOutcome::Completed { .. }));
        assert!(anim.pipelines().iter().all(RowPipeline::is_finalized));
        assert_eq!(anim.surface().acks_waited(), 1);
        assert!(anim.surface().is_closed());
    }

    #[test]
    fn interrupt_during_ack_ends_the_wait() {
        let surface = HeadlessSurface::new(20, 1).with_input_after(usize::MAX, Input::Interrupt);
        let mut anim = AnimationLoop::new(20, 1, rows(&["ab"]), config(), surface).unwrap();
        let token = anim.cancel_token();

        let outcome = anim.run().unwrap();
        assert!(matches!(outcome, RunOutcome::Completed { .. }));
        assert_eq!(anim.surface().acks_waited(), 1);
        assert!(token.is_cancelled());
        assert!(anim.surface().is_closed());
    }

    #[test]
    fn cancelled_token_skips_the_wait() {
        let mut anim = build(&["ab"], config());
        while anim.tick().unwrap() == TickOutcome::Running {}
        anim.cancel_token().cancel();
        anim.wait_for_ack().unwrap();
        assert_eq!(anim.surface().acks_waited(), 0);
    }

    #[test]
    fn run_without_ack() {
        let mut anim = build(
            &["ab"],
            LoopConfig {
                wait_for_ack: false,
                ..config()
            },
        );
        anim.run().unwrap();
        assert_eq!(anim.surface().acks_waited(), 0);
    }

    #[test]
    fn cancel_token_stops_before_tick() {
        let mut anim = build(&["abcdef"], config());
        anim.cancel_token().cancel();
        let outcome = anim.run().unwrap();
        assert_eq!(outcome, RunOutcome::Cancelled { frames: 0 });
        assert_eq!(anim.surface().acks_waited(), 0);
        assert!(anim.surface().is_closed());
    }

    #[test]
    fn interrupt_cancels_mid_run() {
        let rows = rows(&["abcdefgh"]);
        let surface = HeadlessSurface::new(20, 1).with_input_after(3, Input::Interrupt);
        let mut anim = AnimationLoop::new(20, 1, rows, config(), surface).unwrap();
        let outcome = anim.run().unwrap();
        assert_eq!(outcome, RunOutcome::Cancelled { frames: 3 });
        assert_eq!(anim.surface().acks_waited(), 0);
    }

    #[test]
    fn keys_during_run_are_ignored() {
        let rows = rows(&["abc"]);
        let surface = HeadlessSurface::new(20, 1).with_input_after(1, Input::Key);
        let mut anim = AnimationLoop::new(20, 1, rows, config(), surface).unwrap();
        assert!(matches!(anim.run().unwrap(), RunOutcome::Completed { frames: 3 }));
    }

    #[test]
    fn same_seed_same_screen() {
        let mut a = build(&["ab", "cd"], config());
        let mut b = build(&["ab", "cd"], config());
        a.run().unwrap();
        b.run().unwrap();
        assert_eq!(a.surface().screen(), b.surface().screen());
    }

    #[test]
    fn after_frames_trigger_unblocks_early() {
        let mut configs = rows(&["abcdef", "xy"]);
        configs[0].done_trigger = DoneTrigger::AfterFrames(1);
        let mut anim =
            AnimationLoop::new(20, 2, configs, config(), HeadlessSurface::new(20, 2)).unwrap();
        anim.tick().unwrap();
        assert!(anim.pipelines()[0].noise_done());
        assert_eq!(anim.pipelines()[1].phase(), RowPhase::Animating);
    }
}
