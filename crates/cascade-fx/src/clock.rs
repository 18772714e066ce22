//! The frame clock.
//!
//! A monotonic tick counter. Every effect is a pure function of the frame
//! number it is handed (plus its own state and random source), so the clock
//! is the only notion of time inside the animation. Wall-clock pacing lives
//! in the loop's sleep, not here.

/// Monotonic frame counter, advanced exactly once per loop iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameClock {
    frame: u64,
}

impl FrameClock {
    /// A clock at frame 0.
    #[must_use]
    pub const fn new() -> Self {
        Self { frame: 0 }
    }

    /// The current frame.
    #[must_use]
    pub const fn frame(self) -> u64 {
        self.frame
    }

    /// Move to the next frame.
    pub const fn advance(&mut self) {
        self.frame += 1;
    }
}

/// Whether `frame` falls on a `cadence` boundary.
///
/// Cadences are validated non-zero at construction.
#[inline]
#[must_use]
pub fn on_cadence(frame: u64, cadence: u32) -> bool {
    frame % u64::from(cadence) == 0
}
