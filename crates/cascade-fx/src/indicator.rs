//! Progress indicators drawn next to a row's noise.
//!
//! An indicator is the word `Generating` followed by a strip of marker
//! slots, one of which holds the active marker. Two motions:
//!
//! - [`Pendulum`] bounces the marker between the first and last slot for as
//!   long as it runs.
//! - [`Traveling`] walks the marker from the first slot to the last, reports
//!   [`Travel::Arrived`], goes idle, and starts a new lap on the next update.
//!
//! A row owns at most one of them, chosen at construction through
//! [`IndicatorSlot`]. When the row finishes, `mark_done` freezes the
//! indicator and swaps its whole text for a bold completion message. The
//! pendulum puts one blank column in front of the message; the traveling
//! indicator starts it on its first column.

use cascade_term::cell::{Attr, Cell};

use crate::clock::on_cadence;
use crate::config::{IndicatorConfig, IndicatorKind};
use crate::error::{ConfigError, nonzero_cadence};

/// Text in front of the marker slots.
pub const LABEL: &str = "Generating";

/// Completion message when none is configured.
pub const DEFAULT_MESSAGE: &str = "Done";

const IDLE_MARK: char = '.';
const ACTIVE_MARK: char = '•';

/// Shortest indicator with somewhere to move.
const MIN_LENGTH: u16 = 2;

/// Columns the indicator can occupy: the larger of the running text
/// (label plus slots) and the completion text, counting the pendulum's
/// leading blank for either kind.
#[must_use]
pub fn span_width(length: u16, message: &str) -> usize {
    let running = LABEL.chars().count() + usize::from(length);
    let finished = 1 + message.chars().count();
    running.max(finished)
}

// ---------------------------------------------------------------------------
// Markers
// ---------------------------------------------------------------------------

/// The slot strip plus the completion text, shared by both motions.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Markers {
    slots: Vec<char>,
    completion: Option<String>,
}

impl Markers {
    fn new(length: u16) -> Result<Self, ConfigError> {
        if length < MIN_LENGTH {
            return Err(ConfigError::IndicatorTooShort { length });
        }
        Ok(Self {
            slots: vec![IDLE_MARK; usize::from(length)],
            completion: None,
        })
    }

    fn last(&self) -> usize {
        self.slots.len() - 1
    }

    fn activate(&mut self, slot: usize) {
        self.slots[slot] = ACTIVE_MARK;
    }

    fn deactivate(&mut self, slot: usize) {
        self.slots[slot] = IDLE_MARK;
    }

    fn active(&self) -> Option<usize> {
        self.slots.iter().position(|&c| c == ACTIVE_MARK)
    }

    fn finish(&mut self, text: String) {
        self.completion = Some(text);
    }

    const fn is_done(&self) -> bool {
        self.completion.is_some()
    }

    fn cells(&self) -> Vec<Cell> {
        match &self.completion {
            Some(text) => text
                .chars()
                .map(|ch| Cell::new(ch).with_attrs(Attr::BOLD))
                .collect(),
            None => LABEL
                .chars()
                .chain(self.slots.iter().copied())
                .map(Cell::new)
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Pendulum
// ---------------------------------------------------------------------------

/// Which way the pendulum moves next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward the last slot.
    Forward,
    /// Toward slot 0.
    Backward,
}

/// A marker bouncing between slot 0 and the last slot, forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pendulum {
    markers: Markers,
    position: usize,
    direction: Direction,
    previous: Option<usize>,
    cadence: u32,
}

impl Pendulum {
    /// A pendulum of `length` slots moving every `cadence` frames.
    ///
    /// # Errors
    ///
    /// [`ConfigError::IndicatorTooShort`] for fewer than two slots,
    /// [`ConfigError::ZeroCadence`] for a zero cadence.
    pub fn new(length: u16, cadence: u32) -> Result<Self, ConfigError> {
        Ok(Self {
            markers: Markers::new(length)?,
            position: 0,
            direction: Direction::Forward,
            previous: None,
            cadence: nonzero_cadence(cadence, "indicator_cadence")?,
        })
    }

    /// Swing once if `frame` is on cadence and the pendulum isn't done.
    pub fn update(&mut self, frame: u64) {
        if !self.markers.is_done() && on_cadence(frame, self.cadence) {
            self.swing();
        }
    }

    /// Show the marker at the current position, then step. The direction
    /// flips only at the two ends.
    fn swing(&mut self) {
        if let Some(prev) = self.previous {
            self.markers.deactivate(prev);
        }
        self.markers.activate(self.position);
        self.previous = Some(self.position);

        if self.position >= self.markers.last() {
            self.direction = Direction::Backward;
        } else if self.position == 0 {
            self.direction = Direction::Forward;
        }
        match self.direction {
            Direction::Forward => self.position += 1,
            Direction::Backward => self.position -= 1,
        }
    }

    /// Slot currently showing the marker, if any swing has happened.
    #[must_use]
    pub fn active(&self) -> Option<usize> {
        self.markers.active()
    }

    /// Direction of the next step.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Stop swinging and show `" " + message` instead.
    pub fn mark_done(&mut self, message: &str) {
        self.markers.finish(format!(" {message}"));
    }

    /// Whether `mark_done` has been called.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.markers.is_done()
    }

    /// What to paint.
    #[must_use]
    pub fn cells(&self) -> Vec<Cell> {
        self.markers.cells()
    }
}

// ---------------------------------------------------------------------------
// Traveling
// ---------------------------------------------------------------------------

/// What a [`Traveling::update`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Travel {
    /// Left idle: the marker is on slot 0.
    Started,
    /// Moved one slot toward the end.
    Moved,
    /// Off cadence, or done. Nothing moved.
    Held,
    /// Reached the last slot. The indicator is idle again.
    Arrived,
}

/// A marker walking from slot 0 to the last slot, one lap at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traveling {
    markers: Markers,
    /// `None` while idle.
    position: Option<usize>,
    cadence: u32,
    laps: u32,
}

impl Traveling {
    /// A traveling indicator of `length` slots moving every `cadence`
    /// frames.
    ///
    /// # Errors
    ///
    /// [`ConfigError::IndicatorTooShort`] for fewer than two slots,
    /// [`ConfigError::ZeroCadence`] for a zero cadence.
    pub fn new(length: u16, cadence: u32) -> Result<Self, ConfigError> {
        Ok(Self {
            markers: Markers::new(length)?,
            position: None,
            cadence: nonzero_cadence(cadence, "indicator_cadence")?,
            laps: 0,
        })
    }

    /// Advance the marker.
    ///
    /// Leaving idle ignores the cadence; every later step waits for it.
    pub fn update(&mut self, frame: u64) -> Travel {
        if self.markers.is_done() {
            return Travel::Held;
        }

        let Some(pos) = self.position else {
            // The arrival marker from the last lap is still showing.
            if let Some(shown) = self.markers.active() {
                self.markers.deactivate(shown);
            }
            self.markers.activate(0);
            self.position = Some(0);
            return Travel::Started;
        };

        if !on_cadence(frame, self.cadence) {
            return Travel::Held;
        }

        self.markers.deactivate(pos);
        let next = pos + 1;
        self.markers.activate(next);
        if next == self.markers.last() {
            self.position = None;
            self.laps += 1;
            Travel::Arrived
        } else {
            self.position = Some(next);
            Travel::Moved
        }
    }

    /// Whether the marker is between laps.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.position.is_none()
    }

    /// Slot currently showing the marker.
    #[must_use]
    pub fn active(&self) -> Option<usize> {
        self.markers.active()
    }

    /// Completed laps.
    #[must_use]
    pub const fn laps(&self) -> u32 {
        self.laps
    }

    /// Stop traveling and show `message` instead.
    pub fn mark_done(&mut self, message: &str) {
        self.markers.finish(message.to_owned());
    }

    /// Whether `mark_done` has been called.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.markers.is_done()
    }

    /// What to paint.
    #[must_use]
    pub fn cells(&self) -> Vec<Cell> {
        self.markers.cells()
    }
}

// ---------------------------------------------------------------------------
// IndicatorSlot
// ---------------------------------------------------------------------------

/// A row's optional indicator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IndicatorSlot {
    /// No indicator on this row.
    #[default]
    None,
    /// A bouncing marker.
    Pendulum(Pendulum),
    /// A one-way marker counting laps.
    Traveling(Traveling),
}

impl IndicatorSlot {
    /// Build the indicator a row asked for.
    ///
    /// # Errors
    ///
    /// Returns the indicator's construction error.
    pub fn from_config(config: Option<&IndicatorConfig>) -> Result<Self, ConfigError> {
        let Some(cfg) = config else {
            return Ok(Self::None);
        };
        Ok(match cfg.kind {
            IndicatorKind::Pendulum => Self::Pendulum(Pendulum::new(cfg.length, cfg.cadence)?),
            IndicatorKind::Traveling => Self::Traveling(Traveling::new(cfg.length, cfg.cadence)?),
        })
    }

    /// Advance the indicator. Only a traveling indicator reports progress.
    pub fn update(&mut self, frame: u64) -> Option<Travel> {
        match self {
            Self::None => None,
            Self::Pendulum(p) => {
                p.update(frame);
                None
            }
            Self::Traveling(t) => Some(t.update(frame)),
        }
    }

    /// Completed laps of a traveling indicator, zero otherwise.
    #[must_use]
    pub const fn laps(&self) -> u32 {
        match self {
            Self::Traveling(t) => t.laps(),
            Self::None | Self::Pendulum(_) => 0,
        }
    }

    /// Freeze and show the completion message.
    pub fn mark_done(&mut self, message: &str) {
        match self {
            Self::None => {}
            Self::Pendulum(p) => p.mark_done(message),
            Self::Traveling(t) => t.mark_done(message),
        }
    }

    /// Whether there is no indicator.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// What to paint. Empty for [`IndicatorSlot::None`].
    #[must_use]
    pub fn cells(&self) -> Vec<Cell> {
        match self {
            Self::None => Vec::new(),
            Self::Pendulum(p) => p.cells(),
            Self::Traveling(t) => t.cells(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
