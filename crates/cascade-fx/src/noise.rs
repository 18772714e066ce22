//! Gradient noise: a strip of random characters under a scrolling gradient.
//!
//! Two independent clocks drive the strip. On every char-cadence frame each
//! slot rolls for a new random symbol; on every color-cadence frame the
//! gradient scrolls one palette step to the right. `mark_done` freezes both.
//!
//! The random source is owned and seeded by the caller, so a strip built
//! from the same seed produces the same frames.

use rand::Rng;
use rand::rngs::StdRng;

use cascade_term::cell::Cell;
use cascade_term::color::CellColor;

use crate::clock::on_cadence;
use crate::config::NoiseConfig;
use crate::error::{ConfigError, nonzero_cadence};
use crate::palette::GradientPalette;

/// Symbols a slot can roll.
const ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890!@#$%^&*()_+-=<>,.:\";'{}[]?/";

/// Chance that an already-filled slot rolls a new symbol on a char tick.
const REROLL_PROBABILITY: f64 = 0.6;

/// What every slot holds before its first char tick.
const BLANK: char = ' ';

fn random_symbol(rng: &mut StdRng) -> char {
    char::from(ALPHABET[rng.random_range(0..ALPHABET.len())])
}

// ---------------------------------------------------------------------------
// GradientNoise
// ---------------------------------------------------------------------------

/// A fixed-length strip of gradient-colored noise.
#[derive(Debug, Clone)]
pub struct GradientNoise {
    chars: Vec<char>,
    colors: Vec<u8>,
    palette: GradientPalette,
    gradient_length: u16,
    char_cadence: u32,
    color_cadence: u32,
    shift: u64,
    done: bool,
    rng: StdRng,
}

impl GradientNoise {
    /// Build a blank strip colored with the unshifted gradient.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a zero cadence, a zero gradient length or
    /// an empty palette.
    pub fn new(config: &NoiseConfig, rng: StdRng) -> Result<Self, ConfigError> {
        let char_cadence = nonzero_cadence(config.char_cadence, "char_cadence")?;
        let color_cadence = nonzero_cadence(config.color_cadence, "color_cadence")?;
        let palette = GradientPalette::new(&config.palette, config.gradient_length)?;

        let len = usize::from(config.length);
        let mut noise = Self {
            chars: vec![BLANK; len],
            colors: vec![0; len],
            palette,
            gradient_length: config.gradient_length,
            char_cadence,
            color_cadence,
            shift: 0,
            done: false,
            rng,
        };
        noise.recolor();
        Ok(noise)
    }

    /// Advance the strip to `frame`. No-op once done.
    pub fn generate(&mut self, frame: u64) {
        if self.done {
            return;
        }

        if on_cadence(frame, self.char_cadence) {
            for slot in &mut self.chars {
                if *slot == BLANK || self.rng.random_bool(REROLL_PROBABILITY) {
                    *slot = random_symbol(&mut self.rng);
                }
            }
        }

        if on_cadence(frame, self.color_cadence) {
            self.shift += 1;
            self.recolor();
        }
    }

    fn recolor(&mut self) {
        for (slot, color) in self.colors.iter_mut().enumerate() {
            *color = self.palette.shifted(slot, self.shift);
        }
    }

    /// Freeze the strip. Later `generate` calls change nothing.
    pub const fn mark_done(&mut self) {
        self.done = true;
    }

    /// Whether the strip is frozen.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    /// Swap in a new base palette, expanded by this strip's gradient length.
    /// The current colors stay until the next color tick.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyPalette`] if `base` is empty. The old
    /// palette is kept.
    pub fn set_palette(&mut self, base: &[u8]) -> Result<(), ConfigError> {
        self.palette = GradientPalette::new(base, self.gradient_length)?;
        Ok(())
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether the strip has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Current characters.
    #[must_use]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Current 256-color index per slot.
    #[must_use]
    pub fn colors(&self) -> &[u8] {
        &self.colors
    }

    /// How many color ticks have scrolled the gradient.
    #[must_use]
    pub const fn shift(&self) -> u64 {
        self.shift
    }

    /// The strip as paintable cells.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.chars
            .iter()
            .zip(&self.colors)
            .map(|(&ch, &color)| Cell::colored(ch, CellColor::Ansi256(color)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
