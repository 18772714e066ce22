//! Gradient palettes.
//!
//! A palette is a cyclic list of 256-color indices. Each base color is
//! repeated `gradient_length` times when the palette is built, which makes
//! the scrolling gradient move through a color in several steps instead of
//! one and slows the visible shift without touching the color cadence.

use crate::error::ConfigError;

/// The default palette: a dark-to-light grayscale ramp that lingers on the
/// darkest shades.
pub const GRAYSCALE: [u8; 39] = [
    232, 232, 232, 232, 233, 233, 233, 233, 234, 234, 234, 234, 235, 235, 235, 235, 236, 236, 236,
    236, 237, 238, 239, 240, 241, 242, 243, 244, 245, 246, 247, 248, 249, 250, 251, 252, 253, 254,
    255,
];

/// Blue through magenta and back, the demo's palette.
pub const SPECTRUM: [u8; 10] = [21, 57, 93, 129, 165, 201, 165, 129, 93, 57];

/// An expanded, cyclic color sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradientPalette {
    colors: Vec<u8>,
}

impl GradientPalette {
    /// Expand `base`, repeating every entry `gradient_length` times.
    ///
    /// # Errors
    ///
    /// [`ConfigError::EmptyPalette`] if `base` is empty,
    /// [`ConfigError::ZeroGradientLength`] if `gradient_length` is zero.
    pub fn new(base: &[u8], gradient_length: u16) -> Result<Self, ConfigError> {
        if gradient_length == 0 {
            return Err(ConfigError::ZeroGradientLength);
        }
        if base.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        let repeat = usize::from(gradient_length);
        let mut colors = Vec::with_capacity(base.len() * repeat);
        for &color in base {
            colors.extend(std::iter::repeat_n(color, repeat));
        }
        Ok(Self { colors })
    }

    /// Number of entries after expansion. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always `false`; construction rejects empty palettes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The expanded colors.
    #[must_use]
    pub fn colors(&self) -> &[u8] {
        &self.colors
    }

    /// Color for `slot` after the gradient has scrolled `shift` steps:
    /// `colors[(slot - shift) mod len]`.
    #[must_use]
    pub fn shifted(&self, slot: usize, shift: u64) -> u8 {
        let len = self.colors.len() as u64;
        let back = shift % len;
        #[allow(clippy::cast_possible_truncation)] // Result is < len.
        let idx = ((slot as u64 % len) + len - back) % len;
        self.colors[idx as usize]
    }
}

impl Default for GradientPalette {
    fn default() -> Self {
        Self {
            colors: GRAYSCALE.to_vec(),
        }
    }
}
