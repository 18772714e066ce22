//! Typewriter-style text reveal.
//!
//! A streamer sits inert until its start frame, then reveals one character
//! per cadence frame until the whole text shows.

use crate::clock::on_cadence;
use crate::error::{ConfigError, nonzero_cadence};

/// Reveals `text` one character at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextStreamer {
    text: Vec<char>,
    start_frame: u64,
    cadence: u32,
    revealed: usize,
    complete: bool,
}

impl TextStreamer {
    /// A streamer for `text` that starts at `start_frame` and reveals a
    /// character every `cadence` frames.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ZeroCadence`] if `cadence` is zero.
    pub fn new(text: &str, start_frame: u64, cadence: u32) -> Result<Self, ConfigError> {
        Ok(Self {
            text: text.chars().collect(),
            start_frame,
            cadence: nonzero_cadence(cadence, "reveal_cadence")?,
            revealed: 0,
            complete: false,
        })
    }

    /// Reveal the next character if `frame` is eligible.
    pub fn generate(&mut self, frame: u64) {
        if self.complete || frame < self.start_frame || !on_cadence(frame, self.cadence) {
            return;
        }
        if self.revealed < self.text.len() {
            self.revealed += 1;
        }
        self.complete = self.revealed == self.text.len();
    }

    /// The characters shown so far.
    #[must_use]
    pub fn revealed(&self) -> &[char] {
        &self.text[..self.revealed]
    }

    /// Number of characters shown so far.
    #[must_use]
    pub const fn revealed_len(&self) -> usize {
        self.revealed
    }

    /// Length of the full text in characters.
    #[must_use]
    pub fn text_len(&self) -> usize {
        self.text.len()
    }

    /// Whether the whole text is showing.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// First frame the streamer may reveal on.
    #[must_use]
    pub const fn start_frame(&self) -> u64 {
        self.start_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn shown(s: &TextStreamer) -> String {
        s.revealed().iter().collect()
    }

    #[test]
    fn inert_before_start_frame() {
        let mut s = TextStreamer::new("Hi", 4, 1).unwrap();
        for frame in 0..4 {
            s.generate(frame);
        }
        assert_eq!(s.revealed_len(), 0);
        s.generate(4);
        assert_eq!(shown(&s), "H");
    }

    #[test]
    fn reveals_on_cadence_and_completes() {
        let mut s = TextStreamer::new("Ok", 0, 2).unwrap();
        s.generate(0);
        s.generate(1);
        assert_eq!(shown(&s), "O");
        assert!(!s.is_complete());
        s.generate(2);
        assert_eq!(shown(&s), "Ok");
        assert!(s.is_complete());
        s.generate(4);
        assert_eq!(shown(&s), "Ok");
    }

    #[test]
    fn empty_text_completes_on_first_eligible_tick() {
        let mut s = TextStreamer::new("", 3, 2).unwrap();
        s.generate(3);
        assert!(!s.is_complete());
        s.generate(4);
        assert!(s.is_complete());
    }

    #[test]
    fn counts_chars_not_bytes() {
        let mut s = TextStreamer::new("•é", 0, 1).unwrap();
        s.generate(0);
        s.generate(1);
        assert!(s.is_complete());
        assert_eq!(s.text_len(), 2);
    }

    #[test]
    fn zero_cadence_rejected() {
        assert_eq!(
            TextStreamer::new("x", 0, 0).unwrap_err(),
            ConfigError::ZeroCadence {
                what: "reveal_cadence"
            }
        );
    }

    proptest! {
        #[test]
        fn reveal_is_monotonic(text in "[a-z ]{0,12}", start in 0u64..10, cadence in 1u32..4, frames in 0u64..80) {
            let mut s = TextStreamer::new(&text, start, cadence).unwrap();
            let mut prev = 0;
            let mut eligible_seen = false;
            for frame in 0..frames {
                let was_complete = s.is_complete();
                s.generate(frame);
                eligible_seen |= frame >= start && on_cadence(frame, cadence);
                let now = s.revealed_len();
                prop_assert!(now >= prev && now - prev <= 1);
                if was_complete {
                    prop_assert!(s.is_complete());
                }
                prop_assert_eq!(
                    s.is_complete(),
                    now == s.text_len() && (now > 0 || eligible_seen)
                );
                prev = now;
            }
        }
    }
}
