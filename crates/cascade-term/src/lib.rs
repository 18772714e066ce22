// SPDX-License-Identifier: MIT
//
// cascade-term: the character grid and the terminal it lands on.
//
// A fixed-size grid of cells, a double-buffered diff renderer that reports
// only the cells a frame actually changed, and a stateful ANSI writer that
// turns those changes into as few bytes as possible. The animation crate
// never talks to the terminal directly; it paints change lists into a
// `Surface`, which is either the real raw-mode terminal or an in-memory
// screen for tests.
//
// No TUI framework underneath: raw termios, ANSI escapes, one write per
// frame.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod color;
pub mod diff;
pub mod output;
pub mod reader;
pub mod signal;
pub mod surface;
pub mod terminal;
