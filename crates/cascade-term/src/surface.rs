// SPDX-License-Identifier: MIT
//
// Surface: where a tick's changes end up.
//
// The animation loop doesn't know about terminals. It hands each tick's
// change list to a `Surface`, asks it (without blocking) whether the user
// wants to stop, and once at the end blocks on it for an acknowledgement.
//
//   TerminalSurface: the real thing: raw mode, alternate screen, one
//   synchronized write per tick, stdin reader + SIGINT for input.
//
//   HeadlessSurface: an in-memory screen that applies changes to its own
//   grid and replays scripted input. Tests assert on its grid to see
//   exactly what a terminal would show.

use std::collections::VecDeque;
use std::io;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::buffer::Grid;
use crate::diff::Change;
use crate::output::{CellWriter, OutputBuffer};
use crate::reader::{Input, StdinReader};
use crate::signal;
use crate::terminal::{Size, Terminal};

// ─── Surface Trait ───────────────────────────────────────────────────────────

/// Output sink and input source for the animation loop.
pub trait Surface {
    /// Prepare for painting (enter raw mode, start input, ...).
    ///
    /// # Errors
    ///
    /// Returns an error if the surface can't be initialized.
    fn begin(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Paint one tick's changes. Called every tick, even with an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if output fails.
    fn paint(&mut self, changes: &[Change]) -> io::Result<()>;

    /// Input that arrived since the last poll, without blocking.
    fn poll_input(&mut self) -> Option<Input>;

    /// Block up to `timeout` for input. `Ok(None)` means nothing arrived.
    ///
    /// # Errors
    ///
    /// Returns an error if the input source fails.
    fn wait_input(&mut self, timeout: Duration) -> io::Result<Option<Input>>;

    /// Release everything acquired in [`begin`](Self::begin).
    ///
    /// # Errors
    ///
    /// Returns an error if restoring the surface fails.
    fn end(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ─── TerminalSurface ─────────────────────────────────────────────────────────

/// A [`Surface`] backed by the controlling terminal.
pub struct TerminalSurface {
    terminal: Terminal,
    output: OutputBuffer,
    writer: CellWriter,
    input: Option<(StdinReader, Receiver<Input>)>,
}

impl TerminalSurface {
    /// Create the surface. The terminal is untouched until `begin`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            terminal: Terminal::new(),
            output: OutputBuffer::new(),
            writer: CellWriter::new(),
            input: None,
        }
    }

    /// Terminal size captured at construction.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for TerminalSurface {
    fn begin(&mut self) -> io::Result<()> {
        self.terminal.enter()?;
        signal::install_sigint_handler();
        if self.input.is_none() {
            self.input = Some(StdinReader::spawn()?);
        }
        Ok(())
    }

    fn paint(&mut self, changes: &[Change]) -> io::Result<()> {
        self.writer.write_frame(&mut self.output, changes);
        self.output.flush_to(&mut io::stdout().lock())
    }

    fn poll_input(&mut self) -> Option<Input> {
        if signal::take_sigint() {
            return Some(Input::Interrupt);
        }
        self.input.as_ref().and_then(|(_, rx)| rx.try_recv().ok())
    }

    fn wait_input(&mut self, timeout: Duration) -> io::Result<Option<Input>> {
        if signal::take_sigint() {
            return Ok(Some(Input::Interrupt));
        }
        let Some((_, rx)) = self.input.as_ref() else {
            return Ok(None);
        };
        match rx.recv_timeout(timeout) {
            Ok(input) => Ok(Some(input)),
            Err(RecvTimeoutError::Timeout) => Ok(signal::take_sigint().then_some(Input::Interrupt)),
            // stdin hit EOF: nobody can press a key, treat it as acknowledged.
            Err(RecvTimeoutError::Disconnected) => Ok(Some(Input::Key)),
        }
    }

    fn end(&mut self) -> io::Result<()> {
        if let Some((mut reader, _)) = self.input.take() {
            reader.stop();
        }
        self.terminal.leave()
    }
}

// ─── HeadlessSurface ─────────────────────────────────────────────────────────

/// An in-memory [`Surface`] for tests and dry runs.
///
/// Changes are applied to an internal [`Grid`], so `screen()` is what a
/// terminal would be showing. Input is scripted: each entry becomes visible
/// to `poll_input` once `paint` has been called a given number of times.
/// `wait_input` with an empty script acknowledges immediately.
#[derive(Debug)]
pub struct HeadlessSurface {
    screen: Grid,
    frames: Vec<Vec<Change>>,
    script: VecDeque<(usize, Input)>,
    acks_waited: usize,
    begun: bool,
    ended: bool,
}

impl HeadlessSurface {
    /// Create a blank screen of the given size.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            screen: Grid::new(width, height),
            frames: Vec::new(),
            script: VecDeque::new(),
            acks_waited: 0,
            begun: false,
            ended: false,
        }
    }

    /// Queue `input` to become visible after `paints` calls to `paint`.
    #[must_use]
    pub fn with_input_after(mut self, paints: usize, input: Input) -> Self {
        self.script.push_back((paints, input));
        self
    }

    /// What the screen shows now.
    #[must_use]
    pub const fn screen(&self) -> &Grid {
        &self.screen
    }

    /// Every change list painted so far, one per tick.
    #[must_use]
    pub fn frames(&self) -> &[Vec<Change>] {
        &self.frames
    }

    /// How many times `wait_input` was called.
    #[must_use]
    pub const fn acks_waited(&self) -> usize {
        self.acks_waited
    }

    /// Whether `begin` and `end` were both called.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.begun && self.ended
    }
}

impl Surface for HeadlessSurface {
    fn begin(&mut self) -> io::Result<()> {
        self.begun = true;
        Ok(())
    }

    fn paint(&mut self, changes: &[Change]) -> io::Result<()> {
        for change in changes {
            self.screen
                .try_set(change.x, change.y, change.cell)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        }
        self.frames.push(changes.to_vec());
        Ok(())
    }

    fn poll_input(&mut self) -> Option<Input> {
        match self.script.front() {
            Some(&(after, input)) if after <= self.frames.len() => {
                self.script.pop_front();
                Some(input)
            }
            _ => None,
        }
    }

    fn wait_input(&mut self, _timeout: Duration) -> io::Result<Option<Input>> {
        self.acks_waited += 1;
        Ok(Some(
            self.script.pop_front().map_or(Input::Key, |(_, input)| input),
        ))
    }

    fn end(&mut self) -> io::Result<()> {
        self.ended = true;
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use pretty_assertions::assert_eq;

    #[test]
    fn headless_applies_changes() {
        let mut surface = HeadlessSurface::new(4, 2);
        surface
            .paint(&[
                Change {
                    x: 0,
                    y: 1,
                    cell: Cell::new('O'),
                },
                Change {
                    x: 1,
                    y: 1,
                    cell: Cell::new('k'),
                },
            ])
            .unwrap();
        assert_eq!(surface.screen().text_lines(), vec![String::new(), "Ok".to_owned()]);
        assert_eq!(surface.frames().len(), 1);
    }

    #[test]
    fn headless_rejects_out_of_bounds_change() {
        let mut surface = HeadlessSurface::new(2, 2);
        let err = surface
            .paint(&[Change {
                x: 2,
                y: 0,
                cell: Cell::new('x'),
            }])
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn scripted_input_waits_for_paints() {
        let mut surface = HeadlessSurface::new(1, 1).with_input_after(2, Input::Interrupt);
        assert_eq!(surface.poll_input(), None);
        surface.paint(&[]).unwrap();
        assert_eq!(surface.poll_input(), None);
        surface.paint(&[]).unwrap();
        assert_eq!(surface.poll_input(), Some(Input::Interrupt));
        assert_eq!(surface.poll_input(), None);
    }

    #[test]
    fn wait_input_acknowledges_by_default() {
        let mut surface = HeadlessSurface::new(1, 1);
        assert_eq!(
            surface.wait_input(Duration::ZERO).unwrap(),
            Some(Input::Key)
        );
        assert_eq!(surface.acks_waited(), 1);
    }

    #[test]
    fn begin_end_tracked() {
        let mut surface = HeadlessSurface::new(1, 1);
        assert!(!surface.is_closed());
        surface.begin().unwrap();
        surface.end().unwrap();
        assert!(surface.is_closed());
    }
}
