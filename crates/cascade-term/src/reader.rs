// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Background stdin reader: turns raw bytes into animation input.
//
// The animation only cares about two things from the keyboard: "stop now"
// (Ctrl-C, which raw mode delivers as byte 0x03) and "any key" (the final
// acknowledgement). A dedicated thread blocks on stdin and forwards one
// `Input` per chunk through a channel, so the tick loop can poll it with
// `try_recv` and never stall on a read.
//
// Shutdown: the thread polls stdin's fd with a short timeout and checks an
// `AtomicBool` stop flag between polls, so `stop()` never waits on a read
// that will never complete.

#[cfg(unix)]
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

/// ETX, what Ctrl-C sends when ISIG is off.
const CTRL_C: u8 = 0x03;

const READ_BUF_SIZE: usize = 1024;

/// Milliseconds between stop-flag checks.
const POLL_TIMEOUT_MS: i32 = 50;

// ─── Input ───────────────────────────────────────────────────────────────────

/// What a chunk of keyboard bytes means to the animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Any key other than Ctrl-C.
    Key,
    /// Ctrl-C (or SIGINT): cancel the run.
    Interrupt,
}

impl Input {
    /// Classify a chunk of bytes. An interrupt anywhere in the chunk wins.
    /// Empty chunks mean nothing.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            None
        } else if bytes.contains(&CTRL_C) {
            Some(Self::Interrupt)
        } else {
            Some(Self::Key)
        }
    }
}

// ─── StdinReader ─────────────────────────────────────────────────────────────

/// Background thread forwarding classified stdin input over a channel.
///
/// The thread stops on [`stop`](Self::stop), on drop, on EOF, or when the
/// receiver goes away.
pub struct StdinReader {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl StdinReader {
    /// Spawn the reader thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to spawn a thread.
    pub fn spawn() -> std::io::Result<(Self, Receiver<Input>)> {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || Self::reader_loop(&tx, &stop_flag))?;

        Ok((
            Self {
                handle: Some(handle),
                stop,
            },
            rx,
        ))
    }

    /// Signal the thread to exit and join it. Idempotent.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    #[cfg(unix)]
    fn reader_loop(tx: &Sender<Input>, stop: &AtomicBool) {
        use std::os::unix::io::AsRawFd;

        let stdin_fd = io::stdin().as_raw_fd();
        let mut buf = [0u8; READ_BUF_SIZE];

        while !stop.load(Ordering::Relaxed) {
            let ready = unsafe {
                let mut pfd = libc::pollfd {
                    fd: stdin_fd,
                    events: libc::POLLIN,
                    revents: 0,
                };
                libc::poll(&raw mut pfd, 1, POLL_TIMEOUT_MS)
            };
            if ready <= 0 {
                continue;
            }

            let n = unsafe { libc::read(stdin_fd, buf.as_mut_ptr().cast(), buf.len()) };
            if n <= 0 {
                break;
            }

            #[allow(clippy::cast_sign_loss)] // n > 0 checked above.
            let chunk = &buf[..n as usize];
            if let Some(input) = Input::from_bytes(chunk) {
                if tx.send(input).is_err() {
                    break;
                }
            }
        }
    }

    /// Non-unix fallback: blocking reads, so shutdown waits for a key.
    #[cfg(not(unix))]
    fn reader_loop(tx: &Sender<Input>, stop: &AtomicBool) {
        use std::io::Read;

        let mut buf = [0u8; READ_BUF_SIZE];
        while !stop.load(Ordering::Relaxed) {
            match std::io::stdin().lock().read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if let Some(input) = Input::from_bytes(&buf[..n]) {
                        if tx.send(input).is_err() {
                            break;
                        }
                    }
                }
            }
        }
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        self.stop();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
