// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// SIGINT → atomic flag.
//
// In raw mode Ctrl-C arrives through stdin, but `kill -INT` (or Ctrl-C when
// stdin isn't a terminal) still arrives as a signal. The handler only
// stores to an atomic, one of the few things allowed in a signal handler;
// the loop polls the flag once per tick.

use std::sync::atomic::{AtomicBool, Ordering};

static SIGINT_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Install the SIGINT handler. Safe to call more than once.
#[cfg(unix)]
pub fn install_sigint_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigint_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGINT, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigint_handler(_sig: libc::c_int) {
    SIGINT_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
pub fn install_sigint_handler() {}

/// Whether SIGINT arrived since the last call. Clears the flag.
#[must_use]
pub fn take_sigint() -> bool {
    SIGINT_RECEIVED.swap(false, Ordering::Relaxed)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_clears_flag() {
        SIGINT_RECEIVED.store(true, Ordering::Relaxed);
        assert!(take_sigint());
        assert!(!take_sigint());
    }

    #[test]
    fn install_is_repeatable() {
        install_sigint_handler();
        install_sigint_handler();
    }
}
