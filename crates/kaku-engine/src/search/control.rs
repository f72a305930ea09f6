//! Search control: the interrupt flag and the hard time limit.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// The clock is only read once per this many nodes.
const POLL_INTERVAL: u64 = 1024;

/// Cloneable handle that interrupts a running search from another thread.
///
/// Interruption is cooperative: the worker notices the flag at its next
/// node and unwinds, returning the best result completed so far.
#[derive(Debug, Clone)]
pub struct StopHandle {
    interrupted: Arc<AtomicBool>,
}

impl StopHandle {
    /// Ask the search to stop.
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::Release);
    }

    /// Return `true` once the search has been asked to stop.
    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::Acquire)
    }
}

/// Decides when a search must abort.
///
/// Owned by the searcher; other threads only see it through a
/// [`StopHandle`].
#[derive(Debug)]
pub struct SearchControl {
    interrupted: Arc<AtomicBool>,
    start: Instant,
    hard_limit: Option<Duration>,
}

impl SearchControl {
    /// Create control with no time limit.
    pub fn new() -> Self {
        Self {
            interrupted: Arc::new(AtomicBool::new(false)),
            start: Instant::now(),
            hard_limit: None,
        }
    }

    /// Restart the clock and clear the interrupt flag for a new search.
    pub fn reset(&mut self, hard_limit: Option<Duration>) {
        self.interrupted.store(false, Ordering::Release);
        self.start = Instant::now();
        self.hard_limit = hard_limit;
    }

    /// Handle sharing this control's interrupt flag.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            interrupted: Arc::clone(&self.interrupted),
        }
    }

    /// Raise the interrupt flag.
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::Release);
    }

    /// Return `true` if the search must unwind.
    #[inline]
    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::Acquire)
    }

    /// Check the flag, reading the clock every [`POLL_INTERVAL`] nodes.
    ///
    /// Exceeding the hard limit raises the flag, so later calls return
    /// without touching the clock.
    pub fn poll(&self, nodes: u64) -> bool {
        if self.is_interrupted() {
            return true;
        }
        if nodes % POLL_INTERVAL != 0 {
            return false;
        }
        if let Some(limit) = self.hard_limit
            && self.elapsed() >= limit
        {
            self.interrupt();
            return true;
        }
        false
    }

    /// Time since the last [`reset`](Self::reset).
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for SearchControl {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_handle_interrupts() {
        let control = SearchControl::new();
        let handle = control.stop_handle();
        assert!(!control.is_interrupted());
        handle.interrupt();
        assert!(control.is_interrupted());
        assert!(control.poll(1));
    }

    #[test]
    fn reset_clears_the_flag() {
        let mut control = SearchControl::new();
        control.interrupt();
        control.reset(None);
        assert!(!control.is_interrupted());
        assert!(!control.stop_handle().is_interrupted());
    }

    #[test]
    fn hard_limit_checked_on_poll_interval() {
        let mut control = SearchControl::new();
        control.reset(Some(Duration::ZERO));
        assert!(!control.poll(POLL_INTERVAL + 1), "clock is only read on the interval");
        assert!(control.poll(POLL_INTERVAL));
        assert!(control.is_interrupted());
    }

    #[test]
    fn no_limit_never_fires() {
        let control = SearchControl::new();
        assert!(!control.poll(0));
        assert!(!control.poll(POLL_INTERVAL * 5));
    }
}
