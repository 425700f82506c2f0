//! Reset-on-retrigger deadline timer.
//!
//! [`Debouncer`] holds at most one deadline.  Every [`trigger`] pushes it to
//! `now + wait`, so a burst of triggers collapses into a single firing `wait`
//! after the last one.  The owner polls it (or sleeps until
//! [`deadline`](Debouncer::deadline)) and calls [`fire_if_due`].
//!
//! Times are `tokio::time::Instant`, which follow tokio's paused clock in
//! tests.
//!
//! [`trigger`]: Debouncer::trigger
//! [`fire_if_due`]: Debouncer::fire_if_due

use std::time::Duration;

use tokio::time::Instant;

/// Default quiet window before a resolution cycle runs.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct Debouncer {
    wait: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            deadline: None,
        }
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// Restart the quiet window from now.
    pub fn trigger(&mut self) {
        self.trigger_at(Instant::now());
    }

    /// Restart the quiet window from `now`.
    pub fn trigger_at(&mut self, now: Instant) {
        self.deadline = Some(now + self.wait);
    }

    /// When the pending invocation is due, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Drop the pending invocation.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Consume the pending invocation if its deadline has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
