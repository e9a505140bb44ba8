//! Cancellable, restartable delayed invocation.
//!
//! [`Debouncer`] holds at most one pending payload. Scheduling a new payload
//! replaces the old one and restarts the delay; the payload is handed back by
//! [`Debouncer::take_due`] once no newer schedule arrived for `delay`.
//!
//! Time is passed in explicitly, so any host loop (terminal, GUI, test) can
//! drive it and tests stay deterministic.

use std::time::{Duration, Instant};

use tracing::trace;

/// Delay used for template edits unless configured otherwise.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

#[derive(Debug)]
struct Pending<T> {
    payload: T,
    deadline: Instant,
}

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `payload` to fire at `now + delay`, superseding any pending
    /// payload. Returns the superseded payload, if there was one.
    pub fn schedule(&mut self, payload: T, now: Instant) -> Option<T> {
        let superseded = self.pending.replace(Pending {
            payload,
            deadline: now + self.delay,
        });
        if superseded.is_some() {
            trace!(delay_ms = self.delay.as_millis() as u64, "debounce restarted");
        }
        superseded.map(|p| p.payload)
    }

    /// Drop the pending payload without firing it.
    pub fn cancel(&mut self) -> Option<T> {
        let cancelled = self.pending.take().map(|p| p.payload);
        if cancelled.is_some() {
            trace!("debounce cancelled");
        }
        cancelled
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending payload becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Take the pending payload if its deadline has been reached.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        let due = self.pending.as_ref().is_some_and(|p| now >= p.deadline);
        if !due {
            return None;
        }
        trace!("debounce fired");
        self.pending.take().map(|p| p.payload)
    }

    /// Take the pending payload regardless of its deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.payload)
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn fires_after_delay() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(250 * MS);
        d.schedule("a", t0);
        assert_eq!(d.take_due(t0 + 249 * MS), None);
        assert_eq!(d.take_due(t0 + 250 * MS), Some("a"));
        assert!(!d.is_pending());
        assert_eq!(d.take_due(t0 + 999 * MS), None);
    }

    #[test]
    fn rapid_schedules_collapse_to_last() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(250 * MS);
        assert_eq!(d.schedule("t1", t0), None);
        assert_eq!(d.schedule("t2", t0 + 100 * MS), Some("t1"));
        assert_eq!(d.schedule("t3", t0 + 200 * MS), Some("t2"));
        // Deadline restarted from the last schedule
        assert_eq!(d.take_due(t0 + 300 * MS), None);
        assert_eq!(d.take_due(t0 + 450 * MS), Some("t3"));
        assert_eq!(d.take_due(t0 + 900 * MS), None);
    }

    #[test]
    fn cancel_prevents_firing() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(10 * MS);
        d.schedule(1, t0);
        assert_eq!(d.cancel(), Some(1));
        assert_eq!(d.take_due(t0 + 100 * MS), None);
        assert_eq!(d.cancel(), None);
    }

    #[test]
    fn flush_ignores_deadline() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(10 * MS);
        d.schedule(7, t0);
        assert_eq!(d.deadline(), Some(t0 + 10 * MS));
        assert_eq!(d.flush(), Some(7));
        assert_eq!(d.deadline(), None);
    }

    #[test]
    fn default_delay() {
        let d: Debouncer<()> = Debouncer::default();
        assert_eq!(d.delay(), Duration::from_millis(250));
    }
}
