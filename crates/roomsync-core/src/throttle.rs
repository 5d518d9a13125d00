// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Last-value-wins throttle with an injected clock.

use std::time::{Duration, Instant};

/// Emits at most one value per `interval`; values offered in between coalesce
/// to the most recent one, which [`Throttle::poll`] releases once the
/// interval has elapsed.
#[derive(Debug, Clone)]
pub struct Throttle<T> {
    interval: Duration,
    last_emit: Option<Instant>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    /// Creates an idle throttle.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
            pending: None,
        }
    }

    fn ready(&self, now: Instant) -> bool {
        self.last_emit
            .is_none_or(|t| now.saturating_duration_since(t) >= self.interval)
    }

    /// Offers a value; returns it immediately if the interval allows,
    /// otherwise parks it as the pending value.
    pub fn offer(&mut self, value: T, now: Instant) -> Option<T> {
        if self.ready(now) {
            self.last_emit = Some(now);
            self.pending = None;
            Some(value)
        } else {
            self.pending = Some(value);
            None
        }
    }

    /// Releases the pending value once its slot has come.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.is_some() && self.ready(now) {
            self.last_emit = Some(now);
            self.pending.take()
        } else {
            None
        }
    }

    /// Drops the pending value and returns `last` for immediate emission.
    ///
    /// Used when a gesture completes: the final pose always goes out.
    pub fn flush(&mut self, last: T) -> T {
        self.reset();
        last
    }

    /// Forgets all timing and pending state.
    pub fn reset(&mut self) {
        self.last_emit = None;
        self.pending = None;
    }

    /// When the pending value becomes releasable.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref()?;
        Some(self.last_emit.map_or_else(Instant::now, |t| t + self.interval))
    }

    /// Returns `true` while a value is parked.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn first_value_passes_and_burst_coalesces() {
        let t0 = Instant::now();
        let mut th = Throttle::new(200 * MS);
        assert_eq!(th.offer(1, t0), Some(1));
        assert_eq!(th.offer(2, t0 + 50 * MS), None);
        assert_eq!(th.offer(3, t0 + 120 * MS), None);
        assert_eq!(th.poll(t0 + 150 * MS), None);
        assert_eq!(th.next_deadline(), Some(t0 + 200 * MS));
        assert_eq!(th.poll(t0 + 200 * MS), Some(3));
        assert_eq!(th.poll(t0 + 500 * MS), None);
    }

    #[test]
    fn spacing_restarts_from_each_emission() {
        let t0 = Instant::now();
        let mut th = Throttle::new(200 * MS);
        th.offer('a', t0);
        th.offer('b', t0 + 10 * MS);
        assert_eq!(th.poll(t0 + 210 * MS), Some('b'));
        assert_eq!(th.offer('c', t0 + 300 * MS), None);
        assert_eq!(th.offer('d', t0 + 410 * MS), Some('d'));
        assert!(!th.has_pending());
    }

    #[test]
    fn flush_drops_pending_and_rearms() {
        let t0 = Instant::now();
        let mut th = Throttle::new(200 * MS);
        th.offer(1, t0);
        th.offer(2, t0 + 10 * MS);
        assert_eq!(th.flush(9), 9);
        assert!(!th.has_pending());
        assert_eq!(th.offer(10, t0 + 20 * MS), Some(10));
    }
}
