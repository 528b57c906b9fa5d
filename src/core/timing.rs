//! Timing capture for review sessions.
//!
//! All duration math uses `std::time::Instant` so system clock
//! adjustments can never produce negative spans. Wall-clock metadata for
//! display lives on the session, not here.

use std::time::Instant;

/// Monotonic timestamps for one review session.
///
/// Captures the session start and the first content reveal, and derives
/// the three durations reported with a submission. `mark_first_reveal` is
/// idempotent: only the first call within a session has effect.
#[derive(Debug, Clone, Copy)]
pub struct TimingTracker {
    started_at: Instant,
    first_reveal_at: Option<Instant>,
}

/// Derived durations for a rated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingSummary {
    /// Session start to first reveal. 0 when nothing was ever revealed.
    pub time_to_reveal_ms: u64,
    /// First reveal to final rating, or session start to final rating when
    /// nothing was revealed (the bare rating flow).
    pub time_to_rate_ms: u64,
    /// Session start to final rating.
    pub total_time_ms: u64,
}

impl TimingTracker {
    /// Start tracking now.
    pub fn start() -> Self {
        Self::start_at(Instant::now())
    }

    /// Start tracking from an explicit instant.
    pub fn start_at(started_at: Instant) -> Self {
        Self {
            started_at,
            first_reveal_at: None,
        }
    }

    /// Record the first reveal now. Later calls are ignored.
    pub fn mark_first_reveal(&mut self) {
        self.mark_first_reveal_at(Instant::now());
    }

    /// Record the first reveal at an explicit instant. Later calls are ignored.
    pub fn mark_first_reveal_at(&mut self, at: Instant) {
        self.first_reveal_at.get_or_insert(at);
    }

    /// When the session started.
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Whether any reveal has been recorded.
    pub fn revealed(&self) -> bool {
        self.first_reveal_at.is_some()
    }

    /// Derive the reported durations for a rating issued at `rate_at`.
    pub fn summarize(&self, rate_at: Instant) -> TimingSummary {
        let total_time_ms = ms_between(self.started_at, rate_at);
        match self.first_reveal_at {
            Some(reveal_at) => TimingSummary {
                time_to_reveal_ms: ms_between(self.started_at, reveal_at),
                time_to_rate_ms: ms_between(reveal_at, rate_at),
                total_time_ms,
            },
            None => TimingSummary {
                time_to_reveal_ms: 0,
                time_to_rate_ms: total_time_ms,
                total_time_ms,
            },
        }
    }
}

/// Milliseconds from `earlier` to `later`, saturating to 0 if reversed.
fn ms_between(earlier: Instant, later: Instant) -> u64 {
    later.saturating_duration_since(earlier).as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_reveal_and_rate_durations() {
        let t0 = Instant::now();
        let mut tracker = TimingTracker::start_at(t0);
        tracker.mark_first_reveal_at(t0 + Duration::from_millis(2000));

        let summary = tracker.summarize(t0 + Duration::from_millis(5000));
        assert_eq!(summary.time_to_reveal_ms, 2000);
        assert_eq!(summary.time_to_rate_ms, 3000);
        assert_eq!(summary.total_time_ms, 5000);
    }

    #[test]
    fn test_first_reveal_is_idempotent() {
        let t0 = Instant::now();
        let mut tracker = TimingTracker::start_at(t0);
        tracker.mark_first_reveal_at(t0 + Duration::from_millis(1000));
        tracker.mark_first_reveal_at(t0 + Duration::from_millis(4000));

        let summary = tracker.summarize(t0 + Duration::from_millis(5000));
        assert_eq!(summary.time_to_reveal_ms, 1000);
        assert_eq!(summary.time_to_rate_ms, 4000);
    }

    #[test]
    fn test_never_revealed_rates_against_start() {
        // The bare [rate] flow has no reveal action at all; the reported
        // reveal time stays 0 and rating time spans the whole session.
        let t0 = Instant::now();
        let tracker = TimingTracker::start_at(t0);
        assert!(!tracker.revealed());

        let summary = tracker.summarize(t0 + Duration::from_millis(2500));
        assert_eq!(summary.time_to_reveal_ms, 0);
        assert_eq!(summary.time_to_rate_ms, 2500);
        assert_eq!(summary.total_time_ms, 2500);
    }

    #[test]
    fn test_reversed_instants_saturate_to_zero() {
        let t0 = Instant::now();
        let mut tracker = TimingTracker::start_at(t0 + Duration::from_millis(100));
        tracker.mark_first_reveal_at(t0);

        let summary = tracker.summarize(t0);
        assert_eq!(summary.time_to_reveal_ms, 0);
        assert_eq!(summary.time_to_rate_ms, 0);
        assert_eq!(summary.total_time_ms, 0);
    }
}
