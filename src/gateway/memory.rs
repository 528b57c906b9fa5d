//! In-memory gateway for tests and practice mode.
//!
//! Records every submission it receives and returns a canned outcome.
//! Failures can be scripted to exercise the retry path.

use std::sync::RwLock;

use chrono::{Duration, Utc};

use crate::core::{MasteryState, ReviewSubmission};
use crate::error::{RehearseError, Result};
use crate::gateway::{ReviewGateway, ReviewOutcome};

/// Thread-safe recording gateway.
///
/// Submissions are kept in memory and lost when the gateway is dropped.
/// The outcome returned for every accepted submission is fixed at
/// construction (practice mode has no scheduler to ask).
#[derive(Debug)]
pub struct InMemoryGateway {
    submissions: RwLock<Vec<(String, ReviewSubmission)>>,
    fail_next: RwLock<u32>,
    outcome: ReviewOutcome,
}

impl InMemoryGateway {
    /// Create a gateway returning a neutral practice outcome.
    pub fn new() -> Self {
        Self::with_outcome(ReviewOutcome {
            success: true,
            new_interval_days: 1.0,
            new_ease_factor: 2.5,
            new_mastery_state: MasteryState::Learning,
            next_review_at: Utc::now() + Duration::days(1),
        })
    }

    /// Create a gateway returning the given outcome for every submission.
    pub fn with_outcome(outcome: ReviewOutcome) -> Self {
        Self {
            submissions: RwLock::new(Vec::new()),
            fail_next: RwLock::new(0),
            outcome,
        }
    }

    /// Make the next `count` submissions fail with a gateway error.
    pub fn fail_next(&self, count: u32) {
        *self.fail_next.write().unwrap() = count;
    }

    /// All recorded submissions, in arrival order.
    pub fn submissions(&self) -> Vec<(String, ReviewSubmission)> {
        self.submissions.read().unwrap().clone()
    }

    /// Number of recorded submissions.
    pub fn len(&self) -> usize {
        self.submissions.read().unwrap().len()
    }

    /// Whether no submissions have been recorded.
    pub fn is_empty(&self) -> bool {
        self.submissions.read().unwrap().is_empty()
    }

    /// Drop all recorded submissions.
    pub fn clear(&self) {
        self.submissions.write().unwrap().clear();
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewGateway for InMemoryGateway {
    fn submit_review(
        &self,
        item_id: &str,
        submission: &ReviewSubmission,
    ) -> Result<ReviewOutcome> {
        {
            let mut fail_next = self.fail_next.write().unwrap();
            if *fail_next > 0 {
                *fail_next -= 1;
                return Err(RehearseError::gateway("scripted failure"));
            }
        }
        self.submissions
            .write()
            .unwrap()
            .push((item_id.to_string(), submission.clone()));
        Ok(self.outcome.clone())
    }

    fn ping(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_submission() -> ReviewSubmission {
        ReviewSubmission {
            quality: 3,
            time_spent_ms: 1000,
            time_to_reveal_ms: 400,
            time_to_rate_ms: 600,
            answer_text: None,
            confidence_before: None,
            confidence_after: 3,
            hint_requested: false,
            gave_up: false,
        }
    }

    #[test]
    fn test_records_submissions_in_order() {
        let gateway = InMemoryGateway::new();
        assert!(gateway.is_empty());

        gateway.submit_review("a", &sample_submission()).unwrap();
        gateway.submit_review("b", &sample_submission()).unwrap();

        let recorded = gateway.submissions();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].0, "a");
        assert_eq!(recorded[1].0, "b");
    }

    #[test]
    fn test_scripted_failures_then_success() {
        let gateway = InMemoryGateway::new();
        gateway.fail_next(2);

        let first = gateway.submit_review("a", &sample_submission()).unwrap_err();
        assert!(first.is_retryable());
        let second = gateway.submit_review("a", &sample_submission()).unwrap_err();
        assert!(second.is_retryable());

        // Failed attempts record nothing.
        assert!(gateway.is_empty());

        gateway.submit_review("a", &sample_submission()).unwrap();
        assert_eq!(gateway.len(), 1);
    }

    #[test]
    fn test_canned_outcome() {
        let outcome = ReviewOutcome {
            success: true,
            new_interval_days: 14.0,
            new_ease_factor: 2.7,
            new_mastery_state: MasteryState::Mastered,
            next_review_at: Utc::now() + Duration::days(14),
        };
        let gateway = InMemoryGateway::with_outcome(outcome.clone());
        let returned = gateway.submit_review("a", &sample_submission()).unwrap();
        assert_eq!(returned, outcome);
    }

    #[test]
    fn test_clear() {
        let gateway = InMemoryGateway::new();
        gateway.submit_review("a", &sample_submission()).unwrap();
        gateway.clear();
        assert!(gateway.is_empty());
    }

    #[test]
    fn test_ping_and_name() {
        let gateway = InMemoryGateway::new();
        assert!(gateway.ping());
        assert_eq!(gateway.name(), "memory");
    }
}
