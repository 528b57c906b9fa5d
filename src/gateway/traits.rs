//! Result submission gateway trait.
//!
//! The remote scheduler owns interval computation and persistence; this
//! subsystem only hands it a composed submission and receives the
//! persisted outcome. Implementations are transport-specific collaborators
//! behind this trait.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{MasteryState, ReviewSubmission};
use crate::error::Result;

/// Trait for gateways that persist review outcomes.
///
/// A failed `submit_review` must be reported as a gateway error so the
/// caller can retry with the same composed payload; the submission data is
/// idempotent and safe to resend.
pub trait ReviewGateway: Send + Sync {
    /// Submit one composed review for the given item.
    fn submit_review(&self, item_id: &str, submission: &ReviewSubmission)
        -> Result<ReviewOutcome>;

    /// Health check for the gateway.
    fn ping(&self) -> bool;

    /// Gateway name for logging and stats.
    fn name(&self) -> &'static str;
}

/// Blanket implementation for boxed trait objects.
impl ReviewGateway for Box<dyn ReviewGateway> {
    fn submit_review(
        &self,
        item_id: &str,
        submission: &ReviewSubmission,
    ) -> Result<ReviewOutcome> {
        (**self).submit_review(item_id, submission)
    }

    fn ping(&self) -> bool {
        (**self).ping()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Persisted outcome returned by the remote scheduler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewOutcome {
    /// Whether the scheduler accepted and persisted the review.
    pub success: bool,
    /// Days until the next scheduled review.
    pub new_interval_days: f64,
    /// Updated ease factor for the item.
    pub new_ease_factor: f64,
    /// Updated mastery label for the item.
    pub new_mastery_state: MasteryState,
    /// When the item next comes due.
    pub next_review_at: DateTime<Utc>,
}
