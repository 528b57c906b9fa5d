//! Submission driver.
//!
//! Pairs a review session with a gateway and owns the one asynchronous
//! boundary in the subsystem: dispatching the composed payload. The
//! session's phase marks guard against a second dispatch while one is
//! pending; a gateway failure leaves the session open so the exact same
//! frozen payload can be resent.

use crate::core::{ReviewSession, ReviewSubmission};
use crate::error::{RehearseError, Result};
use crate::gateway::{ReviewGateway, ReviewOutcome};

/// Drives submissions for review sessions through one gateway.
pub struct Submitter<G> {
    gateway: G,
}

impl<G: ReviewGateway> Submitter<G> {
    /// Create a submitter over the given gateway.
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    /// The underlying gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Compose and dispatch the final rating for `session`.
    ///
    /// On gateway failure the session stays un-terminated and the payload
    /// stays frozen; call [`Submitter::retry`] to resend it. All other
    /// errors are contract violations surfaced unchanged.
    pub fn submit(
        &self,
        session: &mut ReviewSession,
        quality: u8,
        confidence_after: u8,
    ) -> Result<ReviewOutcome> {
        let payload = session.compose_submission(quality, confidence_after)?;
        self.dispatch(session, &payload)
    }

    /// Resend a previously composed payload after a gateway failure.
    pub fn retry(&self, session: &mut ReviewSession) -> Result<ReviewOutcome> {
        let payload = session
            .submission()
            .cloned()
            .ok_or(RehearseError::PrematureSubmission {
                current: session.current_step(),
            })?;
        self.dispatch(session, &payload)
    }

    fn dispatch(
        &self,
        session: &mut ReviewSession,
        payload: &ReviewSubmission,
    ) -> Result<ReviewOutcome> {
        session.mark_submission_started()?;
        tracing::debug!(
            item_id = %session.item_id(),
            gateway = self.gateway.name(),
            "dispatching review submission"
        );
        match self.gateway.submit_review(session.item_id(), payload) {
            Ok(outcome) => {
                session.mark_submission_complete();
                Ok(outcome)
            }
            Err(err) => {
                session.mark_submission_failed();
                tracing::warn!(
                    item_id = %session.item_id(),
                    gateway = self.gateway.name(),
                    error = %err,
                    "review submission failed; session left open for retry"
                );
                Err(err)
            }
        }
    }
}
