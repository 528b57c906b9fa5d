//! Review session aggregate.
//!
//! `ReviewSession` is the single-owner state machine driving one review of
//! one item: it holds the step plan, the executor for the current step,
//! the append-only result list, confidence values, the monotonic
//! hint/give-up flags, and the submission lifecycle. Only one step is
//! current at a time and all transitions are synchronous; the only
//! asynchronous boundary is the gateway call, which the submission phase
//! marks guard against double-dispatch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::core::item::ReviewItem;
use crate::core::plan::{plan_steps, StepKind};
use crate::core::steps::{
    ApplyStep, ClarificationView, ConfusionStep, McqFeedback, McqStep, RecallStep, RevealedAnswer,
};
use crate::core::timing::TimingTracker;
use crate::error::{RehearseError, Result};

/// Quality rating bounds (Again/Hard/Good/Easy).
pub const QUALITY_MIN: u8 = 1;
pub const QUALITY_MAX: u8 = 4;

/// Confidence rating bounds.
pub const CONFIDENCE_MIN: u8 = 1;
pub const CONFIDENCE_MAX: u8 = 5;

/// Delimiter joining non-empty step answers in the submission.
pub const ANSWER_DELIMITER: &str = " | ";

/// Result of one completed step. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepResult {
    /// Which step kind produced this result.
    pub kind: StepKind,
    /// Tri-state verdict: `None` means self-assessed, not machine-gradable.
    pub correct: Option<bool>,
    /// The answer as given, possibly empty.
    pub answer_given: String,
    /// Time spent on this step.
    pub elapsed_ms: u64,
}

/// Final payload handed to the result submission gateway.
///
/// Constructed exactly once per session; retries resend the same value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewSubmission {
    /// Quality rating, 1-4.
    pub quality: u8,
    /// Session start to final rating.
    pub time_spent_ms: u64,
    /// Session start to first reveal (0 if nothing was revealed).
    pub time_to_reveal_ms: u64,
    /// First reveal to final rating (from session start if never revealed).
    pub time_to_rate_ms: u64,
    /// Non-empty step answers joined in step order; absent when all empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_text: Option<String>,
    /// Confidence before the review, 1-5, when collected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_before: Option<u8>,
    /// Confidence after the review, 1-5.
    pub confidence_after: u8,
    /// Whether a hint was requested at any point in the session.
    pub hint_requested: bool,
    /// Whether the learner gave up on any step.
    pub gave_up: bool,
}

/// Submission lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    /// Question steps running, or a failed submission awaiting retry.
    #[default]
    Open,
    /// A gateway call is pending; no second dispatch is allowed.
    InFlight,
    /// Terminal: the gateway accepted the submission.
    Submitted,
}

/// Executor for the current step.
#[derive(Debug, Clone)]
enum StepExec {
    Mcq(McqStep),
    Recall(RecallStep),
    Apply(ApplyStep),
    Rate,
    Confusion(ConfusionStep),
}

/// One in-progress review of one learning item.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    item: ReviewItem,
    plan: Vec<StepKind>,
    current_index: usize,
    current: StepExec,
    step_results: Vec<StepResult>,
    started_at: DateTime<Utc>,
    timing: TimingTracker,
    step_started_at: Instant,
    confidence_before: Option<u8>,
    confidence_after: Option<u8>,
    hint_requested: bool,
    gave_up: bool,
    composed: Option<ReviewSubmission>,
    phase: SubmissionPhase,
}

impl ReviewSession {
    /// Begin a review of `item`, planning its steps and starting the clock.
    pub fn new(item: ReviewItem) -> Result<Self> {
        Self::new_at(item, Instant::now())
    }

    /// Begin a review with an explicit start instant.
    pub fn new_at(item: ReviewItem, start: Instant) -> Result<Self> {
        let plan = plan_steps(&item);
        let current = Self::build_exec(&item, plan[0])?;
        Ok(Self {
            item,
            plan,
            current_index: 0,
            current,
            step_results: Vec::new(),
            started_at: Utc::now(),
            timing: TimingTracker::start_at(start),
            step_started_at: start,
            confidence_before: None,
            confidence_after: None,
            hint_requested: false,
            gave_up: false,
            composed: None,
            phase: SubmissionPhase::Open,
        })
    }

    fn build_exec(item: &ReviewItem, kind: StepKind) -> Result<StepExec> {
        match kind {
            StepKind::Mcq => {
                let content = item
                    .mcq()
                    .ok_or(RehearseError::incomplete_item(StepKind::Mcq, "mcq"))?;
                Ok(StepExec::Mcq(McqStep::new(content)?))
            }
            StepKind::Recall => {
                let content = item
                    .recall()
                    .ok_or(RehearseError::incomplete_item(StepKind::Recall, "recall"))?;
                Ok(StepExec::Recall(RecallStep::new(content)?))
            }
            StepKind::Apply => {
                let content = item.application().ok_or(RehearseError::incomplete_item(
                    StepKind::Apply,
                    "application",
                ))?;
                Ok(StepExec::Apply(ApplyStep::new(content)?))
            }
            StepKind::Rate => Ok(StepExec::Rate),
            StepKind::Confusion => {
                let content = item.confusion_content().ok_or(
                    RehearseError::incomplete_item(StepKind::Confusion, "confusion"),
                )?;
                Ok(StepExec::Confusion(ConfusionStep::new(content)))
            }
        }
    }

    /// The item under review.
    pub fn item(&self) -> &ReviewItem {
        &self.item
    }

    /// The reviewed item's identifier.
    pub fn item_id(&self) -> &str {
        &self.item.item_id
    }

    /// The planned step list.
    pub fn plan(&self) -> &[StepKind] {
        &self.plan
    }

    /// Wall-clock session start, for display.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// The kind of the current step.
    pub fn current_step(&self) -> StepKind {
        self.plan[self.current_index]
    }

    /// Zero-based index of the current step.
    pub fn step_index(&self) -> usize {
        self.current_index
    }

    /// Total number of planned steps.
    pub fn step_count(&self) -> usize {
        self.plan.len()
    }

    /// Whether the current step is the last one.
    pub fn is_last_step(&self) -> bool {
        self.current_index + 1 == self.plan.len()
    }

    /// Results appended so far, in step order.
    pub fn results(&self) -> &[StepResult] {
        &self.step_results
    }

    /// Confidence recorded before the review, if set.
    pub fn confidence_before(&self) -> Option<u8> {
        self.confidence_before
    }

    /// Confidence recorded with the final rating, once composed.
    pub fn confidence_after(&self) -> Option<u8> {
        self.confidence_after
    }

    /// Whether a hint has been requested this session.
    pub fn hint_requested(&self) -> bool {
        self.hint_requested
    }

    /// Whether the learner has given up on any step this session.
    pub fn gave_up(&self) -> bool {
        self.gave_up
    }

    /// Current submission phase.
    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    /// The frozen submission payload, once composed.
    pub fn submission(&self) -> Option<&ReviewSubmission> {
        self.composed.as_ref()
    }

    /// Move to the next step. The caller checks `is_last_step` first;
    /// advancing past the end fails. A step left incomplete simply records
    /// nothing (an abandoned attempt is the caller's concern).
    pub fn advance(&mut self) -> Result<()> {
        if self.is_last_step() {
            return Err(RehearseError::OutOfSteps {
                index: self.current_index,
            });
        }
        self.current_index += 1;
        self.current = Self::build_exec(&self.item, self.plan[self.current_index])?;
        self.step_started_at = Instant::now();
        tracing::debug!(
            item_id = %self.item.item_id,
            step = self.plan[self.current_index].label(),
            index = self.current_index,
            "advanced to next step"
        );
        Ok(())
    }

    /// Record confidence before the review. Accepted any time until the
    /// submission payload freezes.
    pub fn set_confidence_before(&mut self, value: u8) -> Result<()> {
        validate_rating("confidence_before", value, CONFIDENCE_MIN, CONFIDENCE_MAX)?;
        if self.composed.is_some() {
            return Err(RehearseError::AlreadySubmitted {
                item_id: self.item.item_id.clone(),
            });
        }
        self.confidence_before = Some(value);
        Ok(())
    }

    /// Request a hint. Sets the session-level flag on first use, from any
    /// step, and never unsets it. Returns the application hint text when
    /// the item carries one.
    pub fn request_hint(&mut self) -> Option<&str> {
        self.hint_requested = true;
        self.item.application().and_then(|a| a.hint.as_deref())
    }

    /// The MCQ executor, when an MCQ step is current. Exposes the prompt
    /// and options for rendering.
    pub fn mcq_step(&self) -> Result<&McqStep> {
        match &self.current {
            StepExec::Mcq(step) => Ok(step),
            _ => Err(self.mismatch("mcq_step", StepKind::Mcq)),
        }
    }

    /// The recall executor, when a recall step is current.
    pub fn recall_step(&self) -> Result<&RecallStep> {
        match &self.current {
            StepExec::Recall(step) => Ok(step),
            _ => Err(self.mismatch("recall_step", StepKind::Recall)),
        }
    }

    /// The application executor, when an application step is current.
    pub fn apply_step(&self) -> Result<&ApplyStep> {
        match &self.current {
            StepExec::Apply(step) => Ok(step),
            _ => Err(self.mismatch("apply_step", StepKind::Apply)),
        }
    }

    /// Lock in an MCQ answer, revealing the verdict and explanation.
    pub fn submit_mcq_answer(&mut self, selected: usize) -> Result<McqFeedback> {
        let feedback = match &mut self.current {
            StepExec::Mcq(step) => step.submit(selected)?,
            _ => return Err(self.mismatch("submit_mcq_answer", StepKind::Mcq)),
        };
        self.timing.mark_first_reveal();
        self.append_current_completion();
        Ok(feedback)
    }

    /// Record the typed attempt for the current recall or application step.
    pub fn set_answer(&mut self, text: impl Into<String>) -> Result<()> {
        match &mut self.current {
            StepExec::Recall(step) => step.set_draft(text),
            StepExec::Apply(step) => step.set_draft(text),
            _ => Err(self.mismatch("set_answer", StepKind::Recall)),
        }
    }

    /// Reveal the model answer for the current recall or application step,
    /// locking the attempt.
    pub fn reveal_answer(&mut self) -> Result<RevealedAnswer> {
        let revealed = match &mut self.current {
            StepExec::Recall(step) => step.reveal()?,
            StepExec::Apply(step) => step.reveal()?,
            _ => return Err(self.mismatch("reveal_answer", StepKind::Recall)),
        };
        self.timing.mark_first_reveal();
        self.append_current_completion();
        Ok(revealed)
    }

    /// Give up on the current recall or application step: sets the
    /// session's give-up flag (monotonic) and reveals immediately.
    pub fn give_up(&mut self) -> Result<RevealedAnswer> {
        match &self.current {
            StepExec::Recall(_) | StepExec::Apply(_) => {}
            _ => return Err(self.mismatch("give_up", StepKind::Recall)),
        }
        self.gave_up = true;
        self.reveal_answer()
    }

    /// Reveal the clarification for a confusion item. Idempotent.
    pub fn reveal_clarification(&mut self) -> Result<ClarificationView> {
        let view = match &mut self.current {
            StepExec::Confusion(step) => step.reveal(),
            _ => return Err(self.mismatch("reveal_clarification", StepKind::Confusion)),
        };
        self.timing.mark_first_reveal();
        Ok(view)
    }

    /// Compose the final submission payload.
    ///
    /// Only callable once the terminal step is current: the `rate` step,
    /// or a confusion step whose clarification has been revealed (it
    /// doubles as the rate step). The first successful call freezes the
    /// payload; later calls return the frozen payload unchanged so a retry
    /// always resends identical data.
    pub fn compose_submission(&mut self, quality: u8, confidence_after: u8) -> Result<ReviewSubmission> {
        self.compose_submission_at(quality, confidence_after, Instant::now())
    }

    /// Compose with an explicit rating instant.
    pub fn compose_submission_at(
        &mut self,
        quality: u8,
        confidence_after: u8,
        rate_at: Instant,
    ) -> Result<ReviewSubmission> {
        if self.phase == SubmissionPhase::Submitted {
            return Err(RehearseError::AlreadySubmitted {
                item_id: self.item.item_id.clone(),
            });
        }
        if let Some(frozen) = &self.composed {
            return Ok(frozen.clone());
        }
        match &self.current {
            StepExec::Rate => {}
            StepExec::Confusion(step) if step.revealed() => {}
            _ => {
                return Err(RehearseError::PrematureSubmission {
                    current: self.current_step(),
                })
            }
        }
        validate_rating("quality", quality, QUALITY_MIN, QUALITY_MAX)?;
        validate_rating("confidence_after", confidence_after, CONFIDENCE_MIN, CONFIDENCE_MAX)?;

        self.confidence_after = Some(confidence_after);
        let timing = self.timing.summarize(rate_at);
        let submission = ReviewSubmission {
            quality,
            time_spent_ms: timing.total_time_ms,
            time_to_reveal_ms: timing.time_to_reveal_ms,
            time_to_rate_ms: timing.time_to_rate_ms,
            answer_text: join_answers(&self.step_results),
            confidence_before: self.confidence_before,
            confidence_after,
            hint_requested: self.hint_requested,
            gave_up: self.gave_up,
        };
        tracing::debug!(
            item_id = %self.item.item_id,
            quality,
            total_ms = timing.total_time_ms,
            "composed review submission"
        );
        self.composed = Some(submission.clone());
        Ok(submission)
    }

    /// Mark a gateway dispatch as started. Rejects a second dispatch while
    /// one is pending, and any dispatch before composing or after success.
    pub fn mark_submission_started(&mut self) -> Result<()> {
        match self.phase {
            SubmissionPhase::InFlight => Err(RehearseError::SubmissionInFlight {
                item_id: self.item.item_id.clone(),
            }),
            SubmissionPhase::Submitted => Err(RehearseError::AlreadySubmitted {
                item_id: self.item.item_id.clone(),
            }),
            SubmissionPhase::Open => {
                if self.composed.is_none() {
                    return Err(RehearseError::PrematureSubmission {
                        current: self.current_step(),
                    });
                }
                self.phase = SubmissionPhase::InFlight;
                Ok(())
            }
        }
    }

    /// Mark the pending dispatch as accepted. The session is terminal.
    pub fn mark_submission_complete(&mut self) {
        self.phase = SubmissionPhase::Submitted;
    }

    /// Mark the pending dispatch as failed. The session stays open so the
    /// frozen payload can be resent.
    pub fn mark_submission_failed(&mut self) {
        if self.phase == SubmissionPhase::InFlight {
            self.phase = SubmissionPhase::Open;
        }
    }

    fn mismatch(&self, action: &'static str, expected: StepKind) -> RehearseError {
        RehearseError::step_mismatch(action, expected, self.current_step())
    }

    /// Append the current executor's completion record. Each step index
    /// contributes at most one result; executors lock after completing, so
    /// a duplicate append can only come from internal misuse and is ignored.
    fn append_current_completion(&mut self) {
        let completion = match &self.current {
            StepExec::Mcq(step) => step.completion(),
            StepExec::Recall(step) => step.completion(),
            StepExec::Apply(step) => step.completion(),
            StepExec::Rate | StepExec::Confusion(_) => None,
        };
        if let Some(completion) = completion {
            if self.step_results.len() > self.current_index {
                return;
            }
            self.step_results.push(StepResult {
                kind: self.current_step(),
                correct: completion.correct,
                answer_given: completion.answer_given,
                elapsed_ms: ms_since(self.step_started_at),
            });
        }
    }
}

fn validate_rating(field: &'static str, value: u8, min: u8, max: u8) -> Result<()> {
    if value < min || value > max {
        return Err(RehearseError::InvalidRating {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Join non-empty answers in step order; `None` when every answer is
/// empty, so the field is omitted at the wire rather than sent as "".
fn join_answers(results: &[StepResult]) -> Option<String> {
    let parts: Vec<&str> = results
        .iter()
        .map(|r| r.answer_given.as_str())
        .filter(|a| !a.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(ANSWER_DELIMITER))
    }
}

fn ms_since(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::item::tests::full_concept_item;
    use crate::core::item::{ConfusionContent, RecallContent, ReviewItem};
    use std::time::Duration;

    fn confusion_item() -> ReviewItem {
        ReviewItem::confusion(
            "confusion-1",
            "Why does osmosis matter?",
            ConfusionContent {
                clarification_answer: Some("Water follows solutes.".to_string()),
                follow_up_check: Some("Restate it in your own words.".to_string()),
                related_concepts: vec!["diffusion".to_string()],
            },
        )
    }

    #[test]
    fn test_full_concept_review_end_to_end() {
        let mut session = ReviewSession::new(full_concept_item()).unwrap();
        assert_eq!(
            session.plan(),
            &[StepKind::Mcq, StepKind::Recall, StepKind::Apply, StepKind::Rate]
        );
        assert_eq!(session.step_index(), 0);
        assert_eq!(session.step_count(), 4);

        // MCQ: select the wrong option.
        let feedback = session.submit_mcq_answer(0).unwrap();
        assert!(!feedback.correct);
        session.advance().unwrap();

        // Recall: type an attempt and reveal.
        session.set_answer("photosynthesis").unwrap();
        session.reveal_answer().unwrap();
        session.advance().unwrap();

        // Apply: leave blank, ask for the hint, reveal.
        let hint = session.request_hint().map(str::to_string);
        assert!(hint.is_some());
        session.reveal_answer().unwrap();
        assert!(!session.is_last_step());
        session.advance().unwrap();
        assert!(session.is_last_step());
        assert_eq!(session.current_step(), StepKind::Rate);

        let submission = session.compose_submission(3, 4).unwrap();
        assert_eq!(submission.quality, 3);
        assert_eq!(submission.confidence_after, 4);
        assert!(submission.hint_requested);
        assert!(!submission.gave_up);
        assert_eq!(
            submission.answer_text.as_deref(),
            Some("0 | photosynthesis")
        );

        let results = session.results();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].correct, Some(false));
        assert_eq!(results[0].answer_given, "0");
        assert_eq!(results[1].correct, None);
        assert_eq!(results[1].answer_given, "photosynthesis");
        assert_eq!(results[2].correct, None);
        assert_eq!(results[2].answer_given, "");
    }

    #[test]
    fn test_confusion_review_end_to_end() {
        let mut session = ReviewSession::new(confusion_item()).unwrap();
        assert_eq!(session.plan(), &[StepKind::Confusion]);

        session.set_confidence_before(2).unwrap();
        let view = session.reveal_clarification().unwrap();
        assert_eq!(view.clarification_answer.as_deref(), Some("Water follows solutes."));

        let submission = session.compose_submission(2, 4).unwrap();
        assert_eq!(submission.quality, 2);
        assert_eq!(submission.confidence_before, Some(2));
        assert_eq!(submission.confidence_after, 4);
        assert!(submission.answer_text.is_none());
        assert!(session.results().is_empty());
    }

    #[test]
    fn test_fallback_review_goes_straight_to_rating() {
        let mut session = ReviewSession::new(ReviewItem::concept("bare-1", "text")).unwrap();
        assert_eq!(session.plan(), &[StepKind::Rate]);
        assert!(session.is_last_step());

        let submission = session.compose_submission(4, 5).unwrap();
        assert!(submission.answer_text.is_none());
        assert_eq!(submission.time_to_reveal_ms, 0);
        assert_eq!(submission.time_to_rate_ms, submission.time_spent_ms);
    }

    #[test]
    fn test_premature_submission_rejected_at_every_question_step() {
        let mut session = ReviewSession::new(full_concept_item()).unwrap();
        for _ in 0..3 {
            let err = session.compose_submission(3, 3).unwrap_err();
            assert!(matches!(err, RehearseError::PrematureSubmission { .. }));
            // Complete the step so advancing is meaningful, then move on.
            match session.current_step() {
                StepKind::Mcq => {
                    session.submit_mcq_answer(1).unwrap();
                }
                StepKind::Recall | StepKind::Apply => {
                    session.reveal_answer().unwrap();
                }
                _ => unreachable!(),
            }
            session.advance().unwrap();
        }
        assert!(session.compose_submission(3, 3).is_ok());
    }

    #[test]
    fn test_confusion_submission_requires_reveal() {
        let mut session = ReviewSession::new(confusion_item()).unwrap();
        let err = session.compose_submission(2, 3).unwrap_err();
        assert!(matches!(err, RehearseError::PrematureSubmission { .. }));

        session.reveal_clarification().unwrap();
        assert!(session.compose_submission(2, 3).is_ok());
    }

    #[test]
    fn test_advance_past_last_step_fails() {
        let mut session = ReviewSession::new(ReviewItem::concept("bare-1", "text")).unwrap();
        let err = session.advance().unwrap_err();
        assert!(matches!(err, RehearseError::OutOfSteps { .. }));
    }

    #[test]
    fn test_step_mismatch_errors() {
        let mut session = ReviewSession::new(full_concept_item()).unwrap();
        // MCQ is current; recall/apply actions are rejected.
        assert!(matches!(
            session.set_answer("early").unwrap_err(),
            RehearseError::StepMismatch { .. }
        ));
        assert!(matches!(
            session.reveal_answer().unwrap_err(),
            RehearseError::StepMismatch { .. }
        ));
        assert!(matches!(
            session.reveal_clarification().unwrap_err(),
            RehearseError::StepMismatch { .. }
        ));

        session.submit_mcq_answer(1).unwrap();
        session.advance().unwrap();
        assert!(matches!(
            session.submit_mcq_answer(0).unwrap_err(),
            RehearseError::StepMismatch { .. }
        ));
    }

    #[test]
    fn test_mcq_answer_locked_after_submit() {
        let mut session = ReviewSession::new(full_concept_item()).unwrap();
        session.submit_mcq_answer(0).unwrap();
        let err = session.submit_mcq_answer(1).unwrap_err();
        assert!(matches!(err, RehearseError::AnswerLocked { .. }));
        // The appended result is unchanged.
        assert_eq!(session.results().len(), 1);
        assert_eq!(session.results()[0].answer_given, "0");
    }

    #[test]
    fn test_give_up_flag_is_monotonic() {
        let item = ReviewItem::concept("c-1", "text")
            .with_recall(RecallContent {
                question: "First?".to_string(),
                answer: None,
                key_insight: None,
            })
            .with_application(crate::core::item::ApplicationContent {
                question: "Second?".to_string(),
                answer: None,
                hint: None,
            });
        let mut session = ReviewSession::new(item).unwrap();

        session.give_up().unwrap();
        assert!(session.gave_up());

        // Completing the next step normally cannot reset the flag.
        session.advance().unwrap();
        session.set_answer("an attempt").unwrap();
        session.reveal_answer().unwrap();
        assert!(session.gave_up());
        session.advance().unwrap();

        let submission = session.compose_submission(1, 2).unwrap();
        assert!(submission.gave_up);
    }

    #[test]
    fn test_hint_request_from_non_apply_step() {
        let mut session = ReviewSession::new(full_concept_item()).unwrap();
        // MCQ is current; the flag still sets and the hint text is exposed.
        let hint = session.request_hint().map(str::to_string);
        assert!(session.hint_requested());
        assert_eq!(hint.as_deref(), Some("Think about the energy input."));
    }

    #[test]
    fn test_answer_concatenation_drops_empty_entries() {
        let results = vec![
            StepResult {
                kind: StepKind::Mcq,
                correct: Some(true),
                answer_given: String::new(),
                elapsed_ms: 10,
            },
            StepResult {
                kind: StepKind::Recall,
                correct: None,
                answer_given: "B".to_string(),
                elapsed_ms: 10,
            },
            StepResult {
                kind: StepKind::Apply,
                correct: None,
                answer_given: String::new(),
                elapsed_ms: 10,
            },
        ];
        assert_eq!(join_answers(&results).as_deref(), Some("B"));

        let empties: Vec<StepResult> = results
            .into_iter()
            .map(|r| StepResult {
                answer_given: String::new(),
                ..r
            })
            .collect();
        assert_eq!(join_answers(&empties), None);
    }

    #[test]
    fn test_composed_payload_is_frozen() {
        let mut session = ReviewSession::new(ReviewItem::concept("bare-1", "text")).unwrap();
        let first = session.compose_submission(3, 4).unwrap();
        // A later call, even with different arguments, returns the frozen
        // payload so retries resend identical data.
        let second = session.compose_submission(1, 1).unwrap();
        assert_eq!(first, second);
        assert_eq!(session.submission(), Some(&first));
    }

    #[test]
    fn test_submission_phase_guards() {
        let mut session = ReviewSession::new(ReviewItem::concept("bare-1", "text")).unwrap();

        // Dispatch before composing is premature.
        assert!(matches!(
            session.mark_submission_started().unwrap_err(),
            RehearseError::PrematureSubmission { .. }
        ));

        session.compose_submission(3, 4).unwrap();
        session.mark_submission_started().unwrap();
        assert_eq!(session.phase(), SubmissionPhase::InFlight);

        // Second dispatch while one is pending.
        assert!(matches!(
            session.mark_submission_started().unwrap_err(),
            RehearseError::SubmissionInFlight { .. }
        ));

        // Failure reopens the session for retry with the same payload.
        session.mark_submission_failed();
        assert_eq!(session.phase(), SubmissionPhase::Open);
        session.mark_submission_started().unwrap();

        // Success terminates it.
        session.mark_submission_complete();
        assert_eq!(session.phase(), SubmissionPhase::Submitted);
        assert!(matches!(
            session.mark_submission_started().unwrap_err(),
            RehearseError::AlreadySubmitted { .. }
        ));
        assert!(matches!(
            session.compose_submission(3, 4).unwrap_err(),
            RehearseError::AlreadySubmitted { .. }
        ));
    }

    #[test]
    fn test_rating_validation() {
        let mut session = ReviewSession::new(ReviewItem::concept("bare-1", "text")).unwrap();
        assert!(matches!(
            session.compose_submission(0, 3).unwrap_err(),
            RehearseError::InvalidRating { field: "quality", .. }
        ));
        assert!(matches!(
            session.compose_submission(5, 3).unwrap_err(),
            RehearseError::InvalidRating { field: "quality", .. }
        ));
        assert!(matches!(
            session.compose_submission(3, 6).unwrap_err(),
            RehearseError::InvalidRating { field: "confidence_after", .. }
        ));
        assert!(matches!(
            session.set_confidence_before(0).unwrap_err(),
            RehearseError::InvalidRating { field: "confidence_before", .. }
        ));
    }

    #[test]
    fn test_session_timing_wiring() {
        let start = Instant::now() - Duration::from_millis(5000);
        let item = full_concept_item();
        let mut session = ReviewSession::new_at(item, start).unwrap();

        // The MCQ submit marks the first reveal roughly 5s after start.
        session.submit_mcq_answer(1).unwrap();
        session.advance().unwrap();
        session.reveal_answer().unwrap();
        session.advance().unwrap();
        session.reveal_answer().unwrap();
        session.advance().unwrap();

        let submission = session
            .compose_submission_at(3, 4, start + Duration::from_millis(8000))
            .unwrap();
        assert_eq!(submission.time_spent_ms, 8000);
        assert!(submission.time_to_reveal_ms >= 4900);
        assert_eq!(
            submission.time_to_reveal_ms + submission.time_to_rate_ms,
            submission.time_spent_ms
        );
    }

    #[test]
    fn test_progress_reporting() {
        let mut session = ReviewSession::new(full_concept_item()).unwrap();
        assert_eq!((session.step_index(), session.step_count()), (0, 4));
        session.submit_mcq_answer(1).unwrap();
        session.advance().unwrap();
        assert_eq!((session.step_index(), session.step_count()), (1, 4));
        assert_eq!(session.current_step(), StepKind::Recall);
    }
}
