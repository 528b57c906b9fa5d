//! Step planning for review sessions.
//!
//! `plan_steps` is a pure function: given the same item it always returns
//! the same ordered step list, with no side effects. The session stores
//! the plan once at creation and never replans.

use serde::{Deserialize, Serialize};

use crate::core::item::{ItemContent, ReviewItem};

/// Kind of step in a review plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Multiple-choice question with a machine-gradable answer.
    Mcq,
    /// Free-recall prompt, self-assessed.
    Recall,
    /// Application question, self-assessed, with an optional hint.
    Apply,
    /// Terminal confidence + quality rating step.
    Rate,
    /// Combined reveal-and-rate step for confusion items.
    Confusion,
}

impl StepKind {
    /// Whether a final rating can be composed while this step is current.
    ///
    /// `Confusion` doubles as the rate step for confusion items.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepKind::Rate | StepKind::Confusion)
    }

    /// Whether this step collects an answer from the learner.
    pub fn collects_answer(&self) -> bool {
        matches!(self, StepKind::Mcq | StepKind::Recall | StepKind::Apply)
    }

    /// Short label for display and logs.
    pub fn label(&self) -> &'static str {
        match self {
            StepKind::Mcq => "mcq",
            StepKind::Recall => "recall",
            StepKind::Apply => "apply",
            StepKind::Rate => "rate",
            StepKind::Confusion => "confusion",
        }
    }
}

/// Minimum option count for an MCQ step to be gradable.
pub const MIN_MCQ_OPTIONS: usize = 2;

/// Build the ordered step list for one review of `item`.
///
/// Confusion items get a single combined reveal-and-rate step. Concept
/// items get `mcq` / `recall` / `apply` in that fixed relative order, each
/// only when its content qualifies, then always `rate` last. An item with
/// no qualifying enrichment plans as `[rate]` alone: the caller shows a
/// plain confidence + rating card instead of skipping the review.
pub fn plan_steps(item: &ReviewItem) -> Vec<StepKind> {
    let (mcq, recall, application) = match &item.content {
        ItemContent::Confusion(_) => return vec![StepKind::Confusion],
        ItemContent::Concept {
            mcq,
            recall,
            application,
        } => (mcq, recall, application),
    };

    let mut steps = Vec::with_capacity(4);
    if let Some(mcq) = mcq {
        if !mcq.question.is_empty()
            && mcq.options.len() >= MIN_MCQ_OPTIONS
            && mcq.correct_index < mcq.options.len()
        {
            steps.push(StepKind::Mcq);
        }
    }
    if recall.as_ref().is_some_and(|r| !r.question.is_empty()) {
        steps.push(StepKind::Recall);
    }
    if application.as_ref().is_some_and(|a| !a.question.is_empty()) {
        steps.push(StepKind::Apply);
    }
    steps.push(StepKind::Rate);
    steps
}
