//! Step executors.
//!
//! One executor per step kind. Each runs a small state machine collecting
//! the learner's answer and a correctness verdict, and completes exactly
//! once; a completed executor locks and rejects further answers. Missing
//! *optional* content (an absent explanation, hint, or model answer) is
//! simply omitted from feedback; missing *required* content fails closed
//! at construction with an incomplete-item error, since the planner only
//! schedules steps whose required content is present.

use serde::{Deserialize, Serialize};

use crate::core::item::{ApplicationContent, ConfusionContent, McqContent, RecallContent};
use crate::core::plan::{StepKind, MIN_MCQ_OPTIONS};
use crate::error::{RehearseError, Result};

/// Feedback revealed when an MCQ answer is locked in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct McqFeedback {
    /// Whether the selected option was correct.
    pub correct: bool,
    /// Index of the correct option.
    pub correct_index: usize,
    /// Explanation, when the item carries one.
    pub explanation: Option<String>,
}

/// Content revealed after a recall or application attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevealedAnswer {
    /// Model answer, when the item carries one.
    pub answer: Option<String>,
    /// One-line takeaway, when the item carries one.
    pub key_insight: Option<String>,
}

/// Clarification content revealed during a confusion step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClarificationView {
    /// The clarification text, when the item carries one.
    pub clarification_answer: Option<String>,
    /// Follow-up comprehension check, when the item carries one.
    pub follow_up_check: Option<String>,
    /// Related concept names.
    pub related_concepts: Vec<String>,
}

/// What a completed executor hands to the session aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct StepCompletion {
    /// Tri-state verdict: `None` means self-assessed, not machine-gradable.
    pub correct: Option<bool>,
    /// The answer as given, possibly empty.
    pub answer_given: String,
}

/// Multiple-choice executor: select one option, lock, reveal verdict.
#[derive(Debug, Clone)]
pub struct McqStep {
    content: McqContent,
    selected: Option<usize>,
}

impl McqStep {
    /// Build the executor, failing closed on missing required content.
    pub fn new(content: &McqContent) -> Result<Self> {
        if content.question.is_empty() {
            return Err(RehearseError::incomplete_item(StepKind::Mcq, "mcq_question"));
        }
        if content.options.len() < MIN_MCQ_OPTIONS {
            return Err(RehearseError::incomplete_item(StepKind::Mcq, "mcq_options"));
        }
        if content.correct_index >= content.options.len() {
            return Err(RehearseError::incomplete_item(
                StepKind::Mcq,
                "mcq_correct_index",
            ));
        }
        Ok(Self {
            content: content.clone(),
            selected: None,
        })
    }

    /// The question prompt.
    pub fn question(&self) -> &str {
        &self.content.question
    }

    /// The answer options.
    pub fn options(&self) -> &[String] {
        &self.content.options
    }

    /// Lock in an answer and reveal the verdict. The selection cannot be
    /// changed afterwards; a second call is rejected.
    pub fn submit(&mut self, selected: usize) -> Result<McqFeedback> {
        if self.selected.is_some() {
            return Err(RehearseError::AnswerLocked {
                step: StepKind::Mcq,
            });
        }
        self.selected = Some(selected);
        Ok(McqFeedback {
            correct: selected == self.content.correct_index,
            correct_index: self.content.correct_index,
            explanation: self.content.explanation.clone(),
        })
    }

    /// Whether an answer has been locked in.
    pub fn answered(&self) -> bool {
        self.selected.is_some()
    }

    /// The completion record, once answered.
    pub fn completion(&self) -> Option<StepCompletion> {
        self.selected.map(|selected| StepCompletion {
            correct: Some(selected == self.content.correct_index),
            answer_given: selected.to_string(),
        })
    }
}

/// Free-recall executor: optional typed attempt, then reveal or give up.
///
/// Recall answers are never machine-graded; the verdict is always `None`.
#[derive(Debug, Clone)]
pub struct RecallStep {
    question: String,
    answer: Option<String>,
    key_insight: Option<String>,
    draft: String,
    revealed: bool,
}

impl RecallStep {
    /// Build the executor, failing closed on a missing question.
    pub fn new(content: &RecallContent) -> Result<Self> {
        if content.question.is_empty() {
            return Err(RehearseError::incomplete_item(
                StepKind::Recall,
                "recall_question",
            ));
        }
        Ok(Self {
            question: content.question.clone(),
            answer: content.answer.clone(),
            key_insight: content.key_insight.clone(),
            draft: String::new(),
            revealed: false,
        })
    }

    /// The recall prompt.
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Record the typed attempt. Empty text is permitted.
    pub fn set_draft(&mut self, text: impl Into<String>) -> Result<()> {
        if self.revealed {
            return Err(RehearseError::AnswerLocked {
                step: StepKind::Recall,
            });
        }
        self.draft = text.into();
        Ok(())
    }

    /// Reveal the model answer and lock the attempt.
    pub fn reveal(&mut self) -> Result<RevealedAnswer> {
        if self.revealed {
            return Err(RehearseError::AnswerLocked {
                step: StepKind::Recall,
            });
        }
        self.revealed = true;
        Ok(RevealedAnswer {
            answer: self.answer.clone(),
            key_insight: self.key_insight.clone(),
        })
    }

    /// Whether the step has revealed and locked.
    pub fn revealed(&self) -> bool {
        self.revealed
    }

    /// The completion record, once revealed.
    pub fn completion(&self) -> Option<StepCompletion> {
        self.revealed.then(|| StepCompletion {
            correct: None,
            answer_given: self.draft.clone(),
        })
    }
}

/// Application executor: recall-shaped, plus an on-request hint.
#[derive(Debug, Clone)]
pub struct ApplyStep {
    question: String,
    answer: Option<String>,
    hint: Option<String>,
    draft: String,
    revealed: bool,
}

impl ApplyStep {
    /// Build the executor, failing closed on a missing question.
    pub fn new(content: &ApplicationContent) -> Result<Self> {
        if content.question.is_empty() {
            return Err(RehearseError::incomplete_item(
                StepKind::Apply,
                "application_question",
            ));
        }
        Ok(Self {
            question: content.question.clone(),
            answer: content.answer.clone(),
            hint: content.hint.clone(),
            draft: String::new(),
            revealed: false,
        })
    }

    /// The application prompt.
    pub fn question(&self) -> &str {
        &self.question
    }

    /// The hint text, when the item carries one. The session owns the
    /// hint-requested flag; this only exposes the content.
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// Record the typed attempt. Empty text is permitted.
    pub fn set_draft(&mut self, text: impl Into<String>) -> Result<()> {
        if self.revealed {
            return Err(RehearseError::AnswerLocked {
                step: StepKind::Apply,
            });
        }
        self.draft = text.into();
        Ok(())
    }

    /// Reveal the model answer and lock the attempt.
    pub fn reveal(&mut self) -> Result<RevealedAnswer> {
        if self.revealed {
            return Err(RehearseError::AnswerLocked {
                step: StepKind::Apply,
            });
        }
        self.revealed = true;
        Ok(RevealedAnswer {
            answer: self.answer.clone(),
            key_insight: None,
        })
    }

    /// Whether the step has revealed and locked.
    pub fn revealed(&self) -> bool {
        self.revealed
    }

    /// The completion record, once revealed.
    pub fn completion(&self) -> Option<StepCompletion> {
        self.revealed.then(|| StepCompletion {
            correct: None,
            answer_given: self.draft.clone(),
        })
    }
}

/// Confusion executor: reveal the clarification, then rate directly.
///
/// The single combined step for confusion items. Nothing is graded and no
/// answer is collected, so it produces no completion record; it doubles as
/// the terminal rate step instead. Every content field is optional, so
/// construction never fails.
#[derive(Debug, Clone)]
pub struct ConfusionStep {
    content: ConfusionContent,
    revealed: bool,
}

impl ConfusionStep {
    pub fn new(content: &ConfusionContent) -> Self {
        Self {
            content: content.clone(),
            revealed: false,
        }
    }

    /// Reveal the clarification content. Idempotent: revealing again
    /// returns the same view.
    pub fn reveal(&mut self) -> ClarificationView {
        self.revealed = true;
        ClarificationView {
            clarification_answer: self.content.clarification_answer.clone(),
            follow_up_check: self.content.follow_up_check.clone(),
            related_concepts: self.content.related_concepts.clone(),
        }
    }

    /// Whether the clarification has been revealed.
    pub fn revealed(&self) -> bool {
        self.revealed
    }
}
