//! Wire-format translation for the gateway boundary.
//!
//! The backend API mixes snake_case and camelCase field naming. All of
//! that shimming lives here, one function per direction, so the internal
//! data model never sees wire naming. Outbound submissions use the exact
//! field names the scheduler persists (`item_uuid`, `founder_answer`, ...);
//! inbound structs accept both naming styles via serde aliases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{
    ApplicationContent, ConfusionContent, ItemContent, MasteryState, McqContent, RecallContent,
    ReviewItem, ReviewSubmission,
};
use crate::error::Result;
use crate::gateway::ReviewOutcome;

/// Outbound submission payload, field names fixed by the scheduler API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireSubmission {
    pub item_uuid: String,
    pub quality: u8,
    pub time_spent_ms: u64,
    pub time_to_reveal_ms: u64,
    pub time_to_rate_ms: u64,
    /// Omitted entirely when no step collected an answer; never an empty
    /// string. Downstream persistence distinguishes the two.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub founder_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub confidence_before: Option<u8>,
    pub confidence_after: u8,
    pub hint_requested: bool,
    pub gave_up: bool,
}

/// Translate a composed submission to the wire shape.
pub fn submission_to_wire(item_id: &str, submission: &ReviewSubmission) -> WireSubmission {
    WireSubmission {
        item_uuid: item_id.to_string(),
        quality: submission.quality,
        time_spent_ms: submission.time_spent_ms,
        time_to_reveal_ms: submission.time_to_reveal_ms,
        time_to_rate_ms: submission.time_to_rate_ms,
        founder_answer: submission.answer_text.clone(),
        confidence_before: submission.confidence_before,
        confidence_after: submission.confidence_after,
        hint_requested: submission.hint_requested,
        gave_up: submission.gave_up,
    }
}

/// Inbound scheduler outcome, tolerant of camelCase variants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireOutcome {
    pub success: bool,
    #[serde(alias = "newIntervalDays")]
    pub new_interval_days: f64,
    #[serde(alias = "newEaseFactor")]
    pub new_ease_factor: f64,
    #[serde(alias = "newMasteryState", default)]
    pub new_mastery_state: MasteryState,
    #[serde(alias = "nextReviewAt")]
    pub next_review_at: DateTime<Utc>,
}

/// Translate a wire outcome into the internal model.
pub fn outcome_from_wire(wire: WireOutcome) -> ReviewOutcome {
    ReviewOutcome {
        success: wire.success,
        new_interval_days: wire.new_interval_days,
        new_ease_factor: wire.new_ease_factor,
        new_mastery_state: wire.new_mastery_state,
        next_review_at: wire.next_review_at,
    }
}

/// Inbound queue item, tolerant of camelCase variants.
///
/// Enrichment fields are flat on the wire; `item_from_wire` regroups them
/// into the content family selected by `item_type`, which is how the
/// internal model guarantees exactly one family is populated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct WireReviewItem {
    #[serde(alias = "itemId", alias = "item_uuid", alias = "itemUuid")]
    pub item_id: String,
    #[serde(alias = "itemType")]
    pub item_type: String,
    #[serde(alias = "conceptText")]
    pub concept_text: String,
    #[serde(alias = "masteryState")]
    pub mastery_state: MasteryState,

    #[serde(alias = "mcqQuestion")]
    pub mcq_question: Option<String>,
    #[serde(alias = "mcqOptions")]
    pub mcq_options: Option<Vec<String>>,
    #[serde(alias = "mcqCorrectIndex")]
    pub mcq_correct_index: Option<usize>,
    #[serde(alias = "mcqExplanation")]
    pub mcq_explanation: Option<String>,

    #[serde(alias = "recallQuestion")]
    pub recall_question: Option<String>,
    #[serde(alias = "recallAnswer")]
    pub recall_answer: Option<String>,
    #[serde(alias = "keyInsight")]
    pub key_insight: Option<String>,

    #[serde(alias = "applicationQuestion")]
    pub application_question: Option<String>,
    #[serde(alias = "applicationAnswer")]
    pub application_answer: Option<String>,
    #[serde(alias = "applicationHint")]
    pub application_hint: Option<String>,

    #[serde(alias = "clarificationAnswer")]
    pub clarification_answer: Option<String>,
    #[serde(alias = "followUpCheck")]
    pub follow_up_check: Option<String>,
    #[serde(alias = "relatedConcepts")]
    pub related_concepts: Option<Vec<String>>,
}

/// Translate a wire item into the internal model.
///
/// Fields belonging to the other content family are dropped. An MCQ block
/// is only kept when question, options, and correct index are all present;
/// partial blocks would plan an ungradable step.
pub fn item_from_wire(wire: WireReviewItem) -> ReviewItem {
    let content = if wire.item_type == "confusion" {
        ItemContent::Confusion(ConfusionContent {
            clarification_answer: wire.clarification_answer,
            follow_up_check: wire.follow_up_check,
            related_concepts: wire.related_concepts.unwrap_or_default(),
        })
    } else {
        let mcq = match (wire.mcq_question, wire.mcq_options, wire.mcq_correct_index) {
            (Some(question), Some(options), Some(correct_index)) => Some(McqContent {
                question,
                options,
                correct_index,
                explanation: wire.mcq_explanation,
            }),
            _ => None,
        };
        let recall = wire.recall_question.map(|question| RecallContent {
            question,
            answer: wire.recall_answer,
            key_insight: wire.key_insight,
        });
        let application = wire.application_question.map(|question| ApplicationContent {
            question,
            answer: wire.application_answer,
            hint: wire.application_hint,
        });
        ItemContent::Concept {
            mcq,
            recall,
            application,
        }
    };

    ReviewItem {
        item_id: wire.item_id,
        concept_text: wire.concept_text,
        mastery_state: wire.mastery_state,
        content,
    }
}

/// Parse a JSON review queue (an array of wire items).
pub fn parse_queue(json: &str) -> Result<Vec<ReviewItem>> {
    let wire_items: Vec<WireReviewItem> = serde_json::from_str(json)?;
    Ok(wire_items.into_iter().map(item_from_wire).collect())
}
