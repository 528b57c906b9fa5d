//! Review item model.
//!
//! A `ReviewItem` is owned by the backend queue and immutable for the
//! duration of one review session. Exactly one of the concept/confusion
//! content families is populated; the `ItemContent` enum makes that
//! invariant unrepresentable rather than checked.

use serde::{Deserialize, Serialize};

/// Kind of learning item being reviewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// A concept reviewed through question steps.
    Concept,
    /// A learner-flagged confusion point reviewed via reveal-and-rate.
    Confusion,
}

/// Coarse progress label assigned by the backend scheduler.
///
/// Informational only: this subsystem reads it for display and never
/// mutates it. Labels the server adds later parse as `Unknown` instead of
/// failing the whole item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MasteryState {
    #[default]
    New,
    Learning,
    Mastered,
    Graduated,
    #[serde(other)]
    Unknown,
}

/// Multiple-choice enrichment for a concept item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct McqContent {
    /// The question prompt.
    pub question: String,
    /// Answer options. A gradable MCQ needs at least two.
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    pub correct_index: usize,
    /// Explanation shown after the answer is locked.
    pub explanation: Option<String>,
}

/// Free-recall enrichment for a concept item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecallContent {
    /// The recall prompt.
    pub question: String,
    /// Model answer revealed after the attempt.
    pub answer: Option<String>,
    /// One-line takeaway shown alongside the answer.
    pub key_insight: Option<String>,
}

/// Application-question enrichment for a concept item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationContent {
    /// The application prompt.
    pub question: String,
    /// Model answer revealed after the attempt.
    pub answer: Option<String>,
    /// Hint available on request.
    pub hint: Option<String>,
}

/// Clarification content for a confusion item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfusionContent {
    /// The clarification text revealed during the combined step.
    pub clarification_answer: Option<String>,
    /// Follow-up comprehension check shown with the clarification.
    pub follow_up_check: Option<String>,
    /// Related concept names for further reading.
    pub related_concepts: Vec<String>,
}

/// Enrichment content, keyed by item type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ItemContent {
    /// Concept flow: any subset of MCQ / recall / application enrichment.
    Concept {
        mcq: Option<McqContent>,
        recall: Option<RecallContent>,
        application: Option<ApplicationContent>,
    },
    /// Confusion flow: a single reveal-and-rate payload.
    Confusion(ConfusionContent),
}

impl ItemContent {
    /// An empty concept content block (the bare confidence+rating flow).
    pub fn bare_concept() -> Self {
        Self::Concept {
            mcq: None,
            recall: None,
            application: None,
        }
    }
}

/// A learning item pulled from the backend review queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewItem {
    /// Opaque identifier, unique per learning item.
    pub item_id: String,
    /// Raw source text the item was extracted from.
    pub concept_text: String,
    /// Scheduler-assigned progress label (read-only here).
    pub mastery_state: MasteryState,
    /// Enrichment content for the review flow.
    pub content: ItemContent,
}

impl ReviewItem {
    /// Create a concept item with no enrichment.
    pub fn concept(item_id: impl Into<String>, concept_text: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            concept_text: concept_text.into(),
            mastery_state: MasteryState::New,
            content: ItemContent::bare_concept(),
        }
    }

    /// Create a confusion item.
    pub fn confusion(
        item_id: impl Into<String>,
        concept_text: impl Into<String>,
        content: ConfusionContent,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            concept_text: concept_text.into(),
            mastery_state: MasteryState::New,
            content: ItemContent::Confusion(content),
        }
    }

    /// Attach MCQ enrichment (concept items only; no-op for confusion).
    pub fn with_mcq(mut self, mcq_content: McqContent) -> Self {
        if let ItemContent::Concept { ref mut mcq, .. } = self.content {
            *mcq = Some(mcq_content);
        }
        self
    }

    /// Attach recall enrichment (concept items only; no-op for confusion).
    pub fn with_recall(mut self, recall_content: RecallContent) -> Self {
        if let ItemContent::Concept { ref mut recall, .. } = self.content {
            *recall = Some(recall_content);
        }
        self
    }

    /// Attach application enrichment (concept items only; no-op for confusion).
    pub fn with_application(mut self, application_content: ApplicationContent) -> Self {
        if let ItemContent::Concept {
            ref mut application,
            ..
        } = self.content
        {
            *application = Some(application_content);
        }
        self
    }

    /// Set the mastery state label.
    pub fn with_mastery_state(mut self, state: MasteryState) -> Self {
        self.mastery_state = state;
        self
    }

    /// The item type, derived from which content family is populated.
    pub fn item_type(&self) -> ItemType {
        match self.content {
            ItemContent::Concept { .. } => ItemType::Concept,
            ItemContent::Confusion(_) => ItemType::Confusion,
        }
    }

    /// MCQ enrichment, if any.
    pub fn mcq(&self) -> Option<&McqContent> {
        match &self.content {
            ItemContent::Concept { mcq, .. } => mcq.as_ref(),
            ItemContent::Confusion(_) => None,
        }
    }

    /// Recall enrichment, if any.
    pub fn recall(&self) -> Option<&RecallContent> {
        match &self.content {
            ItemContent::Concept { recall, .. } => recall.as_ref(),
            ItemContent::Confusion(_) => None,
        }
    }

    /// Application enrichment, if any.
    pub fn application(&self) -> Option<&ApplicationContent> {
        match &self.content {
            ItemContent::Concept { application, .. } => application.as_ref(),
            ItemContent::Confusion(_) => None,
        }
    }

    /// Confusion content, if this is a confusion item.
    pub fn confusion_content(&self) -> Option<&ConfusionContent> {
        match &self.content {
            ItemContent::Concept { .. } => None,
            ItemContent::Confusion(content) => Some(content),
        }
    }
}

/// Test fixtures shared across core module tests.
#[cfg(test)]
pub mod tests {
    use super::*;

    pub fn full_concept_item() -> ReviewItem {
        ReviewItem::concept("item-1", "Photosynthesis converts light to energy")
            .with_mcq(McqContent {
                question: "What does photosynthesis produce?".to_string(),
                options: vec!["Oxygen".to_string(), "Glucose and oxygen".to_string()],
                correct_index: 1,
                explanation: Some("Both glucose and oxygen are produced.".to_string()),
            })
            .with_recall(RecallContent {
                question: "Describe photosynthesis.".to_string(),
                answer: Some("Light energy becomes chemical energy.".to_string()),
                key_insight: Some("Plants are energy converters.".to_string()),
            })
            .with_application(ApplicationContent {
                question: "Why do plants grow slower in shade?".to_string(),
                answer: Some("Less light means less energy captured.".to_string()),
                hint: Some("Think about the energy input.".to_string()),
            })
    }

    #[test]
    fn test_concept_item_type() {
        let item = ReviewItem::concept("c-1", "text");
        assert_eq!(item.item_type(), ItemType::Concept);
        assert!(item.mcq().is_none());
        assert!(item.confusion_content().is_none());
    }

    #[test]
    fn test_confusion_item_type() {
        let item = ReviewItem::confusion(
            "f-1",
            "text",
            ConfusionContent {
                clarification_answer: Some("Because of osmosis.".to_string()),
                follow_up_check: None,
                related_concepts: vec![],
            },
        );
        assert_eq!(item.item_type(), ItemType::Confusion);
        assert!(item.confusion_content().is_some());
        assert!(item.mcq().is_none());
        assert!(item.recall().is_none());
        assert!(item.application().is_none());
    }

    #[test]
    fn test_enrichment_accessors() {
        let item = full_concept_item();
        assert_eq!(item.mcq().unwrap().correct_index, 1);
        assert_eq!(item.recall().unwrap().question, "Describe photosynthesis.");
        assert!(item.application().unwrap().hint.is_some());
    }

    #[test]
    fn test_with_mcq_is_noop_on_confusion() {
        let item = ReviewItem::confusion(
            "f-1",
            "text",
            ConfusionContent {
                clarification_answer: None,
                follow_up_check: None,
                related_concepts: vec![],
            },
        )
        .with_mcq(McqContent {
            question: "q".to_string(),
            options: vec!["a".to_string(), "b".to_string()],
            correct_index: 0,
            explanation: None,
        });
        assert!(item.mcq().is_none());
        assert_eq!(item.item_type(), ItemType::Confusion);
    }

    #[test]
    fn test_mastery_state_unknown_fallback() {
        let state: MasteryState = serde_json::from_str("\"half_remembered\"").unwrap();
        assert_eq!(state, MasteryState::Unknown);

        let known: MasteryState = serde_json::from_str("\"graduated\"").unwrap();
        assert_eq!(known, MasteryState::Graduated);
    }

    #[test]
    fn test_item_serialization_roundtrip() {
        let item = full_concept_item().with_mastery_state(MasteryState::Learning);
        let json = serde_json::to_string(&item).unwrap();
        let back: ReviewItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, back);
    }
}
