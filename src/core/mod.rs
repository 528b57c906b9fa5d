//! Core review session state machine.
//!
//! Everything in this module is framework-independent: plain state objects
//! with pure transition functions, callable from any UI binding.

pub mod item;
pub mod plan;
pub mod session;
pub mod steps;
pub mod timing;

pub use item::{
    ApplicationContent, ConfusionContent, ItemContent, ItemType, MasteryState, McqContent,
    RecallContent, ReviewItem,
};
pub use plan::{plan_steps, StepKind, MIN_MCQ_OPTIONS};
pub use session::{
    ReviewSession, ReviewSubmission, StepResult, SubmissionPhase, ANSWER_DELIMITER,
    CONFIDENCE_MAX, CONFIDENCE_MIN, QUALITY_MAX, QUALITY_MIN,
};
pub use steps::{
    ApplyStep, ClarificationView, ConfusionStep, McqFeedback, McqStep, RecallStep, RevealedAnswer,
    StepCompletion,
};
pub use timing::{TimingSummary, TimingTracker};
