//! Unified error types for Rehearse.
//!
//! Every error except `Gateway` signals a local programming-contract
//! violation: the caller drove the session state machine out of order.
//! `Gateway` is the one error expected in normal operation (network
//! flakiness at the submission boundary) and is retryable with the same
//! composed payload.

use thiserror::Error;

use crate::core::StepKind;

/// The main error type for Rehearse operations.
#[derive(Error, Debug)]
pub enum RehearseError {
    /// A step was planned whose required content field is missing.
    ///
    /// The planner checks content completeness before scheduling a step,
    /// so hitting this means the item mutated after planning or the plan
    /// was built for a different item. Executors fail closed rather than
    /// rendering partial content.
    #[error("incomplete item for {step:?} step: missing {field}")]
    IncompleteItem { step: StepKind, field: &'static str },

    /// `advance()` called with no further steps.
    #[error("no steps remain after index {index}")]
    OutOfSteps { index: usize },

    /// `compose_submission` called before reaching the terminal step.
    #[error("cannot compose submission while {current:?} step is active")]
    PrematureSubmission { current: StepKind },

    /// A second submission attempted while one is pending.
    #[error("a submission for item {item_id} is already in flight")]
    SubmissionInFlight { item_id: String },

    /// The session already terminated with a successful submission.
    #[error("session for item {item_id} already submitted")]
    AlreadySubmitted { item_id: String },

    /// An executor action was invoked while a different step is current.
    #[error("{action} requires the {expected:?} step, but {current:?} is current")]
    StepMismatch {
        action: &'static str,
        expected: StepKind,
        current: StepKind,
    },

    /// A step that already produced its result was answered again.
    #[error("{step:?} step already completed; answers are locked")]
    AnswerLocked { step: StepKind },

    /// Quality or confidence value outside its valid range.
    #[error("invalid {field} value {value} (expected {min}..={max})")]
    InvalidRating {
        field: &'static str,
        value: u8,
        min: u8,
        max: u8,
    },

    /// Transport or rejection failure from the result submission gateway.
    #[error("gateway error: {message}")]
    Gateway { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },

    /// JSON parsing/serialization errors at the wire boundary.
    #[error("serialization error: {message}")]
    Serde { message: String },
}

/// A specialized Result type for Rehearse operations.
pub type Result<T> = std::result::Result<T, RehearseError>;

impl RehearseError {
    /// Create an incomplete item error.
    pub fn incomplete_item(step: StepKind, field: &'static str) -> Self {
        Self::IncompleteItem { step, field }
    }

    /// Create a step mismatch error.
    pub fn step_mismatch(action: &'static str, expected: StepKind, current: StepKind) -> Self {
        Self::StepMismatch {
            action,
            expected,
            current,
        }
    }

    /// Create a gateway error.
    pub fn gateway(message: impl Into<String>) -> Self {
        Self::Gateway {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable by retrying the same payload.
    ///
    /// Only gateway failures qualify: the composed submission is idempotent
    /// data and the session stays un-terminated, so the caller may resend
    /// without redoing any question steps. Every other variant is a
    /// contract violation that retrying would repeat.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Gateway { .. })
    }
}

impl From<serde_json::Error> for RehearseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}
