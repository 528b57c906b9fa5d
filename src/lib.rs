//! Rehearse - spaced-repetition review session engine for Founder OS.
//!
//! Rehearse drives a single review of one learning item through its
//! planned steps (multiple choice, free recall, application, or a
//! confusion reveal) to a final quality rating, collecting timing,
//! confidence, and correctness telemetry along the way. The composed
//! submission is handed to a result submission gateway; the scheduling
//! algorithm itself lives server-side behind that boundary.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod gateway;
pub mod runner;

pub use config::Config;
pub use core::{
    plan_steps, ItemType, MasteryState, ReviewItem, ReviewSession, ReviewSubmission, StepKind,
    StepResult, SubmissionPhase,
};
pub use error::{RehearseError, Result};
pub use gateway::{InMemoryGateway, ReviewGateway, ReviewOutcome};
pub use runner::Submitter;

// CLI commands
pub use cli::{PlanCommand, ReviewCommand};
