//! Result submission gateway boundary.

pub mod memory;
pub mod traits;
pub mod wire;

pub use memory::InMemoryGateway;
pub use traits::{ReviewGateway, ReviewOutcome};
pub use wire::{
    item_from_wire, outcome_from_wire, parse_queue, submission_to_wire, WireOutcome,
    WireReviewItem, WireSubmission,
};
