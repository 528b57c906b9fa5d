//! CLI commands for Rehearse.
//!
//! Each command follows the same shape: an options struct, a serializable
//! output struct with `format_text()`, and a command struct with `run()`.
//! Commands never print directly; the binary decides between text and JSON
//! rendering based on flags.

pub mod plan_cmd;
pub mod review;

pub use plan_cmd::{PlanCommand, PlanOptions, PlanOutput};
pub use review::{ReviewCommand, ReviewOptions, ReviewOutput, ReviewUi, TerminalUi};
