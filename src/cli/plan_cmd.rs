//! Plan command for Rehearse.
//!
//! Loads a review queue file and prints the planned steps for each item
//! without running a review. Useful for checking what a queue will ask
//! before sitting down to review it.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{plan_steps, ReviewItem};
use crate::error::{RehearseError, Result};
use crate::gateway::parse_queue;

/// Options for the plan command.
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Planned steps for a single item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemPlan {
    /// Item identifier.
    pub item_id: String,
    /// "concept" or "confusion".
    pub item_type: String,
    /// Step labels in execution order.
    pub steps: Vec<String>,
}

impl From<&ReviewItem> for ItemPlan {
    fn from(item: &ReviewItem) -> Self {
        Self {
            item_id: item.item_id.clone(),
            item_type: format!("{:?}", item.item_type()).to_lowercase(),
            steps: plan_steps(item)
                .iter()
                .map(|s| s.label().to_string())
                .collect(),
        }
    }
}

/// Output format for the plan command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Plans, one per queue item.
    pub plans: Vec<ItemPlan>,
    /// Total count of items planned.
    pub count: usize,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PlanOutput {
    /// Create a successful output.
    pub fn success(plans: Vec<ItemPlan>) -> Self {
        let count = plans.len();
        Self {
            success: true,
            plans,
            count,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            plans: vec![],
            count: 0,
            error: Some(error.into()),
        }
    }

    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        if !self.success {
            return format!(
                "Plan failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            );
        }

        if self.plans.is_empty() {
            return "Queue is empty.".to_string();
        }

        let mut lines = vec![format!("Planned {} item(s):", self.count), String::new()];
        lines.push(format!("{:<24}  {:<10}  {}", "ITEM", "TYPE", "STEPS"));
        lines.push("-".repeat(64));
        for plan in &self.plans {
            lines.push(format!(
                "{:<24}  {:<10}  {}",
                plan.item_id,
                plan.item_type,
                plan.steps.join(" -> ")
            ));
        }
        lines.join("\n")
    }
}

/// The plan command implementation.
#[derive(Debug, Default)]
pub struct PlanCommand;

impl PlanCommand {
    pub fn new() -> Self {
        Self
    }

    /// Run the plan command against a queue file.
    pub fn run(&self, queue_path: &Path, _options: &PlanOptions) -> PlanOutput {
        match self.load_queue(queue_path) {
            Ok(items) => PlanOutput::success(items.iter().map(ItemPlan::from).collect()),
            Err(e) => PlanOutput::failure(format!("Failed to load queue: {}", e)),
        }
    }

    fn load_queue(&self, path: &Path) -> Result<Vec<ReviewItem>> {
        let content = fs::read_to_string(path).map_err(|e| RehearseError::config(e.to_string()))?;
        parse_queue(&content)
    }
}
