//! Review command for Rehearse.
//!
//! Drives each queued item through its planned steps at the terminal,
//! then submits the composed rating through the configured gateway. The
//! command talks to an abstract `ReviewUi` so tests can script a whole
//! review without a terminal.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::core::{
    ReviewItem, ReviewSession, StepKind, CONFIDENCE_MAX, CONFIDENCE_MIN, QUALITY_MAX, QUALITY_MIN,
};
use crate::error::{RehearseError, Result};
use crate::gateway::{parse_queue, submission_to_wire, ReviewGateway, ReviewOutcome, WireSubmission};
use crate::runner::Submitter;

/// Options for the review command.
#[derive(Debug, Clone, Default)]
pub struct ReviewOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Override the configured per-run item limit.
    pub limit: Option<u32>,
    /// Write submitted payloads and outcomes to this file as JSON.
    pub out: Option<PathBuf>,
}

/// Presentation-layer boundary for one review run.
///
/// The state machine never talks to a terminal directly; every prompt
/// goes through this trait so any binding (or a test script) can drive it.
pub trait ReviewUi {
    /// Display a line of feedback.
    fn show(&mut self, text: &str);

    /// Ask the learner to pick one option; returns the chosen index.
    fn select_option(&mut self, prompt: &str, options: &[String]) -> usize;

    /// Read a free-text attempt. Empty input is permitted.
    fn read_text(&mut self, prompt: &str) -> String;

    /// Ask a yes/no question.
    fn confirm(&mut self, prompt: &str) -> bool;

    /// Read an integer rating within `min..=max`.
    fn read_rating(&mut self, prompt: &str, min: u8, max: u8) -> u8;
}

/// Stdin/stdout implementation of [`ReviewUi`].
#[derive(Debug, Default)]
pub struct TerminalUi;

impl TerminalUi {
    pub fn new() -> Self {
        Self
    }

    fn read_line(prompt: &str) -> String {
        use std::io::Write;
        print!("{prompt} ");
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_err() {
            return String::new();
        }
        line.trim().to_string()
    }
}

impl ReviewUi for TerminalUi {
    fn show(&mut self, text: &str) {
        println!("{text}");
    }

    fn select_option(&mut self, prompt: &str, options: &[String]) -> usize {
        println!("{prompt}");
        for (i, option) in options.iter().enumerate() {
            println!("  {}. {}", i + 1, option);
        }
        loop {
            let line = Self::read_line("Choice:");
            if let Ok(n) = line.parse::<usize>() {
                if n >= 1 && n <= options.len() {
                    return n - 1;
                }
            }
            println!("Enter a number between 1 and {}.", options.len());
        }
    }

    fn read_text(&mut self, prompt: &str) -> String {
        println!("{prompt}");
        Self::read_line(">")
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        loop {
            let line = Self::read_line(&format!("{prompt} [y/n]")).to_lowercase();
            match line.as_str() {
                "y" | "yes" => return true,
                "n" | "no" => return false,
                _ => println!("Enter y or n."),
            }
        }
    }

    fn read_rating(&mut self, prompt: &str, min: u8, max: u8) -> u8 {
        loop {
            let line = Self::read_line(&format!("{prompt} [{min}-{max}]"));
            if let Ok(n) = line.parse::<u8>() {
                if n >= min && n <= max {
                    return n;
                }
            }
            println!("Enter a number between {min} and {max}.");
        }
    }
}

/// Summary of one submitted review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewedItem {
    /// Item identifier.
    pub item_id: String,
    /// Quality rating submitted.
    pub quality: u8,
    /// Steps that produced a result.
    pub steps_completed: usize,
    /// Days until the next scheduled review.
    pub next_interval_days: f64,
    /// Updated mastery label.
    pub mastery_state: String,
}

/// One line of the optional JSON report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    /// The wire payload that was sent.
    pub submission: WireSubmission,
    /// The outcome the gateway returned.
    pub outcome: ReviewOutcome,
}

/// Output format for the review command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Submitted reviews, in queue order.
    pub reviewed: Vec<ReviewedItem>,
    /// Total count of reviews submitted.
    pub count: usize,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReviewOutput {
    /// Create a successful output.
    pub fn success(reviewed: Vec<ReviewedItem>) -> Self {
        let count = reviewed.len();
        Self {
            success: true,
            reviewed,
            count,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            reviewed: vec![],
            count: 0,
            error: Some(error.into()),
        }
    }

    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        if !self.success {
            return format!(
                "Review failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            );
        }

        if self.reviewed.is_empty() {
            return "Nothing to review.".to_string();
        }

        let mut lines = vec![format!("Reviewed {} item(s):", self.count), String::new()];
        lines.push(format!(
            "{:<24}  {:<8}  {:<10}  {}",
            "ITEM", "QUALITY", "NEXT (d)", "MASTERY"
        ));
        lines.push("-".repeat(60));
        for item in &self.reviewed {
            lines.push(format!(
                "{:<24}  {:<8}  {:<10.1}  {}",
                item.item_id, item.quality, item.next_interval_days, item.mastery_state
            ));
        }
        lines.join("\n")
    }
}

/// The review command implementation.
pub struct ReviewCommand<G> {
    submitter: Submitter<G>,
    config: Config,
}

impl<G: ReviewGateway> ReviewCommand<G> {
    /// Create a review command over a gateway and loaded configuration.
    pub fn new(gateway: G, config: Config) -> Self {
        Self {
            submitter: Submitter::new(gateway),
            config,
        }
    }

    /// Run the review command against a queue file.
    pub fn run(
        &self,
        queue_path: &Path,
        ui: &mut dyn ReviewUi,
        options: &ReviewOptions,
    ) -> ReviewOutput {
        let items = match self.load_queue(queue_path) {
            Ok(items) => items,
            Err(e) => return ReviewOutput::failure(format!("Failed to load queue: {}", e)),
        };
        self.review_items(items, ui, options)
    }

    /// Review already-loaded items.
    pub fn review_items(
        &self,
        items: Vec<ReviewItem>,
        ui: &mut dyn ReviewUi,
        options: &ReviewOptions,
    ) -> ReviewOutput {
        let limit = options
            .limit
            .unwrap_or(self.config.review.max_items_per_run) as usize;

        let mut reviewed = Vec::new();
        let mut report = Vec::new();
        for item in items.into_iter().take(limit) {
            match self.review_one(item, ui) {
                Ok((summary, entry)) => {
                    reviewed.push(summary);
                    report.push(entry);
                }
                Err(e) => return ReviewOutput::failure(format!("Review aborted: {}", e)),
            }
        }

        if let Some(path) = &options.out {
            if let Err(e) = self.write_report(path, &report) {
                return ReviewOutput::failure(format!("Failed to write report: {}", e));
            }
        }

        ReviewOutput::success(reviewed)
    }

    fn load_queue(&self, path: &Path) -> Result<Vec<ReviewItem>> {
        let content = fs::read_to_string(path).map_err(|e| RehearseError::config(e.to_string()))?;
        parse_queue(&content)
    }

    fn write_report(&self, path: &Path, report: &[ReportEntry]) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        fs::write(path, json).map_err(|e| RehearseError::config(e.to_string()))
    }

    /// Drive one item through its steps and submit the rating.
    fn review_one(
        &self,
        item: ReviewItem,
        ui: &mut dyn ReviewUi,
    ) -> Result<(ReviewedItem, ReportEntry)> {
        let mut session = ReviewSession::new(item)?;
        ui.show(&format!(
            "--- {} ({} step(s)) ---",
            session.item().concept_text,
            session.step_count()
        ));

        loop {
            match session.current_step() {
                StepKind::Mcq => self.run_mcq(&mut session, ui)?,
                StepKind::Recall | StepKind::Apply => self.run_attempt(&mut session, ui)?,
                StepKind::Confusion => {
                    self.run_confusion(&mut session, ui)?;
                    break;
                }
                StepKind::Rate => break,
            }
            session.advance()?;
        }

        let confidence_after =
            ui.read_rating("Confidence after review", CONFIDENCE_MIN, CONFIDENCE_MAX);
        let quality = ui.read_rating(
            "Quality (1=Again 2=Hard 3=Good 4=Easy)",
            QUALITY_MIN,
            QUALITY_MAX,
        );

        let payload = session.compose_submission(quality, confidence_after)?;
        let wire = submission_to_wire(session.item_id(), &payload);
        let outcome = self.submit_with_retries(&mut session, quality, confidence_after, ui)?;

        let summary = ReviewedItem {
            item_id: session.item_id().to_string(),
            quality,
            steps_completed: session.results().len(),
            next_interval_days: outcome.new_interval_days,
            mastery_state: format!("{:?}", outcome.new_mastery_state).to_lowercase(),
        };
        let entry = ReportEntry {
            submission: wire,
            outcome,
        };
        Ok((summary, entry))
    }

    /// Submit, offering retries for gateway failures only.
    fn submit_with_retries(
        &self,
        session: &mut ReviewSession,
        quality: u8,
        confidence_after: u8,
        ui: &mut dyn ReviewUi,
    ) -> Result<ReviewOutcome> {
        let mut result = self.submitter.submit(session, quality, confidence_after);
        loop {
            match result {
                Ok(outcome) => return Ok(outcome),
                Err(err) if err.is_retryable() => {
                    ui.show(&format!("Submission failed: {}", err));
                    if !ui.confirm("Retry submission?") {
                        return Err(err);
                    }
                    result = self.submitter.retry(session);
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn run_mcq(&self, session: &mut ReviewSession, ui: &mut dyn ReviewUi) -> Result<()> {
        let (question, options) = {
            let step = session.mcq_step()?;
            (step.question().to_string(), step.options().to_vec())
        };
        let selected = ui.select_option(&question, &options);
        let feedback = session.submit_mcq_answer(selected)?;
        if feedback.correct {
            ui.show("Correct!");
        } else {
            ui.show(&format!(
                "Incorrect. The answer was: {}",
                options
                    .get(feedback.correct_index)
                    .map(String::as_str)
                    .unwrap_or("?")
            ));
        }
        if let Some(explanation) = &feedback.explanation {
            ui.show(explanation);
        }
        Ok(())
    }

    /// Recall and application steps share the attempt/reveal/give-up flow;
    /// application additionally offers its hint first.
    fn run_attempt(&self, session: &mut ReviewSession, ui: &mut dyn ReviewUi) -> Result<()> {
        let question = match session.current_step() {
            StepKind::Recall => session.recall_step()?.question().to_string(),
            _ => {
                let step = session.apply_step()?;
                let question = step.question().to_string();
                if step.hint().is_some() && ui.confirm("Need a hint?") {
                    if let Some(hint) = session.request_hint().map(str::to_string) {
                        ui.show(&format!("Hint: {}", hint));
                    }
                }
                question
            }
        };

        let attempt = ui.read_text(&question);
        let revealed = if attempt.is_empty() && ui.confirm("Give up on this one?") {
            session.give_up()?
        } else {
            session.set_answer(attempt)?;
            session.reveal_answer()?
        };

        if let Some(answer) = &revealed.answer {
            ui.show(&format!("Answer: {}", answer));
        }
        if let Some(insight) = &revealed.key_insight {
            ui.show(&format!("Key insight: {}", insight));
        }
        Ok(())
    }

    fn run_confusion(&self, session: &mut ReviewSession, ui: &mut dyn ReviewUi) -> Result<()> {
        let before = ui.read_rating("Confidence before", CONFIDENCE_MIN, CONFIDENCE_MAX);
        session.set_confidence_before(before)?;

        let view = session.reveal_clarification()?;
        if let Some(clarification) = &view.clarification_answer {
            ui.show(clarification);
        }
        if let Some(check) = &view.follow_up_check {
            ui.show(&format!("Check yourself: {}", check));
        }
        if !view.related_concepts.is_empty() {
            ui.show(&format!("Related: {}", view.related_concepts.join(", ")));
        }
        Ok(())
    }
}
