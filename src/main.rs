//! Rehearse - spaced-repetition review session engine for Founder OS.
//!
//! CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use rehearse::cli::{
    PlanCommand, PlanOptions, ReviewCommand, ReviewOptions, TerminalUi,
};
use rehearse::config::{Config, GatewayConfig};
use rehearse::gateway::InMemoryGateway;

/// Rehearse - spaced-repetition review sessions at the terminal
#[derive(Parser)]
#[command(name = "rehearse")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the planned steps for each item in a review queue
    Plan {
        /// Path to the review queue JSON file
        queue: PathBuf,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Review queued items interactively and submit ratings
    Review {
        /// Path to the review queue JSON file
        queue: PathBuf,
        /// Write submitted payloads and outcomes to this file
        #[arg(long)]
        out: Option<PathBuf>,
        /// Maximum number of items to review this run
        #[arg(long, short)]
        limit: Option<u32>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::load();

    match cli.command {
        Commands::Plan { queue, json, quiet } => {
            let options = PlanOptions { json, quiet };
            let output = PlanCommand::new().run(&queue, &options);
            if !quiet {
                if json {
                    match serde_json::to_string_pretty(&output) {
                        Ok(rendered) => println!("{rendered}"),
                        Err(e) => eprintln!("Failed to render output: {e}"),
                    }
                } else {
                    println!("{}", output.format_text());
                }
            }
            exit_code(output.success)
        }

        Commands::Review {
            queue,
            out,
            limit,
            json,
            quiet,
        } => {
            if !GatewayConfig::is_valid_mode(&config.gateway.mode) {
                eprintln!("Unknown gateway mode '{}'.", config.gateway.mode);
                return ExitCode::FAILURE;
            }
            let options = ReviewOptions {
                json,
                quiet,
                limit,
                out,
            };
            let command = ReviewCommand::new(InMemoryGateway::new(), config);
            let mut ui = TerminalUi::new();
            let output = command.run(&queue, &mut ui, &options);
            if !quiet {
                if json {
                    match serde_json::to_string_pretty(&output) {
                        Ok(rendered) => println!("{rendered}"),
                        Err(e) => eprintln!("Failed to render output: {e}"),
                    }
                } else {
                    println!("{}", output.format_text());
                }
            }
            exit_code(output.success)
        }
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
