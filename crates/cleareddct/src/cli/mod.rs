//! Command-line interface for cleareddct.
//!
//! This module provides the CLI structure for the `cleareddct` binary. Each
//! invocation is one interaction: both stores are loaded, the command runs,
//! and any change is written back before the process exits.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, ExportHeaderArgs, MessageCommand, OutboxCommand, PlanCommand, PlanFieldArgs,
};

/// cleareddct - Draft ICAO flight plans and ATS messages
///
/// Keeps a local store of flight plans, formats FPL and short ATS messages
/// from them, and collects the results in an outbox that can be exported
/// or emailed.
#[derive(Debug, Parser)]
#[command(name = "cleareddct")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create, edit, delete and list flight plans
    #[command(subcommand)]
    Plan(PlanCommand),

    /// Generate a message from a flight plan and add it to the outbox
    Message(MessageCommand),

    /// Inspect, clear, export or email the outbox
    #[command(subcommand)]
    Outbox(OutboxCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
