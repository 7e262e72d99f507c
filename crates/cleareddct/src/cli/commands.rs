//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::builder::PossibleValuesParser;
use clap::{Args, Subcommand};

use crate::plan::{Field, FlightPlan, FLIGHT_RULES, FLIGHT_TYPES, SSR_MODES, WAKE_CATEGORIES};
use crate::store::ExportHeader;

/// Flight plan commands.
#[derive(Debug, Subcommand)]
pub enum PlanCommand {
    /// Create a flight plan, replacing any plan with the same identification
    Create {
        /// Aircraft identification (Item 7)
        #[arg(long)]
        id: String,

        #[command(flatten)]
        fields: PlanFieldArgs,
    },

    /// Edit a stored flight plan
    Edit {
        /// Identification of the plan to edit
        key: String,

        /// New aircraft identification (renames the plan)
        #[arg(long)]
        id: Option<String>,

        #[command(flatten)]
        fields: PlanFieldArgs,
    },

    /// Delete a stored flight plan
    Delete {
        /// Identification of the plan to delete
        key: String,
    },

    /// List stored flight plans
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show one flight plan
    Show {
        /// Identification of the plan to show
        key: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Flight plan items other than the identification.
///
/// Every option is optional; unset options leave the item unchanged.
#[derive(Debug, Default, Args)]
pub struct PlanFieldArgs {
    /// Flight rules (Item 8)
    #[arg(long, value_parser = PossibleValuesParser::new(FLIGHT_RULES.iter().copied()))]
    pub rules: Option<String>,

    /// Type of flight (Item 8)
    #[arg(long, value_parser = PossibleValuesParser::new(FLIGHT_TYPES.iter().copied()))]
    pub flight_type: Option<String>,

    /// Type of aircraft (Item 9)
    #[arg(long)]
    pub aircraft: Option<String>,

    /// Wake turbulence category (Item 9)
    #[arg(long, value_parser = PossibleValuesParser::new(WAKE_CATEGORIES.iter().copied()))]
    pub wake: Option<String>,

    /// Equipment (Item 10)
    #[arg(long)]
    pub equipment: Option<String>,

    /// SSR equipment (Item 10)
    #[arg(long, value_parser = PossibleValuesParser::new(SSR_MODES.iter().copied()))]
    pub ssr: Option<String>,

    /// Aerodrome of departure (Item 13)
    #[arg(long)]
    pub departure: Option<String>,

    /// Estimated off-block time, HHMM (Item 13)
    #[arg(long)]
    pub eobt: Option<String>,

    /// Cruising speed (Item 15)
    #[arg(long)]
    pub speed: Option<String>,

    /// Cruising level (Item 15)
    #[arg(long)]
    pub level: Option<String>,

    /// Route (Item 15)
    #[arg(long)]
    pub route: Option<String>,

    /// Destination aerodrome (Item 16)
    #[arg(long)]
    pub destination: Option<String>,

    /// Total estimated elapsed time, HHMM (Item 16)
    #[arg(long)]
    pub eet: Option<String>,

    /// First alternate aerodrome (Item 16)
    #[arg(long)]
    pub alt1: Option<String>,

    /// Second alternate aerodrome (Item 16)
    #[arg(long)]
    pub alt2: Option<String>,

    /// Other information (Item 18)
    #[arg(long)]
    pub remarks: Option<String>,

    /// Endurance, HHMM (Item 19)
    #[arg(long)]
    pub endurance: Option<String>,

    /// Persons on board (Item 19)
    #[arg(long)]
    pub pob: Option<String>,

    /// Aircraft colour and markings (Item 19)
    #[arg(long)]
    pub color: Option<String>,

    /// Pilot in command (Item 19)
    #[arg(long)]
    pub pilot: Option<String>,
}

impl PlanFieldArgs {
    /// The items that were given on the command line.
    #[must_use]
    pub fn assignments(&self) -> Vec<(Field, &str)> {
        [
            (Field::FlightRules, &self.rules),
            (Field::FlightType, &self.flight_type),
            (Field::AircraftType, &self.aircraft),
            (Field::WakeCategory, &self.wake),
            (Field::Equipment, &self.equipment),
            (Field::SsrEquipment, &self.ssr),
            (Field::Departure, &self.departure),
            (Field::Eobt, &self.eobt),
            (Field::CruiseSpeed, &self.speed),
            (Field::CruiseLevel, &self.level),
            (Field::Route, &self.route),
            (Field::Destination, &self.destination),
            (Field::Eet, &self.eet),
            (Field::FirstAlternate, &self.alt1),
            (Field::SecondAlternate, &self.alt2),
            (Field::OtherInformation, &self.remarks),
            (Field::Endurance, &self.endurance),
            (Field::PersonsOnBoard, &self.pob),
            (Field::Markings, &self.color),
            (Field::Pilot, &self.pilot),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }

    /// Apply the given items to `plan`.
    pub fn apply(&self, plan: &mut FlightPlan) {
        for (field, value) in self.assignments() {
            plan.set(field, value);
        }
    }
}

/// Message generation arguments.
#[derive(Debug, Args)]
pub struct MessageCommand {
    /// Identification of the stored plan to format
    #[arg(required_unless_present = "record")]
    pub key: Option<String>,

    /// Message type (FPL, DLA, DEP, ARR, CNL, CHG, SVC, ALR, DET, INC)
    #[arg(short = 't', long = "type", default_value = "FPL")]
    pub kind: String,

    /// Additional information appended to short messages
    #[arg(short, long)]
    pub info: Option<String>,

    /// Format a flight plan record read from a JSON file instead
    #[arg(long, value_name = "FILE", conflicts_with = "key")]
    pub record: Option<PathBuf>,

    /// Print the message without adding it to the outbox
    #[arg(long)]
    pub dry_run: bool,
}

/// Outbox commands.
#[derive(Debug, Subcommand)]
pub enum OutboxCommand {
    /// List messages in the outbox
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Remove all messages from the outbox
    Clear,

    /// Export the outbox to a text file
    Export {
        #[command(flatten)]
        header: ExportHeaderArgs,

        /// Write to this file instead of the configured export file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Email the exported outbox
    Mail {
        /// Recipient address
        #[arg(long)]
        to: String,

        /// Sender address (defaults to mail.from)
        #[arg(long)]
        from: Option<String>,

        /// Subject line (defaults to mail.subject)
        #[arg(long)]
        subject: Option<String>,

        /// Export the outbox again before mailing
        #[arg(long)]
        fresh: bool,

        #[command(flatten)]
        header: ExportHeaderArgs,
    },
}

/// Overrides for the export header lines.
#[derive(Debug, Default, Args)]
pub struct ExportHeaderArgs {
    /// Sender name (first header line)
    #[arg(long)]
    pub sender_name: Option<String>,

    /// Message originator (second header line)
    #[arg(long)]
    pub originator: Option<String>,

    /// Lesson number (third header line)
    #[arg(long)]
    pub lesson: Option<String>,
}

impl ExportHeaderArgs {
    /// Merge these overrides onto the configured header.
    #[must_use]
    pub fn resolve(&self, defaults: &ExportHeader) -> ExportHeader {
        ExportHeader {
            sender_name: self
                .sender_name
                .clone()
                .unwrap_or_else(|| defaults.sender_name.clone()),
            originator: self
                .originator
                .clone()
                .unwrap_or_else(|| defaults.originator.clone()),
            lesson: self
                .lesson
                .clone()
                .unwrap_or_else(|| defaults.lesson.clone()),
        }
    }
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
