//! `cleareddct` - ICAO flight plan drafting and ATS message outbox
//!
//! This library keeps a local store of flight plans, formats FPL and short
//! ATS messages (DLA, DEP, ARR, CNL, CHG, SVC, ALR, DET, INC) from them, and
//! collects the results in an outbox that can be exported or emailed.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod mail;
pub mod message;
pub mod plan;
pub mod session;
pub mod store;

pub use config::{Config, MailTransport};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use mail::{mailer_from_config, Mailer, OutgoingMail, SendmailTransport, SmtpRelay};
pub use message::{format_message, MessageType};
pub use plan::{Field, FieldSource, FlightPlan, RawFlightPlan};
pub use session::Session;
pub use store::{ExportHeader, FlightPlanStore, OutboxStore};
