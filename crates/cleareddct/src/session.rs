//! One interaction cycle over both stores.
//!
//! A [`Session`] loads the flight plan store and the outbox fresh from disk,
//! performs whatever the front end asks for, and persists every change
//! immediately. Front ends create one session per user action.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::mail::{deliver, Mailer, OutgoingMail};
use crate::message::{format_message, format_message_str, MessageType};
use crate::plan::{FieldSource, RawFlightPlan};
use crate::store::{ExportHeader, FlightPlanStore, OutboxStore};

/// Both stores, loaded for a single interaction.
#[derive(Debug)]
pub struct Session {
    config: Config,
    plans: FlightPlanStore,
    outbox: OutboxStore,
}

impl Session {
    /// Load both stores from the locations named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if either store file exists but cannot be read or
    /// parsed.
    pub fn open(config: Config) -> Result<Self> {
        let plans = FlightPlanStore::open(config.flight_plans_path())?;
        let outbox = OutboxStore::open(config.outbox_path())?;
        Ok(Self {
            config,
            plans,
            outbox,
        })
    }

    /// The configuration this session was opened with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The flight plan store.
    #[must_use]
    pub fn plans(&self) -> &FlightPlanStore {
        &self.plans
    }

    /// Mutable access to the flight plan store.
    pub fn plans_mut(&mut self) -> &mut FlightPlanStore {
        &mut self.plans
    }

    /// The outbox.
    #[must_use]
    pub fn outbox(&self) -> &OutboxStore {
        &self.outbox
    }

    /// Mutable access to the outbox.
    pub fn outbox_mut(&mut self) -> &mut OutboxStore {
        &mut self.outbox
    }

    /// Look up a stored plan record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlanNotFound`] if no plan is stored under `key`.
    pub fn plan(&self, key: &str) -> Result<&RawFlightPlan> {
        self.plans.get(key).ok_or_else(|| Error::plan_not_found(key))
    }

    /// Format a message from the stored plan `key` and add it to the outbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the plan does not exist, the type is unknown, the
    /// stored record lacks an item the message needs, or the outbox cannot
    /// be written.
    pub fn generate_message(&mut self, key: &str, kind: &str, addendum: &str) -> Result<String> {
        let kind: MessageType = kind.parse()?;
        let message = format_message(self.plan(key)?, kind, addendum)?;
        self.outbox.append(message.clone())?;
        info!("Added {kind} for {key} to outbox");
        Ok(message)
    }

    /// Format a message from any record and add it to the outbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is unknown, the record lacks an item,
    /// or the outbox cannot be written.
    pub fn generate_message_from<R: FieldSource + ?Sized>(
        &mut self,
        record: &R,
        kind: &str,
        addendum: &str,
    ) -> Result<String> {
        let message = format_message_str(record, kind, addendum)?;
        self.outbox.append(message.clone())?;
        Ok(message)
    }

    /// Write the outbox export, to `output` or the configured export file.
    ///
    /// Returns the path written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn export(&self, header: &ExportHeader, output: Option<&Path>) -> Result<PathBuf> {
        let path = output.map_or_else(|| self.config.export_path(), Path::to_path_buf);
        self.outbox.export_to_file(header, &path)?;
        Ok(path)
    }

    /// Email the exported outbox.
    ///
    /// The configured export file is sent as it is. If it does not exist yet,
    /// or `fresh` is set, the outbox is exported with `header` first.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad addresses, a transport error if
    /// delivery fails, or a storage error if the export cannot be produced.
    pub async fn mail_export<M: Mailer + ?Sized>(
        &self,
        mailer: &M,
        to: &str,
        from: Option<&str>,
        subject: Option<&str>,
        header: &ExportHeader,
        fresh: bool,
    ) -> Result<()> {
        let mut mail = OutgoingMail {
            from: from.unwrap_or(&self.config.mail.from).to_string(),
            to: to.to_string(),
            subject: subject.unwrap_or(&self.config.mail.subject).to_string(),
            body: String::new(),
        };
        mail.validate()?;

        let path = self.config.export_path();
        mail.body = match std::fs::read_to_string(&path) {
            Ok(body) if !fresh => body,
            Ok(_) => self.outbox.export_to_file(header, &path)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!("No export at {}, exporting now", path.display());
                self.outbox.export_to_file(header, &path)?
            }
            Err(source) => return Err(Error::StoreRead { path, source }),
        };
        deliver(mailer, &mail).await
    }
}
