//! Email export of the outbox.
//!
//! Messages are built with `lettre`, which takes care of header encoding
//! and the `Date`/`Message-ID` headers. Two transports deliver them: an
//! authenticated STARTTLS submission to an outbound relay ([`SmtpRelay`],
//! the default) and a local sendmail-compatible program
//! ([`SendmailTransport`]). Every failure on either path is folded into
//! [`Error::Transport`] by [`deliver`] so a broken mail setup is reported
//! and never takes anything else down with it.

use std::fmt;
use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use regex::Regex;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::config::{MailConfig, MailTransport};
use crate::error::{Error, Result};

/// Check whether `address` looks like a single mailbox (`local@domain`).
#[must_use]
pub fn is_valid_address(address: &str) -> bool {
    static ADDRESS: OnceLock<Regex> = OnceLock::new();
    ADDRESS
        .get_or_init(|| {
            Regex::new(r"^[^@\s<>,;]+@[^@\s<>,;]+\.[^@\s<>,;]+$").expect("Invalid regex pattern")
        })
        .is_match(address)
}

/// A plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub body: String,
}

impl OutgoingMail {
    /// Check addresses and headers before handing the mail to a transport.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed address or a header
    /// containing a line break.
    pub fn validate(&self) -> Result<()> {
        for (name, address) in [("recipient", &self.to), ("sender", &self.from)] {
            if !is_valid_address(address) {
                return Err(Error::validation(format!(
                    "{name} address '{address}' is not a valid email address"
                )));
            }
        }
        if self.subject.contains(&['\r', '\n'][..]) {
            return Err(Error::validation("subject must be a single line"));
        }
        Ok(())
    }

    /// Build the MIME message: a single `text/plain; charset=utf-8` part.
    ///
    /// # Errors
    ///
    /// Returns a validation error if an address does not parse as a mailbox.
    pub fn to_message(&self) -> Result<Message> {
        let from: Mailbox = self.from.parse().map_err(|e| {
            Error::validation(format!("sender address '{}': {e}", self.from))
        })?;
        let to: Mailbox = self
            .to
            .parse()
            .map_err(|e| Error::validation(format!("recipient address '{}': {e}", self.to)))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(self.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(self.body.clone())
            .map_err(|e| Error::validation(format!("cannot build message: {e}")))
    }
}

/// Something that can deliver an [`OutgoingMail`].
#[async_trait]
pub trait Mailer: Send + Sync + fmt::Debug {
    /// Attempt delivery.
    ///
    /// # Errors
    ///
    /// Returns an error if the mail could not be handed off.
    async fn send(&self, mail: &OutgoingMail) -> Result<()>;
}

/// Deliver `mail`, turning every failure into [`Error::Transport`].
///
/// # Errors
///
/// Returns a validation error for a malformed mail and a transport error
/// if delivery fails.
pub async fn deliver<M: Mailer + ?Sized>(mailer: &M, mail: &OutgoingMail) -> Result<()> {
    mail.validate()?;

    match mailer.send(mail).await {
        Ok(()) => {
            info!("Mailed outbox to {}", mail.to);
            Ok(())
        }
        Err(err) => {
            error!("Failed to mail outbox to {}: {err}", mail.to);
            match err {
                Error::Transport { .. } => Err(err),
                other => Err(Error::transport_with(
                    format!("delivery to {} failed", mail.to),
                    other,
                )),
            }
        }
    }
}

/// Pick the transport named by the `[mail]` configuration section.
#[must_use]
pub fn mailer_from_config(config: &MailConfig) -> Box<dyn Mailer> {
    match config.transport {
        MailTransport::Smtp => Box::new(SmtpRelay::from_config(config)),
        MailTransport::Sendmail => Box::new(SendmailTransport::from_config(config)),
    }
}

/// Delivers mail to an outbound relay over STARTTLS, logging in first.
#[derive(Clone)]
pub struct SmtpRelay {
    host: String,
    port: u16,
    username: String,
    password: String,
    timeout: Duration,
}

impl fmt::Debug for SmtpRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpRelay")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl SmtpRelay {
    /// Create an unauthenticated relay at `host:port`.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            username: String::new(),
            password: String::new(),
            timeout,
        }
    }

    /// Log in with `username` and `password` before submitting.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Create a relay from the `[mail]` configuration section.
    #[must_use]
    pub fn from_config(config: &MailConfig) -> Self {
        Self::new(
            config.smtp_host.clone(),
            config.smtp_port,
            Duration::from_secs(config.timeout_secs),
        )
        .with_credentials(config.smtp_login(), config.smtp_password.clone())
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .map_err(|e| Error::transport_with(format!("cannot use relay {}", self.host), e))?
            .port(self.port);

        if self.password.is_empty() {
            warn!("No SMTP password configured, submitting to {} without login", self.host);
        } else {
            builder = builder.credentials(Credentials::new(
                self.username.clone(),
                self.password.clone(),
            ));
        }
        Ok(builder.build())
    }
}

#[async_trait]
impl Mailer for SmtpRelay {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        let message = mail.to_message()?;
        let transport = self.transport()?;
        debug!("Submitting to {}:{} as {}", self.host, self.port, self.username);

        let response = tokio::time::timeout(self.timeout, transport.send(message))
            .await
            .map_err(|e| {
                Error::transport_with(
                    format!("relay {}:{} did not answer in time", self.host, self.port),
                    e,
                )
            })?
            .map_err(|e| {
                Error::transport_with(format!("relay {}:{}", self.host, self.port), e)
            })?;
        debug!("Relay answered {}", response.code());
        Ok(())
    }
}

/// Delivers mail by piping it into a sendmail-compatible program.
#[derive(Debug, Clone)]
pub struct SendmailTransport {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl SendmailTransport {
    /// Create a transport running `program` with `args`.
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// Create a transport from the `[mail]` configuration section.
    #[must_use]
    pub fn from_config(config: &MailConfig) -> Self {
        Self::new(
            config.sendmail_command.clone(),
            config.sendmail_args.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl Mailer for SendmailTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        let message = mail.to_message()?.formatted();
        debug!("Running {} {:?}", self.program, self.args);
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::transport_with(format!("failed to start {}", self.program), e))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::transport(format!("{} has no stdin", self.program)))?;

        let run = async move {
            stdin.write_all(&message).await?;
            stdin.shutdown().await?;
            drop(stdin);
            child.wait_with_output().await
        };

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|e| {
                Error::transport_with(
                    format!(
                        "{} did not finish within {}ms",
                        self.program,
                        self.timeout.as_millis()
                    ),
                    e,
                )
            })?
            .map_err(|e| Error::transport_with(format!("talking to {}", self.program), e))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(Error::transport(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )))
        }
    }
}
