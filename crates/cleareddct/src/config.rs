//! Configuration management for cleareddct.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mail::is_valid_address;
use crate::store::ExportHeader;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data and config directory name.
const DATA_DIR_NAME: &str = "cleareddct";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `CLEAREDDCT_`)
/// 2. TOML config file at `~/.config/cleareddct/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Default export header.
    pub export: ExportHeader,
    /// Mail configuration.
    pub mail: MailConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the store files.
    /// Defaults to `~/.local/share/cleareddct`
    pub data_dir: Option<PathBuf>,
    /// Flight plan store file name, relative to `data_dir`.
    pub flight_plans_file: String,
    /// Outbox store file name, relative to `data_dir`.
    pub outbox_file: String,
    /// Outbox export file name, relative to `data_dir`.
    pub export_file: String,
}

/// How exported outboxes are delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailTransport {
    /// Authenticated STARTTLS submission to `smtp_host`.
    #[default]
    Smtp,
    /// Pipe into a local sendmail-compatible program.
    Sendmail,
}

/// Mail-related configuration.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// Sender address. Must be set before mailing.
    pub from: String,
    /// Subject line of exported outbox mails.
    pub subject: String,
    /// Which transport delivers the mail.
    pub transport: MailTransport,
    /// Outbound relay.
    pub smtp_host: String,
    /// Submission port on the relay (STARTTLS).
    pub smtp_port: u16,
    /// Login name on the relay. Empty means the sender address.
    pub smtp_username: String,
    /// Password on the relay. Never written back out.
    #[serde(skip_serializing)]
    pub smtp_password: String,
    /// Sendmail-compatible program used by the sendmail transport.
    pub sendmail_command: String,
    /// Arguments passed to the sendmail program.
    pub sendmail_args: Vec<String>,
    /// Seconds to wait for either transport.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("from", &self.from)
            .field("subject", &self.subject)
            .field("transport", &self.transport)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password_set", &!self.smtp_password.is_empty())
            .field("sendmail_command", &self.sendmail_command)
            .field("sendmail_args", &self.sendmail_args)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl MailConfig {
    /// The relay login name: `smtp_username`, or the sender address.
    #[must_use]
    pub fn smtp_login(&self) -> &str {
        if self.smtp_username.is_empty() {
            &self.from
        } else {
            &self.smtp_username
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None, // Will be resolved to default at runtime
            flight_plans_file: "flight_plans.json".to_string(),
            outbox_file: "outbox.json".to_string(),
            export_file: "outbox_export.txt".to_string(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from: String::new(),
            subject: "ClearedDCT Exported Outbox".to_string(),
            transport: MailTransport::Smtp,
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            sendmail_command: "sendmail".to_string(),
            sendmail_args: vec!["-t".to_string(), "-i".to_string()],
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("CLEAREDDCT_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("flight_plans_file", &self.storage.flight_plans_file),
            ("outbox_file", &self.storage.outbox_file),
            ("export_file", &self.storage.export_file),
        ] {
            if value.trim().is_empty() {
                return Err(Error::ConfigValidation {
                    message: format!("storage.{name} must not be empty"),
                });
            }
        }

        if self.storage.flight_plans_file == self.storage.outbox_file {
            return Err(Error::ConfigValidation {
                message: "flight_plans_file and outbox_file must differ".to_string(),
            });
        }

        if self.mail.timeout_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "mail.timeout_secs must be greater than 0".to_string(),
            });
        }

        match self.mail.transport {
            MailTransport::Smtp => {
                if self.mail.smtp_host.trim().is_empty() {
                    return Err(Error::ConfigValidation {
                        message: "mail.smtp_host must not be empty".to_string(),
                    });
                }
                if self.mail.smtp_port == 0 {
                    return Err(Error::ConfigValidation {
                        message: "mail.smtp_port must not be 0".to_string(),
                    });
                }
            }
            MailTransport::Sendmail => {
                if self.mail.sendmail_command.trim().is_empty() {
                    return Err(Error::ConfigValidation {
                        message: "mail.sendmail_command must not be empty".to_string(),
                    });
                }
            }
        }

        if !self.mail.from.is_empty() && !is_valid_address(&self.mail.from) {
            return Err(Error::ConfigValidation {
                message: format!("mail.from is not a valid address: {}", self.mail.from),
            });
        }

        Ok(())
    }

    /// Get the data directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Path to the flight plan store.
    #[must_use]
    pub fn flight_plans_path(&self) -> PathBuf {
        self.data_dir().join(&self.storage.flight_plans_file)
    }

    /// Path to the outbox store.
    #[must_use]
    pub fn outbox_path(&self) -> PathBuf {
        self.data_dir().join(&self.storage.outbox_file)
    }

    /// Path to the outbox export file.
    #[must_use]
    pub fn export_path(&self) -> PathBuf {
        self.data_dir().join(&self.storage.export_file)
    }

    /// Get the mail timeout as a Duration.
    #[must_use]
    pub fn mail_timeout(&self) -> Duration {
        Duration::from_secs(self.mail.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.data_dir.is_none());
        assert_eq!(config.storage.flight_plans_file, "flight_plans.json");
        assert_eq!(config.storage.outbox_file, "outbox.json");
        assert_eq!(config.storage.export_file, "outbox_export.txt");
        assert_eq!(config.export, ExportHeader::default());
    }

    #[test]
    fn test_default_mail_config() {
        let mail = MailConfig::default();

        assert!(mail.from.is_empty());
        assert_eq!(mail.subject, "ClearedDCT Exported Outbox");
        assert_eq!(mail.transport, MailTransport::Smtp);
        assert_eq!(mail.smtp_host, "smtp.gmail.com");
        assert_eq!(mail.smtp_port, 587);
        assert_eq!(mail.sendmail_command, "sendmail");
        assert_eq!(mail.sendmail_args, vec!["-t", "-i"]);
        assert_eq!(mail.timeout_secs, 30);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_file_name() {
        let mut config = Config::default();
        config.storage.outbox_file = " ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("outbox_file"));
    }

    #[test]
    fn test_validate_same_store_files() {
        let mut config = Config::default();
        config.storage.outbox_file = config.storage.flight_plans_file.clone();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.mail.timeout_secs = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("timeout_secs"));
    }

    #[test]
    fn test_validate_empty_sendmail_command() {
        let mut config = Config::default();
        config.mail.sendmail_command = String::new();
        assert!(config.validate().is_ok());

        config.mail.transport = MailTransport::Sendmail;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_smtp_relay() {
        let mut config = Config::default();
        config.mail.smtp_port = 0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("smtp_port"));

        config.mail.smtp_port = 587;
        config.mail.smtp_host = " ".to_string();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("smtp_host"));
    }

    #[test]
    fn test_smtp_login_defaults_to_sender() {
        let mut mail = MailConfig {
            from: "ops@example.com".to_string(),
            ..MailConfig::default()
        };
        assert_eq!(mail.smtp_login(), "ops@example.com");

        mail.smtp_username = "relay-user".to_string();
        assert_eq!(mail.smtp_login(), "relay-user");
    }

    #[test]
    fn test_smtp_password_is_never_shown() {
        let mail = MailConfig {
            smtp_password: "hunter2".to_string(),
            ..MailConfig::default()
        };
        assert!(!format!("{mail:?}").contains("hunter2"));
        assert!(!serde_json::to_string(&mail).unwrap().contains("hunter2"));
    }

    #[test]
    fn test_validate_bad_sender() {
        let mut config = Config::default();
        config.mail.from = "not-an-address".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("mail.from"));

        config.mail.from = "ops@example.com".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_store_paths_under_data_dir() {
        let mut config = Config::default();
        config.storage.data_dir = Some(PathBuf::from("/srv/dct"));

        assert_eq!(
            config.flight_plans_path(),
            PathBuf::from("/srv/dct/flight_plans.json")
        );
        assert_eq!(config.outbox_path(), PathBuf::from("/srv/dct/outbox.json"));
        assert_eq!(
            config.export_path(),
            PathBuf::from("/srv/dct/outbox_export.txt")
        );
    }

    #[test]
    fn test_default_data_dir() {
        let path = Config::default().data_dir();
        assert!(path.to_string_lossy().contains("cleareddct"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("cleareddct"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_mail_timeout() {
        assert_eq!(Config::default().mail_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.storage, StorageConfig::default());
        assert_eq!(config.mail.timeout_secs, MailConfig::default().timeout_secs);
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = crate::store::test_path("config.toml");
        crate::store::write_text(
            &path,
            r#"
[storage]
data_dir = "/tmp/dct"

[export]
sender_name = "Alice"
lesson = "L5"

[mail]
from = "ops@example.com"
transport = "sendmail"
smtp_password = "secret"
timeout_secs = 10
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(path.clone())).unwrap();
        assert_eq!(config.storage.data_dir, Some(PathBuf::from("/tmp/dct")));
        assert_eq!(config.export.sender_name, "Alice");
        assert_eq!(config.export.originator, "");
        assert_eq!(config.export.lesson, "L5");
        assert_eq!(config.mail.from, "ops@example.com");
        assert_eq!(config.mail.timeout_secs, 10);
        assert_eq!(config.mail.sendmail_command, "sendmail");
        assert_eq!(config.mail.transport, MailTransport::Sendmail);
        assert_eq!(config.mail.smtp_password, "secret");
        crate::store::cleanup(&path);
    }

    #[test]
    fn test_load_invalid_toml_values() {
        let path = crate::store::test_path("config.toml");
        crate::store::write_text(&path, "[mail]\ntimeout_secs = 0\n").unwrap();

        let err = Config::load_from(Some(path.clone())).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
        crate::store::cleanup(&path);
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("flight_plans_file"));
        assert!(json.contains("sendmail_command"));
        assert!(json.contains(r#""transport":"smtp""#));
    }
}
