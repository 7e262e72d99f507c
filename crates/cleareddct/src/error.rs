//! Error types for cleareddct.
//!
//! This module defines all error types used throughout the cleareddct crate.
//! The first group of variants are the locally recoverable errors a user can
//! trigger from the command line; the rest are storage and setup failures.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for cleareddct operations.
#[derive(Error, Debug)]
pub enum Error {
    // === User-facing Errors ===
    /// Required input was missing or empty.
    #[error("validation failed: {message}")]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// The formatter referenced a field the record does not carry.
    #[error("flight plan record has no field '{code}'")]
    MissingField {
        /// Wire code of the missing field.
        code: String,
    },

    /// The requested message type is not one the formatter knows.
    #[error("unsupported message type: {value}")]
    UnsupportedMessageType {
        /// The value that was requested.
        value: String,
    },

    /// Email delivery failed.
    #[error("failed to send email: {message}")]
    Transport {
        /// Description of the failed step.
        message: String,
        /// The underlying error, if there is one.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No flight plan is stored under the given key.
    #[error("no flight plan stored under '{key}'")]
    PlanNotFound {
        /// The identification that was looked up.
        key: String,
    },

    // === Storage Errors ===
    /// A store file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    StoreRead {
        /// Path to the store file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A store file exists but does not hold the expected JSON document.
    #[error("store file {path} is corrupt: {source}")]
    StoreCorrupt {
        /// Path to the store file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// A store file could not be written.
    #[error("failed to write {path}: {source}")]
    StoreWrite {
        /// Path to the store file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for cleareddct operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new missing field error.
    #[must_use]
    pub fn missing_field(code: impl Into<String>) -> Self {
        Self::MissingField { code: code.into() }
    }

    /// Create a new unsupported message type error.
    #[must_use]
    pub fn unsupported_message_type(value: impl Into<String>) -> Self {
        Self::UnsupportedMessageType {
            value: value.into(),
        }
    }

    /// Create a new transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new transport error caused by `source`.
    #[must_use]
    pub fn transport_with(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new plan-not-found error.
    #[must_use]
    pub fn plan_not_found(key: impl Into<String>) -> Self {
        Self::PlanNotFound { key: key.into() }
    }

    /// Check if this error is one the user can correct and retry.
    ///
    /// These are reported inline and never abort more than the current
    /// operation.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::MissingField { .. }
                | Self::UnsupportedMessageType { .. }
                | Self::Transport { .. }
                | Self::PlanNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = Error::validation("Aircraft Identification (Item 7) is required");
        assert_eq!(
            err.to_string(),
            "validation failed: Aircraft Identification (Item 7) is required"
        );
    }

    #[test]
    fn test_missing_field_display() {
        let err = Error::missing_field("16_alt2");
        assert_eq!(err.to_string(), "flight plan record has no field '16_alt2'");
    }

    #[test]
    fn test_unsupported_message_type_display() {
        let err = Error::unsupported_message_type("XYZ");
        assert_eq!(err.to_string(), "unsupported message type: XYZ");
    }

    #[test]
    fn test_transport_error_display() {
        let err = Error::transport("connection refused");
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_transport_error_keeps_source() {
        use std::error::Error as _;

        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = Error::transport_with("relay smtp.example.com:587", io_err);

        assert_eq!(
            err.to_string(),
            "failed to send email: relay smtp.example.com:587"
        );
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "refused");
        assert!(Error::transport("down").source().is_none());
    }

    #[test]
    fn test_plan_not_found_display() {
        let err = Error::plan_not_found("N123AB");
        assert!(err.to_string().contains("N123AB"));
    }

    #[test]
    fn test_is_user_error() {
        assert!(Error::validation("x").is_user_error());
        assert!(Error::missing_field("7").is_user_error());
        assert!(Error::unsupported_message_type("XYZ").is_user_error());
        assert!(Error::transport("down").is_user_error());
        assert!(Error::plan_not_found("N1").is_user_error());

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(!Error::from(io_err).is_user_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_store_write_error_display() {
        let err = Error::StoreWrite {
            path: PathBuf::from("/readonly/outbox.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/readonly/outbox.json"));
        assert!(msg.contains("access denied"));
    }

    #[test]
    fn test_store_corrupt_error_display() {
        let source = serde_json::from_str::<Vec<String>>("{").unwrap_err();
        let err = Error::StoreCorrupt {
            path: PathBuf::from("/tmp/flight_plans.json"),
            source,
        };
        assert!(err.to_string().contains("/tmp/flight_plans.json"));
        assert!(err.to_string().contains("corrupt"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "timeout_secs must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
