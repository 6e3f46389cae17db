//! Error types for profilebook.
//!
//! This module defines all error types used throughout the profilebook crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

use crate::profile::UnknownField;
use crate::session::AuthError;

/// The main error type for profilebook operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Store Errors ===
    /// Failed to open or create the profile store.
    #[error("failed to open profile store at {path}: {source}")]
    StoreOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// Reading from the profile store failed.
    #[error("failed to read profiles ({operation}): {message}")]
    StoreRead {
        /// The store operation that failed.
        operation: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    /// Writing to the profile store failed.
    #[error("failed to write profile ({operation}): {message}")]
    StoreWrite {
        /// The store operation that failed.
        operation: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    /// Failed to run store schema migrations.
    #[error("store migration failed: {message}")]
    StoreMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// The requested profile does not exist.
    #[error("profile not found: {id}")]
    NotFound {
        /// The identifier that was looked up.
        id: String,
    },

    // === Field Errors ===
    /// A field name outside the profile field enumeration.
    #[error(transparent)]
    UnknownField(#[from] UnknownField),

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

    // === Session Errors ===
    /// No identity is signed in.
    #[error("not signed in")]
    Unauthenticated,

    /// Account creation or sign-in was refused.
    #[error(transparent)]
    Auth(#[from] AuthError),

    // === Export Errors ===
    /// A document artifact could not be produced.
    #[error("failed to export {artifact}: {message}")]
    Export {
        /// Name of the artifact being produced.
        artifact: String,
        /// Description of what went wrong.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for profilebook operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a store read error.
    #[must_use]
    pub fn store_read(operation: &'static str, message: impl ToString) -> Self {
        Self::StoreRead {
            operation,
            message: message.to_string(),
        }
    }

    /// Create a store write error.
    #[must_use]
    pub fn store_write(operation: &'static str, message: impl ToString) -> Self {
        Self::StoreWrite {
            operation,
            message: message.to_string(),
        }
    }

    /// Create a not-found error for the given identifier.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create an export error.
    #[must_use]
    pub fn export(artifact: impl Into<String>, message: impl ToString) -> Self {
        Self::Export {
            artifact: artifact.into(),
            message: message.to_string(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error came from the profile store.
    #[must_use]
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            Self::StoreOpen { .. }
                | Self::StoreRead { .. }
                | Self::StoreWrite { .. }
                | Self::StoreMigration { .. }
        )
    }

    /// Check if this error indicates a missing profile.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error indicates no signed-in identity.
    #[must_use]
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_read_display() {
        let err = Error::store_read("list_all", "disk I/O error");
        let msg = err.to_string();
        assert!(msg.contains("list_all"));
        assert!(msg.contains("disk I/O error"));
        assert!(err.is_store_error());
    }

    #[test]
    fn test_store_write_display() {
        let err = Error::store_write("update", "no profile with id abc");
        assert_eq!(
            err.to_string(),
            "failed to write profile (update): no profile with id abc"
        );
        assert!(err.is_store_error());
    }

    #[test]
    fn test_not_found() {
        let err = Error::not_found("abc123");
        assert_eq!(err.to_string(), "profile not found: abc123");
        assert!(err.is_not_found());
        assert!(!err.is_store_error());
    }

    #[test]
    fn test_unauthenticated() {
        assert!(Error::Unauthenticated.is_unauthenticated());
        assert!(!Error::internal("x").is_unauthenticated());
    }

    #[test]
    fn test_auth_error_is_transparent() {
        let err: Error = AuthError::EmailInUse.into();
        assert_eq!(err.to_string(), "This email is already registered");
        assert!(matches!(err, Error::Auth(AuthError::EmailInUse)));
    }

    #[test]
    fn test_export_error_display() {
        let err = Error::export("REG001.html", "permission denied");
        let msg = err.to_string();
        assert!(msg.contains("REG001.html"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("something went wrong");
        assert_eq!(err.to_string(), "internal error: something went wrong");
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
    fn test_store_open_error_display() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/profiles.db",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err = Error::StoreOpen {
                path: PathBuf::from("/nonexistent/path/profiles.db"),
                source: sqlite_err,
            };
            assert!(err.to_string().contains("/nonexistent/path/profiles.db"));
            assert!(err.is_store_error());
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "bulk_file_stem must not be empty".to_string(),
        };
        assert!(err.to_string().contains("bulk_file_stem"));
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
