//! Error types for recentdocs.
//!
//! This module defines all error types used throughout the recentdocs crate.
//! Per-entry failures (a deleted file, an unreadable owner) are recovered by
//! the pipeline; only configuration and registry errors end a run.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for recentdocs operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Filesystem Errors ===
    /// The referenced file does not exist (anymore).
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// Reading file attributes failed for a reason other than absence.
    #[error("failed to stat {path}: {source}")]
    Stat {
        /// Path that was looked up.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Security Errors ===
    /// The owner of a file could not be queried.
    #[error("failed to read owner of {path}: {message}")]
    Security {
        /// Path whose security descriptor was queried.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// A SID could not be translated to an account.
    #[error("no account for SID {sid}: {message}")]
    AccountLookup {
        /// The SID string.
        sid: String,
        /// Description of what went wrong.
        message: String,
    },

    // === Decoding Errors ===
    /// A shell item id list could not be turned into a path.
    #[error("failed to decode shell item id list: {message}")]
    PidlDecode {
        /// Description of what went wrong.
        message: String,
    },

    /// Hex input for a PIDL was malformed.
    #[error("invalid hex input: {message}")]
    InvalidHex {
        /// Description of what went wrong.
        message: String,
    },

    // === Registry Errors ===
    /// Reading the registry failed.
    #[error("failed to read registry key {key}: {message}")]
    Registry {
        /// Full key path.
        key: String,
        /// Description of what went wrong.
        message: String,
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

    // === Platform Errors ===
    /// The operation needs an API this platform does not have.
    #[error("{operation} is only supported on Windows")]
    UnsupportedPlatform {
        /// The operation that was attempted.
        operation: &'static str,
    },

    // === I/O Errors ===
    /// Writing output or another I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for recentdocs operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Build the error for a failed stat, mapping `NotFound` to
    /// [`Error::FileNotFound`].
    #[must_use]
    pub fn stat(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path }
        } else {
            Self::Stat { path, source }
        }
    }

    /// Create a new security error.
    #[must_use]
    pub fn security(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Security {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new account lookup error.
    #[must_use]
    pub fn account_lookup(sid: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AccountLookup {
            sid: sid.into(),
            message: message.into(),
        }
    }

    /// Create a new PIDL decoding error.
    #[must_use]
    pub fn pidl(message: impl Into<String>) -> Self {
        Self::PidlDecode {
            message: message.into(),
        }
    }

    /// Create a new registry error.
    #[must_use]
    pub fn registry(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Registry {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Check if this error means the referenced file no longer exists.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound { .. })
    }
}
