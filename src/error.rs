//! Unified error types for BreakVault.
//!
//! Domain operations return `Result<T>` and never panic. Infrastructure
//! paths that have a sensible fallback (config loading, example data) use
//! the `FailOpen` trait to log a warning and continue with a default.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for BreakVault operations.
#[derive(Error, Debug)]
pub enum VaultError {
    /// I/O errors from vault, export or config file operations.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON or TOML parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// A record looked up by id or name does not exist.
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// Referential integrity or uniqueness violations.
    #[error("constraint violation: {message}")]
    Constraint { message: String },

    /// Rejected user input (blank names, length limits, bad counts).
    #[error("invalid input: {message}")]
    Validation { message: String },

    /// Combo generation could not produce anything.
    #[error("{message}")]
    Generation { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },

    /// Import/export failures.
    #[error("transfer error: {message}")]
    Transfer { message: String },
}

/// A specialized Result type for BreakVault operations.
pub type Result<T> = std::result::Result<T, VaultError>;

impl VaultError {
    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a not-found error for a record kind ("move", "tag", ...).
    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// Create a constraint violation error.
    pub fn constraint(message: impl Into<String>) -> Self {
        Self::Constraint {
            message: message.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a generation error.
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a transfer error.
    pub fn transfer(message: impl Into<String>) -> Self {
        Self::Transfer {
            message: message.into(),
        }
    }
}

impl From<io::Error> for VaultError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Trait for fail-open error handling.
///
/// Log the error and continue with a safe value instead of aborting the
/// command.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using default)", context, err);
                T::default()
            }
        }
    }
}

/// Exit codes for the BreakVault CLI.
pub mod exit_codes {
    /// The command succeeded.
    pub const SUCCESS: i32 = 0;

    /// The command failed (bad input, missing record, I/O error).
    pub const ERROR: i32 = 1;

    /// The process panicked.
    pub const CRASH: i32 = 3;
}
