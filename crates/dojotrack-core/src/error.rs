//! Core error types for dojotrack-core.
//!
//! This module defines the error hierarchy using thiserror. Check-in errors
//! form their own taxonomy because callers react to each kind differently:
//! a cooldown rejection is retried later, a missing member is fatal for the
//! operation, and a write failure means the check-in never happened.

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// Core error type for dojotrack-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Check-in gate and persistence errors
    #[error("Check-in error: {0}")]
    CheckIn(#[from] CheckInError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Errors surfaced by the check-in path.
///
/// `CooldownActive` is the only recoverable kind: nothing was mutated and the
/// caller may retry once the remaining wait elapses. Every retry re-runs the
/// full gate against freshly read state.
#[derive(Error, Debug)]
pub enum CheckInError {
    /// Too soon since the member's previous accepted check-in.
    #[error(
        "cooldown active: next check-in in {}h{:02}m",
        .remaining.num_hours(),
        .remaining.num_minutes() % 60
    )]
    CooldownActive { remaining: chrono::Duration },

    /// No member row for the given id; nothing is written.
    #[error("member {0} not found")]
    MemberNotFound(Uuid),

    /// A stored member field failed strict parsing (e.g. an unknown belt
    /// name). Never silently defaulted.
    #[error("corrupt member record {member_id}: {field} = '{value}'")]
    DataIntegrity {
        member_id: Uuid,
        field: &'static str,
        value: String,
    },

    /// The persist step failed. The transaction rolled back, so the check-in
    /// is not visible at all and is safe to retry from scratch.
    #[error("check-in write failed: {0}")]
    WriteFailed(#[from] DatabaseError),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
