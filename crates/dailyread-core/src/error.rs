//! Core error types for dailyread-core.
//!
//! Policy outcomes (a rejected break, a redelivered interaction, a plan
//! position with no entry) are modelled as values, not errors. Everything in
//! this module is a genuine failure the caller has to surface.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for dailyread-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Outbound message delivery errors
    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    /// The user has not registered yet
    #[error("User {user_id} not found; register first")]
    UserNotFound { user_id: i64 },

    /// A scheduled entry point was called without the shared secret
    #[error("Unauthorized: missing or invalid cron secret")]
    Unauthorized,
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

    /// A stored row could not be decoded
    #[error("Corrupt row in {table}: {message}")]
    CorruptRow { table: &'static str, message: String },

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

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors for caller-supplied input.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Not an IANA timezone name
    #[error("Unknown timezone '{0}' (expected an IANA name such as America/New_York)")]
    UnknownTimezone(String),

    /// Position outside the configured plan grid
    #[error("Position month {month}, day {day} is outside the plan grid ({months} months x {days} days)")]
    PositionOutOfBounds {
        month: u32,
        day: u32,
        months: u32,
        days: u32,
    },

    /// Interaction payload could not be decoded
    #[error("Malformed interaction payload '{payload}': {message}")]
    MalformedPayload { payload: String, message: String },
}

/// Failures of the external send seam.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// The send did not complete within the configured timeout
    #[error("Send timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The transport rejected the message
    #[error("Send rejected (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    /// The transport could not be reached
    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked
                    || inner.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        DeliveryError::Transport(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
