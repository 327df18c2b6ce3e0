use thiserror::Error;

use crate::model::SimpleStep;

/// Main error type for Kitchen
#[derive(Error, Debug)]
pub enum KitchenError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Entity, step or route not found
    #[error("{0}")]
    NotFound(String),

    /// Business-rule rejection, optionally carrying the conflicting steps
    #[error("{message}")]
    Validation {
        message: String,
        conflicts: Option<Vec<SimpleStep>>,
    },

    /// Storage constraint violation (duplicate id, shared step components, ...)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A write touched an unexpected number of rows, or a view returned a malformed row
    #[error("Integrity anomaly: {0}")]
    Integrity(String),

    /// Malformed request payload
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl KitchenError {
    /// Shorthand for a validation failure without diagnostics.
    pub fn validation(message: impl Into<String>) -> Self {
        KitchenError::Validation {
            message: message.into(),
            conflicts: None,
        }
    }

    /// Translate SQLite constraint failures into `Conflict`, leaving other
    /// database errors untouched.
    ///
    /// Trigger aborts already carry a user-facing message and keep it. Any
    /// other constraint text names schema objects, so it is only logged.
    pub fn from_write(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(e, msg)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                let detail = msg.unwrap_or_else(|| e.to_string());
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_TRIGGER {
                    KitchenError::Conflict(detail)
                } else {
                    log::warn!("Constraint violation: {}", detail);
                    KitchenError::Conflict(WRITE_CONFLICT.to_string())
                }
            }
            other => KitchenError::Database(other),
        }
    }
}

/// Message for constraint failures with no domain text of their own.
pub const WRITE_CONFLICT: &str = "The change conflicts with existing data";

/// Primary key or unique index collision.
pub fn is_key_collision(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Convenient Result type using KitchenError
pub type Result<T> = std::result::Result<T, KitchenError>;
