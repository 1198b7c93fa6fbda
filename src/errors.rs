//! Unified error type for `FowlTrak`.
//!
//! Core functions return [`Result`]; the web layer decides which variants are
//! shown to the user as flash messages and which become HTTP failures.

use std::fmt;
use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Form field name (e.g. `"quantity"`)
    pub field: String,
    /// Human readable message (e.g. `"Number must be at least 1."`)
    pub message: String,
}

impl FieldError {
    /// Builds a field error from anything string-like.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "There was an error with {}: {}", self.field, self.message)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation failed: {}", join_field_errors(.errors))]
    Validation { errors: Vec<FieldError> },

    #[error("{message}")]
    Conflict { field: String, message: String },

    #[error("Login failed. Check your username and password.")]
    InvalidCredentials,

    #[error("Invalid role: {role}")]
    InvalidRole { role: String },

    #[error("Invalid model.")]
    InvalidRecordKind { kind: String },

    #[error("{kind} record {id} not found")]
    RecordNotFound { kind: String, id: i64 },

    #[error("User {id} not found")]
    UserNotFound { id: i64 },

    #[error("Session error: {message}")]
    Session { message: String },
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Shorthand for a validation error on a single field.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            errors: vec![FieldError::new(field, message)],
        }
    }

    /// Errors caused by what the user submitted rather than by the system.
    ///
    /// These are reported back as flash messages on a re-rendered form; every
    /// other variant is terminal for the request.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::Conflict { .. }
                | Self::InvalidCredentials
                | Self::InvalidRecordKind { .. }
        )
    }

    /// Flash messages describing this error, one per field error.
    #[must_use]
    pub fn user_messages(&self) -> Vec<String> {
        match self {
            Self::Validation { errors } => errors.iter().map(ToString::to_string).collect(),
            Self::Conflict { field, message } => {
                vec![FieldError::new(field.as_str(), message.as_str()).to_string()]
            }
            other => vec![other.to_string()],
        }
    }

    /// True for the unified not-found outcome.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound { .. } | Self::UserNotFound { .. })
    }
}

/// Maps a store-level unique violation onto [`Error::Conflict`].
///
/// Pre-checks catch the common case, but the check and the insert are not
/// atomic; the constraint is what actually decides.
pub(crate) fn conflict_on_unique(err: sea_orm::DbErr, field: &str, message: &str) -> Error {
    match err.sql_err() {
        Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => {
            tracing::debug!(%detail, field, "unique constraint rejected write");
            Error::Conflict {
                field: field.to_string(),
                message: message.to_string(),
            }
        }
        _ => Error::Database(err),
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
