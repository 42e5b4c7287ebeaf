//! Error types for jobly

use crate::value::BindError;
use thiserror::Error;

/// Result type alias for jobly operations
pub type JoblyResult<T> = Result<T, JoblyError>;

/// Error types for data-access operations.
///
/// `Validation`, `NotFound` and `Conflict` are the domain conditions callers are
/// expected to branch on; everything else is an infrastructure failure that is
/// propagated unchanged.
#[derive(Debug, Error)]
pub enum JoblyError {
    /// Caller supplied unusable input (e.g. an empty update payload)
    #[error("Validation error: {0}")]
    Validation(String),

    /// An id-targeted statement matched no rows
    #[error("Not found: {0}")]
    NotFound(String),

    /// A natural key already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

impl JoblyError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Parse a tokio_postgres error into a more specific JoblyError.
    ///
    /// A unique violation (SQLSTATE 23505) becomes [`JoblyError::Conflict`], so a
    /// duplicate inserted between the existence check and the INSERT is reported
    /// the same way as one caught by the check. A parameter that could not be
    /// bound without changing its value is a [`JoblyError::Validation`].
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(bind) = std::error::Error::source(&err).and_then(|e| e.downcast_ref::<BindError>()) {
            return Self::Validation(bind.to_string());
        }
        if let Some(db_err) = err.as_db_error() {
            if db_err.code().code() == "23505" {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return Self::Conflict(format!("{}: {}", constraint, db_err.message()));
            }
        }
        Self::Query(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for JoblyError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
