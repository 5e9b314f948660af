//! Error types for asksql.
//!
//! Translation itself never fails; these cover the database adapter,
//! configuration and schema snapshot loading.

use thiserror::Error;

/// The main error type for asksql operations.
#[derive(Debug, Error)]
pub enum AskError {
    /// Failed to open the database.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Database introspection failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Query execution error.
    #[error("Execution error: {0}")]
    Execution(String),

    /// A statement that could modify the database was refused.
    #[error("Refusing to run a statement that is not read-only: '{statement}'")]
    ReadOnly { statement: String },

    /// Invalid or unreadable schema snapshot.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AskError {
    /// Create a read-only violation for the given statement.
    pub fn read_only(statement: impl Into<String>) -> Self {
        Self::ReadOnly {
            statement: statement.into(),
        }
    }
}

/// Result type alias for asksql operations.
pub type AskResult<T> = Result<T, AskError>;
