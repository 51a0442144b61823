//! Error types for the askdb pipeline.
//!
//! This module defines all error types using `thiserror` for ergonomic error
//! handling. Guardrail and policy rejections are distinct variants so they
//! surface verbatim to the caller and are never retried; connectivity errors
//! carry an actionable suggestion instead of a raw driver trace.

use crate::guard::GuardrailViolation;
use crate::llm::ProviderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AskDbError {
    #[error("Invalid connection string: {message}")]
    InvalidConnectionString { message: String },

    #[error("Database connection not found: {connection_id}")]
    ConnectionNotFound { connection_id: String },

    /// Lexical guardrail rejection. Terminal, never retried.
    #[error(transparent)]
    Guardrail(#[from] GuardrailViolation),

    /// Access-mode policy rejection. Terminal, never retried.
    #[error("Operation not allowed: {keyword} requires more than '{mode}' access")]
    OperationNotAllowed { keyword: String, mode: String },

    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        /// e.g., "42P01" for undefined table
        sql_state: Option<String>,
        suggestion: String,
    },

    #[error("Query execution failed: {message}")]
    QueryExecutionFailed { message: String },

    #[error("Timeout: {operation} exceeded {elapsed_secs}s")]
    Timeout {
        operation: String,
        elapsed_secs: u32,
    },

    /// LLM provider failure, already classified by tag.
    #[error("SQL generation failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AskDbError {
    /// Create an invalid connection string error.
    pub fn invalid_connection_string(message: impl Into<String>) -> Self {
        Self::InvalidConnectionString {
            message: message.into(),
        }
    }

    /// Create a connection not found error.
    pub fn connection_not_found(connection_id: impl Into<String>) -> Self {
        Self::ConnectionNotFound {
            connection_id: connection_id.into(),
        }
    }

    /// Create an access-mode rejection.
    pub fn operation_not_allowed(keyword: impl Into<String>, mode: impl Into<String>) -> Self {
        Self::OperationNotAllowed {
            keyword: keyword.into(),
            mode: mode.into(),
        }
    }

    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a database error with optional SQL state.
    pub fn database(
        message: impl Into<String>,
        sql_state: Option<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
            suggestion: suggestion.into(),
        }
    }

    /// Create a query execution error.
    pub fn query_failed(message: impl Into<String>) -> Self {
        Self::QueryExecutionFailed {
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, elapsed_secs: u32) -> Self {
        Self::Timeout {
            operation: operation.into(),
            elapsed_secs,
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::Database { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// Check if this error is a policy rejection (guardrail or access mode).
    ///
    /// Policy rejections are terminal user-facing errors: they must never be
    /// retried or downgraded to warnings.
    pub fn is_policy_rejection(&self) -> bool {
        matches!(self, Self::Guardrail(_) | Self::OperationNotAllowed { .. })
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection { .. } | Self::Timeout { .. } => true,
            Self::Provider(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Convert sqlx errors to AskDbError.
impl From<sqlx::Error> for AskDbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => AskDbError::connection(
                msg.to_string(),
                "Check the connection string format and credentials",
            ),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                AskDbError::database(
                    db_err.message(),
                    code,
                    "Check the SQL syntax and referenced objects",
                )
            }
            sqlx::Error::PoolTimedOut => AskDbError::timeout("connection pool acquire", 10),
            sqlx::Error::PoolClosed => {
                AskDbError::connection("Connection pool is closed", "Reconnect to the database")
            }
            sqlx::Error::Io(io_err) => AskDbError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => AskDbError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => AskDbError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            sqlx::Error::ColumnDecode { index, source } => {
                AskDbError::internal(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => AskDbError::internal(format!("Decode error: {}", source)),
            _ => AskDbError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

/// Result type alias for pipeline operations.
pub type AskDbResult<T> = Result<T, AskDbError>;
