//! Error handling for the engagement predictor
//!
//! `EngageError` separates the three failure classes the service cares about:
//! configuration problems found while loading artifacts (fatal at startup),
//! precondition failures such as asking for a report before any prediction
//! (recoverable), and inference failures for a single request.

use thiserror::Error;

/// Main error type for the engagement predictor
#[derive(Error, Debug)]
pub enum EngageError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Precondition not met: {message}")]
    Precondition { message: String },

    #[error("Inference failed: {message}")]
    Inference { message: String },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Resource not found: {resource} - {id}")]
    NotFound { resource: String, id: String },

    #[error("I/O operation failed: {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV operation failed: {context}")]
    Csv {
        context: String,
        #[source]
        source: csv::Error,
    },

    #[error("Database operation failed: {operation} - {source}")]
    Database {
        operation: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Mutex lock failed: {resource}")]
    MutexPoisoned { resource: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Result alias used across the crate.
pub type EngageResult<T> = Result<T, EngageError>;

impl EngageError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a precondition error
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Create an inference error
    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create a serialization error
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    pub fn csv(context: impl Into<String>, source: csv::Error) -> Self {
        Self::Csv {
            context: context.into(),
            source,
        }
    }

    pub fn database(operation: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Database {
            operation: operation.into(),
            source,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True for errors that must stop the process before it serves requests.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngageError::Config { .. })
    }
}

/// Helper trait for safe mutex operations
///
/// Returns an `EngageError` on a poisoned lock instead of panicking.
pub trait SafeLock<T: ?Sized> {
    fn safe_lock(&self) -> EngageResult<std::sync::MutexGuard<'_, T>>;
}

impl<T: ?Sized> SafeLock<T> for std::sync::Mutex<T> {
    fn safe_lock(&self) -> EngageResult<std::sync::MutexGuard<'_, T>> {
        self.lock().map_err(|_| EngageError::MutexPoisoned {
            resource: "session_registry".to_string(),
        })
    }
}

impl From<std::io::Error> for EngageError {
    fn from(err: std::io::Error) -> Self {
        EngageError::io("io_operation", err)
    }
}

impl From<serde_json::Error> for EngageError {
    fn from(err: serde_json::Error) -> Self {
        EngageError::serialization("json_operation", err)
    }
}

impl From<csv::Error> for EngageError {
    fn from(err: csv::Error) -> Self {
        EngageError::csv("csv_operation", err)
    }
}

impl From<rusqlite::Error> for EngageError {
    fn from(err: rusqlite::Error) -> Self {
        EngageError::database("sqlite_operation", err)
    }
}

impl From<figment::Error> for EngageError {
    fn from(err: figment::Error) -> Self {
        EngageError::config(err.to_string())
    }
}
