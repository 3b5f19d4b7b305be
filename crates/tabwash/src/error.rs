//! Error types for the cleaning engine.
//!
//! The core operations report insufficient samples and bad patterns as
//! values (`None`, empty vectors, unchanged tables). `EngineError` covers the
//! boundary cases: unknown columns in a pipeline plan, degenerate regression
//! fits, configuration problems, and I/O through polars.
//!
//! Errors are serializable so a front end can render `{code, message}`.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the cleaning engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Pipeline run was cancelled by the caller.
    #[error("Pipeline cancelled")]
    Cancelled,

    /// Column was not found in the table headers.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A regular expression failed to compile.
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Not enough usable observations for a computation.
    #[error("Insufficient data for {operation}: need at least {required} observations, got {actual}")]
    InsufficientData {
        operation: String,
        required: usize,
        actual: usize,
    },

    /// The design matrix of a regression could not be inverted.
    #[error("Singular matrix while fitting {0}")]
    SingularMatrix(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<EngineError>,
    },
}

impl EngineError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        EngineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for front-end handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled => "CANCELLED",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InvalidPattern { .. } => "INVALID_PATTERN",
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::SingularMatrix(_) => "SINGULAR_MATRIX",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error represents a cancellation.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::WithContext { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }

    /// Check if the caller can fix this error by changing its request.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Cancelled
            | Self::ColumnNotFound(_)
            | Self::InvalidConfig(_)
            | Self::InvalidPattern { .. }
            | Self::InsufficientData { .. }
            | Self::SingularMatrix(_) => true,
            Self::Io(_) | Self::Polars(_) | Self::Json(_) => false,
            Self::WithContext { source, .. } => source.is_recoverable(),
        }
    }
}

impl From<crate::config::ConfigValidationError> for EngineError {
    fn from(err: crate::config::ConfigValidationError) -> Self {
        EngineError::InvalidConfig(err.to_string())
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for EngineError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("EngineError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| EngineError::Polars(e).with_context(context))
    }
}
