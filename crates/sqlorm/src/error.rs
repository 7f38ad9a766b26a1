//! Error types for sqlorm

use thiserror::Error;

/// Result type alias for sqlorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for query building and execution
#[derive(Debug, Error)]
pub enum OrmError {
    /// Connection open failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// Missing or invalid configuration (no server attached, empty insert payload, ...)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Destination shape mismatch (wrong container kind, column count mismatch)
    #[error("Shape error: {0}")]
    Shape(String),

    /// Statement execution or cursor failure reported by the driver
    #[error("Execution error: {0}")]
    Execution(String),

    /// A `$N` placeholder referenced an argument position that does not exist
    #[error("placeholder ${index} out of range for {available} argument(s)")]
    PlaceholderOutOfRange { index: usize, available: usize },

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl OrmError {
    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a shape error
    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape(message.into())
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a shape error
    pub fn is_shape(&self) -> bool {
        matches!(self, Self::Shape(_))
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
