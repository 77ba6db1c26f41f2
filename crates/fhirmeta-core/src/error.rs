use thiserror::Error;

/// Core error types for the fhirmeta value model
#[derive(Debug, Error)]
pub enum CoreError {
    /// A wire-format codec reported a failure; the message is carried through unchanged.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid search value: {0}")]
    InvalidSearchValue(String),
}

impl CoreError {
    /// Create a new Serialization error from an external codec failure
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a new InvalidSearchValue error
    pub fn invalid_search_value(message: impl Into<String>) -> Self {
        Self::InvalidSearchValue(message.into())
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
