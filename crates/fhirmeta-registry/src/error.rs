use thiserror::Error;

/// Registry error types.
///
/// Pure lookups never fail: absent keys yield empty collections or `None`.
/// Only implementation-guide ingestion can surface an error, for IG content
/// the registry cannot index at all.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl RegistryError {
    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

/// Convenience result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
