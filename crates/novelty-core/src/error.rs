use thiserror::Error;

/// Top-level error type for the novelty service.
///
/// Each variant tags the pipeline stage that failed. Subsystem crates
/// construct the matching variant directly so that the `?` operator carries
/// a stage-tagged message all the way up to the HTTP layer, where it is
/// mapped to a status code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NoveltyError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bad caller input. `field` names the offending request field.
    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl NoveltyError {
    /// Shorthand for a validation failure on a named request field.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        NoveltyError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<toml::de::Error> for NoveltyError {
    fn from(err: toml::de::Error) -> Self {
        NoveltyError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for NoveltyError {
    fn from(err: toml::ser::Error) -> Self {
        NoveltyError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for NoveltyError {
    fn from(err: serde_json::Error) -> Self {
        NoveltyError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for novelty-service operations.
pub type Result<T> = std::result::Result<T, NoveltyError>;
