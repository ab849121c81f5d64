/// Crate-wide result type for adapter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed adapter errors shared across transports.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Inbound payload or parameter is invalid.
    #[error("invalid adapter input: {message}")]
    InvalidInput { message: String },

    /// No adapter is registered under this name.
    #[error("unknown adapter: {name}")]
    UnknownAdapter { name: String },

    /// A required configuration key is absent or empty.
    #[error("{adapter} adapter is missing required config key `{key}`")]
    MissingConfig { adapter: String, key: String },

    /// The adapter was used before `start`.
    #[error("adapter not started: {name}")]
    NotStarted { name: String },

    /// JSON (de)serialization failed.
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl Error {
    #[must_use]
    pub fn invalid_input(message: impl std::fmt::Display) -> Self {
        Self::InvalidInput {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn unknown_adapter(name: impl std::fmt::Display) -> Self {
        Self::UnknownAdapter {
            name: name.to_string(),
        }
    }

    #[must_use]
    pub fn missing_config(adapter: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingConfig {
            adapter: adapter.into(),
            key: key.into(),
        }
    }

    #[must_use]
    pub fn not_started(name: impl std::fmt::Display) -> Self {
        Self::NotStarted {
            name: name.to_string(),
        }
    }
}
