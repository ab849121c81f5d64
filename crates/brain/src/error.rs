use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("invalid document path: {path}")]
    InvalidPath { path: String },

    #[error("malformed document at {path}: {message}")]
    Malformed { path: String, message: String },

    #[error("write conflict on {path} after {attempts} attempts")]
    Conflict { path: String, attempts: u32 },

    #[error("category index must not be negative (got {index})")]
    NegativeIndex { index: i64 },
}

impl Error {
    #[must_use]
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath { path: path.into() }
    }

    #[must_use]
    pub fn malformed(path: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Malformed {
            path: path.into(),
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn conflict(path: impl Into<String>, attempts: u32) -> Self {
        Self::Conflict {
            path: path.into(),
            attempts,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
