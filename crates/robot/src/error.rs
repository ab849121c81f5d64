pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A listener pattern (or the bot name) did not compile.
    #[error("invalid listener pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Brain(#[from] nurph_brain::Error),

    #[error(transparent)]
    Channels(#[from] nurph_channels::Error),
}

impl Error {
    #[must_use]
    pub fn pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            source,
        }
    }
}
