//! Semantic checks on a parsed config.
//!
//! Syntax and type errors surface while parsing; this catches values that
//! parse but cannot work (an empty bot name, a non-SQLite database URL, ...).

use std::fmt;

use serde_json::Value;

use crate::schema::{BrainBackend, NurphConfig, WritePolicyKind};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. `"brain.database_url"`.
    pub path: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.severity, self.path, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Error-level diagnostics joined into one line.
    #[must_use]
    pub fn summary(&self) -> String {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| format!("{}: {}", d.path, d.message))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn push(&mut self, severity: Severity, path: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path: path.to_string(),
            message: message.into(),
        });
    }
}

pub fn validate(config: &NurphConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    if config.bot.name.trim().is_empty() {
        result.push(Severity::Error, "bot.name", "must not be empty");
    }
    if config.bot.alias.as_deref().is_some_and(|a| a.trim().is_empty()) {
        result.push(Severity::Warning, "bot.alias", "empty alias is ignored");
    }

    if config.server.bind.trim().is_empty() {
        result.push(Severity::Error, "server.bind", "must not be empty");
    }
    if config.server.port == 0 {
        result.push(Severity::Warning, "server.port", "0 binds a random port");
    }

    match (&config.brain.backend, &config.brain.database_url) {
        (BrainBackend::Memory, Some(_)) => {
            result.push(
                Severity::Warning,
                "brain.database_url",
                "ignored with the memory backend",
            );
        },
        (BrainBackend::Sqlite, Some(url)) if !url.starts_with("sqlite:") => {
            result.push(
                Severity::Error,
                "brain.database_url",
                format!("expected a sqlite: URL, got `{url}`"),
            );
        },
        _ => {},
    }
    if config.brain.write_policy == WritePolicyKind::Optimistic
        && config.brain.max_write_attempts == 0
    {
        result.push(
            Severity::Error,
            "brain.max_write_attempts",
            "must be at least 1 with the optimistic write policy",
        );
    }

    for (name, section) in [
        ("twilio", &config.adapters.twilio),
        ("webhook", &config.adapters.webhook),
    ] {
        if let Some(section) = section
            && !matches!(section, Value::Object(_))
        {
            result.push(
                Severity::Error,
                &format!("adapters.{name}"),
                "must be a table of adapter settings",
            );
        }
    }
    if config.adapters.configured().is_empty() {
        result.push(
            Severity::Info,
            "adapters",
            "no adapters configured; the bot will not receive messages",
        );
    }

    result
}
