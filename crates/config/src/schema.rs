//! Config schema. Every section has defaults, so an empty file is valid.

use {
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NurphConfig {
    pub bot: BotConfig,
    pub server: ServerConfig,
    pub brain: BrainConfig,
    pub adapters: AdaptersConfig,
}

/// Bot identity and built-in behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Name the bot answers to; also the prefix added to SMS messages.
    pub name: String,
    /// Alternative address prefix, e.g. `"/"`.
    pub alias: Option<String>,
    /// Record every sender in the user registry.
    pub track_users: bool,
    /// Register the `categories`/`list`/`add`/`remove`/`random` commands.
    pub category_commands: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "Nurph".into(),
            alias: None,
            track_users: false,
            category_commands: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrainBackend {
    /// Lost on exit.
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicyKind {
    #[default]
    LastWriteWins,
    Optimistic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrainConfig {
    pub backend: BrainBackend,
    /// SQLite URL, e.g. `sqlite://nurph.db`. Defaults to the user data dir.
    pub database_url: Option<String>,
    /// How read-modify-write updates (users, categories) handle races.
    pub write_policy: WritePolicyKind,
    /// Attempts before an optimistic update gives up.
    pub max_write_attempts: u32,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            backend: BrainBackend::Memory,
            database_url: None,
            write_policy: WritePolicyKind::LastWriteWins,
            max_write_attempts: 5,
        }
    }
}

/// Raw adapter sections; each adapter crate parses and validates its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptersConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twilio: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<Value>,
}

impl AdaptersConfig {
    /// Names of the configured adapter sections.
    pub fn configured(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.twilio.is_some() {
            names.push("twilio");
        }
        if self.webhook.is_some() {
            names.push("webhook");
        }
        names
    }
}
