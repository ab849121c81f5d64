use {
    nurph_channels::{Addressing, Error, Result},
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

pub const DEFAULT_NAME: &str = "webhook";
pub const DEFAULT_PATH: &str = "/webhook/inbound";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Adapter name; lets several webhook bridges run side by side.
    pub name: String,
    /// Route inbound messages are posted to.
    pub path: String,
    /// Where outbound messages are posted.
    pub callback_url: String,
    /// `implicit` when every inbound message is meant for the bot.
    pub addressing: Addressing,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.into(),
            path: DEFAULT_PATH.into(),
            callback_url: String::new(),
            addressing: Addressing::Explicit,
        }
    }
}

impl WebhookConfig {
    pub fn new(callback_url: impl Into<String>) -> Self {
        Self {
            callback_url: callback_url.into(),
            ..Self::default()
        }
    }

    /// Parse the `adapters.webhook` config section.
    pub fn from_value(value: Value) -> Result<Self> {
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.callback_url.trim().is_empty() {
            return Err(Error::missing_config(&self.name, "callback_url"));
        }
        if self.name.trim().is_empty() {
            return Err(Error::missing_config(DEFAULT_NAME, "name"));
        }
        if !self.path.starts_with('/') {
            return Err(Error::invalid_input(format!(
                "webhook path must start with '/': {}",
                self.path
            )));
        }
        Ok(())
    }
}
