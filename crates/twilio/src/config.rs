use {
    nurph_channels::{Error, Result},
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

use crate::ADAPTER_NAME;

pub const DEFAULT_API_BASE: &str = "https://api.twilio.com";
pub const DEFAULT_WEBHOOK_PATH: &str = "/twilio/sms/reply";

/// Credentials and routing for one Twilio number.
#[derive(Clone, Serialize, Deserialize)]
pub struct TwilioConfig {
    /// Account SID, also the basic-auth user.
    #[serde(default)]
    pub account_sid: String,

    #[serde(default = "empty_secret", serialize_with = "serialize_secret")]
    pub auth_token: Secret<String>,

    /// The bot's own number, used as `From` on outbound messages.
    #[serde(default)]
    pub from_number: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Route Twilio posts inbound SMS to.
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
}

impl std::fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"[REDACTED]")
            .field("from_number", &self.from_number)
            .field("api_base", &self.api_base)
            .field("webhook_path", &self.webhook_path)
            .finish()
    }
}

fn empty_secret() -> Secret<String> {
    Secret::new(String::new())
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.into()
}

fn default_webhook_path() -> String {
    DEFAULT_WEBHOOK_PATH.into()
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

impl TwilioConfig {
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from_number: impl Into<String>,
    ) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: Secret::new(auth_token.into()),
            from_number: from_number.into(),
            api_base: default_api_base(),
            webhook_path: default_webhook_path(),
        }
    }

    /// Parse the `adapters.twilio` config section.
    ///
    /// Fails with [`Error::MissingConfig`] naming the first required key that
    /// is absent or empty.
    pub fn from_value(value: Value) -> Result<Self> {
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            ("account_sid", self.account_sid.as_str()),
            ("auth_token", self.auth_token.expose_secret().as_str()),
            ("from_number", self.from_number.as_str()),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(Error::missing_config(ADAPTER_NAME, key));
            }
        }
        if !self.webhook_path.starts_with('/') {
            return Err(Error::invalid_input(format!(
                "twilio webhook_path must start with '/': {}",
                self.webhook_path
            )));
        }
        Ok(())
    }

    /// Messages resource URL for this account.
    pub fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base.trim_end_matches('/'),
            self.account_sid
        )
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn parses_with_defaults() {
        let config = TwilioConfig::from_value(json!({
            "account_sid": "AC123",
            "auth_token": "tok",
            "from_number": "+15550000000",
        }))
        .unwrap();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.webhook_path, DEFAULT_WEBHOOK_PATH);
        assert_eq!(
            config.messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn missing_key_is_named() {
        let err = TwilioConfig::from_value(json!({
            "account_sid": "AC123",
            "from_number": "+15550000000",
        }))
        .unwrap_err();
        assert!(matches!(err, Error::MissingConfig { ref key, .. } if key == "auth_token"));

        let err = TwilioConfig::from_value(json!({
            "account_sid": " ",
            "auth_token": "tok",
            "from_number": "+15550000000",
        }))
        .unwrap_err();
        assert!(matches!(err, Error::MissingConfig { ref key, .. } if key == "account_sid"));
    }

    #[test]
    fn relative_webhook_path_is_rejected() {
        let mut config = TwilioConfig::new("AC1", "tok", "+1");
        config.webhook_path = "sms".into();
        assert!(matches!(config.validate(), Err(Error::InvalidInput { .. })));
    }

    #[test]
    fn debug_redacts_token() {
        let config = TwilioConfig::new("AC1", "super-secret", "+1");
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret"));
    }
}
