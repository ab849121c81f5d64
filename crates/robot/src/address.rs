//! Detecting, synthesizing and stripping the bot-address prefix.

use regex::Regex;

use crate::{Error, Result, RobotConfig};

pub(crate) struct Addresser {
    name: String,
    /// Text starts with the bot's name or alias, nothing before it.
    addressed: Regex,
    /// The address prefix a respond listener strips. More lenient than
    /// `addressed`: leading whitespace, an `@` and a `:` or `,` are allowed.
    prefix: Regex,
}

impl Addresser {
    pub(crate) fn new(config: &RobotConfig) -> Result<Self> {
        let names = config
            .names()
            .map(|name| {
                let escaped = regex::escape(name);
                if name.ends_with(|c: char| c.is_alphanumeric() || c == '_') {
                    format!(r"{escaped}\b")
                } else {
                    escaped
                }
            })
            .collect::<Vec<_>>()
            .join("|");

        let addressed = format!(r"(?i)^(?:{names})");
        let prefix = format!(r"(?i)^\s*@?(?:{names})[:,]?\s*");
        Ok(Self {
            name: config.name.clone(),
            addressed: Regex::new(&addressed).map_err(|e| Error::pattern(addressed, e))?,
            prefix: Regex::new(&prefix).map_err(|e| Error::pattern(prefix, e))?,
        })
    }

    /// `"{name}: {text}"` when `text` is not already addressed to the bot.
    pub(crate) fn normalize(&self, text: &str) -> Option<String> {
        if self.addressed.is_match(text) {
            None
        } else {
            Some(format!("{}: {text}", self.name))
        }
    }

    /// The remainder of `text` after the address prefix, if it has one.
    pub(crate) fn strip<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.prefix.find(text).map(|m| &text[m.end()..])
    }
}
