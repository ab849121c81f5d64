//! SMS transport backed by Twilio.
//!
//! Inbound messages arrive as Twilio's form-encoded webhook on
//! [`TwilioConfig::webhook_path`]; outbound messages go through the Messages
//! REST API. SMS has no way to address the bot explicitly, so events are
//! marked [`Addressing::Implicit`](nurph_channels::Addressing::Implicit).

pub mod adapter;
pub mod config;
pub mod inbound;
pub mod outbound;

pub use {adapter::TwilioAdapter, config::TwilioConfig, inbound::SmsPayload};

/// Adapter name used in envelopes and config.
pub const ADAPTER_NAME: &str = "twilio";
