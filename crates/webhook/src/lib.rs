//! Generic HTTP transport.
//!
//! Inbound messages are JSON posts to [`WebhookConfig::path`]; outbound
//! messages are JSON posts to [`WebhookConfig::callback_url`]. Useful for
//! bridging chat systems that have no dedicated adapter.

pub mod adapter;
pub mod config;
pub mod inbound;

pub use {
    adapter::{OutboundMessage, WebhookAdapter},
    config::WebhookConfig,
    inbound::InboundMessage,
};
