use std::{fmt, sync::Arc};

use {async_trait::async_trait, serde::Serialize};

use crate::{Addressing, CanonicalEvent, Envelope, Result};

/// Outcome of one outbound delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Delivery {
    /// The transport accepted the message. `body` is its raw response, if any.
    Success { body: Option<String> },
    /// The transport rejected the message or could not be reached.
    Failure { reason: String },
}

impl Delivery {
    pub fn success(body: Option<String>) -> Self {
        Self::Success { body }
    }

    pub fn failure(reason: impl fmt::Display) -> Self {
        Self::Failure {
            reason: reason.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Receives canonical events from adapters. The robot is the production sink.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn receive(&self, event: CanonicalEvent);
}

/// A transport binding.
///
/// Implementations are shared as `Arc<dyn Adapter>` between the inbound path
/// (their own webhook or poller) and the robot's outbound dispatch.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Stable adapter name, e.g. `"twilio"`. Events carry it back for routing.
    fn name(&self) -> &str;

    /// Whether inbound messages are implicitly addressed to the bot.
    fn addressing(&self) -> Addressing {
        Addressing::Explicit
    }

    /// Begin delivering inbound events to `sink`.
    async fn start(&self, sink: Arc<dyn EventSink>) -> Result<()>;

    /// Stop accepting inbound events.
    async fn stop(&self) -> Result<()> {
        Ok(())
    }

    /// Deliver `text` to the room/user of `envelope`.
    async fn send_outbound(&self, envelope: &Envelope, text: &str) -> Delivery;

    /// Deliver an action-style message. Transports without one send plain text.
    async fn emote_outbound(&self, envelope: &Envelope, text: &str) -> Delivery {
        self.send_outbound(envelope, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    #[async_trait]
    impl Adapter for Plain {
        fn name(&self) -> &str {
            "plain"
        }

        async fn start(&self, _sink: Arc<dyn EventSink>) -> Result<()> {
            Ok(())
        }

        async fn send_outbound(&self, _envelope: &Envelope, text: &str) -> Delivery {
            Delivery::success(Some(format!("sent {text}")))
        }
    }

    #[tokio::test]
    async fn emote_defaults_to_send() {
        let envelope = Envelope::new("plain", "room", nurph_common::User::new("u", "U"));
        let delivery = Plain.emote_outbound(&envelope, "waves").await;
        assert_eq!(delivery, Delivery::success(Some("sent waves".into())));
        assert_eq!(Plain.addressing(), Addressing::Explicit);
    }

    #[test]
    fn delivery_serializes_with_status_tag() {
        let value = serde_json::to_value(Delivery::failure("HTTP 400")).unwrap_or_default();
        assert_eq!(
            value,
            serde_json::json!({ "status": "failure", "reason": "HTTP 400" })
        );
        assert!(!Delivery::failure("x").is_success());
        assert!(Delivery::success(None).is_success());
    }
}
