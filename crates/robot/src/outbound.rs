//! Outbound dispatch: routing send/reply/emote to the owning adapter.

use std::{fmt, sync::Arc};

use {
    nurph_channels::{AdapterRegistry, Delivery, Envelope},
    tokio::task::JoinHandle,
    tracing::{info, warn},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Send,
    Reply,
    Emote,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Send => "send",
            Self::Reply => "reply",
            Self::Emote => "emote",
        })
    }
}

/// Routes outbound text to the adapter named by an [`Envelope`].
///
/// Every call returns immediately with a [`PendingDelivery`]; the adapter
/// call runs on its own task. Nothing is retried here.
#[derive(Clone)]
pub struct Outbound {
    registry: Arc<AdapterRegistry>,
}

impl Outbound {
    pub fn new(registry: Arc<AdapterRegistry>) -> Self {
        Self { registry }
    }

    /// Deliver `text` to the envelope's room.
    pub fn send(&self, envelope: &Envelope, text: impl Into<String>) -> PendingDelivery {
        self.dispatch(Op::Send, envelope.clone(), text.into())
    }

    /// Deliver `text` to the sender of the envelope's originating event.
    pub fn reply(&self, envelope: &Envelope, text: impl Into<String>) -> PendingDelivery {
        self.dispatch(Op::Reply, envelope.for_reply(), text.into())
    }

    /// Deliver an action-style message.
    pub fn emote(&self, envelope: &Envelope, text: impl Into<String>) -> PendingDelivery {
        self.dispatch(Op::Emote, envelope.clone(), text.into())
    }

    fn dispatch(&self, op: Op, envelope: Envelope, text: String) -> PendingDelivery {
        let adapter = self.registry.get(&envelope.adapter);
        let handle = tokio::spawn(async move {
            let Some(adapter) = adapter else {
                warn!(
                    adapter = %envelope.adapter,
                    %op,
                    "no adapter registered for outbound message"
                );
                return Delivery::failure(format!("unknown adapter `{}`", envelope.adapter));
            };

            info!(
                adapter = %envelope.adapter,
                room = %envelope.room,
                user = %envelope.user.id,
                %op,
                len = text.len(),
                "sending outbound message"
            );
            let delivery = match op {
                Op::Send | Op::Reply => adapter.send_outbound(&envelope, &text).await,
                Op::Emote => adapter.emote_outbound(&envelope, &text).await,
            };
            match &delivery {
                Delivery::Success { .. } => {
                    info!(adapter = %envelope.adapter, room = %envelope.room, %op, "outbound message delivered");
                },
                Delivery::Failure { reason } => {
                    warn!(adapter = %envelope.adapter, room = %envelope.room, %op, reason = %reason, "outbound delivery failed");
                },
            }
            delivery
        });
        PendingDelivery { handle }
    }
}

/// Completion signal for one outbound message.
///
/// Dropping it does not cancel the delivery.
#[must_use = "dropping a PendingDelivery detaches it; call `wait` to observe the outcome"]
pub struct PendingDelivery {
    handle: JoinHandle<Delivery>,
}

impl PendingDelivery {
    /// Wait for the adapter to finish and return its outcome.
    pub async fn wait(self) -> Delivery {
        self.handle
            .await
            .unwrap_or_else(|e| Delivery::failure(format!("delivery task failed: {e}")))
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::testing::RecordingAdapter,
        nurph_channels::CanonicalEvent,
        nurph_common::User,
    };

    fn outbound_with(adapter: Arc<RecordingAdapter>) -> Outbound {
        let mut registry = AdapterRegistry::new();
        registry.register(adapter);
        Outbound::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn send_goes_to_the_envelope_room() {
        let adapter = RecordingAdapter::new("chat");
        let outbound = outbound_with(adapter.clone());
        let envelope = Envelope::new("chat", "lobby", User::new("u1", "Ada"));

        let delivery = outbound.send(&envelope, "hello").wait().await;
        assert!(delivery.is_success());
        let sent = adapter.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].room, "lobby");
        assert_eq!(sent[0].text, "hello");
    }

    #[tokio::test]
    async fn reply_targets_the_original_sender() {
        let adapter = RecordingAdapter::new("chat");
        let outbound = outbound_with(adapter.clone());
        let event = Arc::new(
            CanonicalEvent::builder("chat", User::new("u1", "Ada"), "hi")
                .room("lobby")
                .build(),
        );
        let mut envelope = Envelope::from_event(&event);
        envelope.user = User::new("u2", "Bea");

        outbound.reply(&envelope, "hey").wait().await;
        assert_eq!(adapter.sent()[0].user, "u1");
    }

    #[tokio::test]
    async fn emote_uses_the_emote_capability() {
        let adapter = RecordingAdapter::new("chat");
        let outbound = outbound_with(adapter.clone());
        let envelope = Envelope::new("chat", "lobby", User::new("u1", "Ada"));

        outbound.emote(&envelope, "waves").wait().await;
        assert!(adapter.sent()[0].emote);
    }

    #[tokio::test]
    async fn unknown_adapter_is_a_failed_delivery() {
        let outbound = outbound_with(RecordingAdapter::new("chat"));
        let envelope = Envelope::new("irc", "#lobby", User::new("u1", "Ada"));

        let delivery = outbound.send(&envelope, "hello").wait().await;
        assert_eq!(delivery, Delivery::failure("unknown adapter `irc`"));
    }

    #[tokio::test]
    async fn adapter_failure_is_returned_not_retried() {
        let adapter = RecordingAdapter::failing("chat", "HTTP 500");
        let outbound = outbound_with(adapter.clone());
        let envelope = Envelope::new("chat", "lobby", User::new("u1", "Ada"));

        let delivery = outbound.send(&envelope, "hello").wait().await;
        assert_eq!(delivery, Delivery::failure("HTTP 500"));
        assert_eq!(adapter.sent().len(), 1);
    }
}
