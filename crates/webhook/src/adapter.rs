use std::sync::{Arc, RwLock};

use {
    async_trait::async_trait,
    axum::Router,
    nurph_channels::{Adapter, Addressing, Delivery, Envelope, Error, EventSink, Result},
    serde::{Deserialize, Serialize},
    serde_json::Value,
    tracing::{debug, info},
};

use crate::{InboundMessage, WebhookConfig, inbound};

/// Body posted to the callback URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub room: String,
    pub user: String,
    pub text: String,
    /// Id of the inbound message being answered.
    pub in_reply_to: Option<String>,
    #[serde(default)]
    pub emote: bool,
}

pub struct WebhookAdapter {
    config: WebhookConfig,
    http: reqwest::Client,
    sink: RwLock<Option<Arc<dyn EventSink>>>,
}

impl WebhookAdapter {
    pub fn new(config: WebhookConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            sink: RwLock::new(None),
        }
    }

    /// Build from the `adapters.webhook` config section.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(Self::new(WebhookConfig::from_value(value)?))
    }

    pub fn config(&self) -> &WebhookConfig {
        &self.config
    }

    pub fn router(self: &Arc<Self>) -> Router {
        inbound::router(Arc::clone(self))
    }

    pub async fn ingest(&self, message: InboundMessage) -> Result<()> {
        let sink = self
            .sink
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or_else(|| Error::not_started(&self.config.name))?;
        let Some(event) = message.into_event(self) else {
            debug!(adapter = %self.config.name, "ignoring webhook message without user or text");
            return Ok(());
        };
        debug!(adapter = %self.config.name, event_id = event.id(), "received webhook message");
        sink.receive(event).await;
        Ok(())
    }

    async fn post(&self, envelope: &Envelope, text: &str, emote: bool) -> Delivery {
        let message = OutboundMessage {
            room: envelope.room.clone(),
            user: envelope.user.id.clone(),
            text: text.to_string(),
            in_reply_to: envelope.message.as_ref().map(|m| m.id().to_string()),
            emote,
        };
        let response = match self
            .http
            .post(&self.config.callback_url)
            .json(&message)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Delivery::failure(format!("webhook request failed: {e}")),
        };
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status.is_success() {
            Delivery::success((!body.is_empty()).then_some(body))
        } else {
            Delivery::failure(format!("webhook callback failed ({status}): {body}"))
        }
    }
}

#[async_trait]
impl Adapter for WebhookAdapter {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn addressing(&self) -> Addressing {
        self.config.addressing
    }

    async fn start(&self, sink: Arc<dyn EventSink>) -> Result<()> {
        *self.sink.write().unwrap_or_else(|e| e.into_inner()) = Some(sink);
        info!(
            adapter = %self.config.name,
            path = %self.config.path,
            callback_url = %self.config.callback_url,
            "webhook adapter listening"
        );
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.sink.write().unwrap_or_else(|e| e.into_inner()).take();
        Ok(())
    }

    async fn send_outbound(&self, envelope: &Envelope, text: &str) -> Delivery {
        self.post(envelope, text, false).await
    }

    async fn emote_outbound(&self, envelope: &Envelope, text: &str) -> Delivery {
        self.post(envelope, text, true).await
    }
}
