use std::sync::{Arc, RwLock};

use {
    async_trait::async_trait,
    axum::Router,
    nurph_channels::{Adapter, Addressing, Delivery, Envelope, Error, EventSink, Result},
    serde_json::Value,
    tracing::info,
};

use crate::{ADAPTER_NAME, SmsPayload, TwilioConfig, inbound, outbound};

/// The Twilio SMS adapter.
pub struct TwilioAdapter {
    config: TwilioConfig,
    http: reqwest::Client,
    sink: RwLock<Option<Arc<dyn EventSink>>>,
}

impl TwilioAdapter {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            sink: RwLock::new(None),
        }
    }

    /// Build from the `adapters.twilio` config section.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(Self::new(TwilioConfig::from_value(value)?))
    }

    pub fn config(&self) -> &TwilioConfig {
        &self.config
    }

    /// The inbound webhook routes, to be merged into the HTTP server.
    pub fn router(self: &Arc<Self>) -> Router {
        inbound::router(Arc::clone(self))
    }

    /// Turn one webhook payload into an event for the sink.
    ///
    /// Payloads missing `Body` or `From` are ignored.
    pub async fn ingest(&self, payload: SmsPayload) -> Result<()> {
        let sink = self
            .sink
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or_else(|| Error::not_started(ADAPTER_NAME))?;
        let Some(event) = payload.into_event() else {
            return Ok(());
        };
        info!(
            adapter = ADAPTER_NAME,
            event_id = event.id(),
            from = %event.user().id,
            "received sms"
        );
        sink.receive(event).await;
        Ok(())
    }
}

#[async_trait]
impl Adapter for TwilioAdapter {
    fn name(&self) -> &str {
        ADAPTER_NAME
    }

    fn addressing(&self) -> Addressing {
        Addressing::Implicit
    }

    async fn start(&self, sink: Arc<dyn EventSink>) -> Result<()> {
        *self.sink.write().unwrap_or_else(|e| e.into_inner()) = Some(sink);
        info!(
            adapter = ADAPTER_NAME,
            path = %self.config.webhook_path,
            from_number = %self.config.from_number,
            "twilio adapter listening"
        );
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.sink.write().unwrap_or_else(|e| e.into_inner()).take();
        Ok(())
    }

    /// SMS has no rooms: the destination is always the envelope's user.
    async fn send_outbound(&self, envelope: &Envelope, text: &str) -> Delivery {
        outbound::send_sms(&self.http, &self.config, &envelope.user.id, text).await
    }
}
