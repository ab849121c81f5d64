//! Adapter double shared by the crate's tests.

use std::sync::{Arc, Mutex};

use {
    async_trait::async_trait,
    nurph_channels::{Adapter, Addressing, Delivery, Envelope, EventSink},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Sent {
    pub(crate) room: String,
    pub(crate) user: String,
    pub(crate) text: String,
    pub(crate) emote: bool,
}

pub(crate) struct RecordingAdapter {
    name: &'static str,
    addressing: Addressing,
    failure: Option<&'static str>,
    sent: Mutex<Vec<Sent>>,
}

impl RecordingAdapter {
    pub(crate) fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            addressing: Addressing::Explicit,
            failure: None,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn implicit(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            addressing: Addressing::Implicit,
            failure: None,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn failing(name: &'static str, reason: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            addressing: Addressing::Explicit,
            failure: Some(reason),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, envelope: &Envelope, text: &str, emote: bool) -> Delivery {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Sent {
                room: envelope.room.clone(),
                user: envelope.user.id.clone(),
                text: text.to_string(),
                emote,
            });
        match self.failure {
            Some(reason) => Delivery::failure(reason),
            None => Delivery::success(None),
        }
    }
}

#[async_trait]
impl Adapter for RecordingAdapter {
    fn name(&self) -> &str {
        self.name
    }

    fn addressing(&self) -> Addressing {
        self.addressing
    }

    async fn start(&self, _sink: Arc<dyn EventSink>) -> nurph_channels::Result<()> {
        Ok(())
    }

    async fn send_outbound(&self, envelope: &Envelope, text: &str) -> Delivery {
        self.record(envelope, text, false)
    }

    async fn emote_outbound(&self, envelope: &Envelope, text: &str) -> Delivery {
        self.record(envelope, text, true)
    }
}
