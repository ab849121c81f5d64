use std::sync::Arc;

use nurph_common::User;

use crate::CanonicalEvent;

/// Addressing for one outbound message.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub room: String,
    pub user: User,
    /// The inbound event this send answers, if any.
    pub message: Option<Arc<CanonicalEvent>>,
    /// Name of the adapter that delivers the message.
    pub adapter: String,
}

impl Envelope {
    /// An unsolicited message (no originating event).
    pub fn new(adapter: impl Into<String>, room: impl Into<String>, user: User) -> Self {
        Self {
            room: room.into(),
            user,
            message: None,
            adapter: adapter.into(),
        }
    }

    /// Address a response to `event` on the adapter it came from.
    pub fn from_event(event: &Arc<CanonicalEvent>) -> Self {
        Self {
            room: event.room().to_string(),
            user: event.user().clone(),
            message: Some(Arc::clone(event)),
            adapter: event.adapter().to_string(),
        }
    }

    /// This envelope redirected at the sender of the originating event.
    pub fn for_reply(&self) -> Self {
        let user = self
            .message
            .as_ref()
            .map_or_else(|| self.user.clone(), |event| event.user().clone());
        Self {
            user,
            ..self.clone()
        }
    }
}
