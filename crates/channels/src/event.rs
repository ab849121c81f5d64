use {
    nurph_common::User,
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

/// Whether a transport can express "this message is addressed to the bot".
///
/// Chat transports with @mentions are `Explicit`. Transports where every
/// inbound message is implicitly for the bot (SMS to the bot's number) are
/// `Implicit`, which opts their events into address-prefix normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Addressing {
    #[default]
    Explicit,
    Implicit,
}

/// One inbound message, independent of the transport it arrived on.
///
/// Immutable once built; handlers only ever see shared references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalEvent {
    id: String,
    user: User,
    room: String,
    text: String,
    raw_payload: Value,
    adapter: String,
    addressing: Addressing,
}

impl CanonicalEvent {
    /// Start building an event from `adapter` sent by `user`.
    pub fn builder(adapter: impl Into<String>, user: User, text: impl Into<String>) -> EventBuilder {
        EventBuilder {
            adapter: adapter.into(),
            user,
            text: text.into(),
            id: None,
            room: None,
            raw_payload: Value::Null,
            addressing: Addressing::default(),
        }
    }

    /// Unique per inbound occurrence; used to drop redeliveries.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The transport's original payload, kept for debugging.
    pub fn raw_payload(&self) -> &Value {
        &self.raw_payload
    }

    /// Name of the adapter that produced the event.
    pub fn adapter(&self) -> &str {
        &self.adapter
    }

    pub fn addressing(&self) -> Addressing {
        self.addressing
    }

    /// A copy of this event with a different body.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }
}

/// Builder for [`CanonicalEvent`].
#[derive(Debug)]
pub struct EventBuilder {
    adapter: String,
    user: User,
    text: String,
    id: Option<String>,
    room: Option<String>,
    raw_payload: Value,
    addressing: Addressing,
}

impl EventBuilder {
    /// Transport-provided id. Defaults to a fresh UUID.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Conversation id. Defaults to the sender's id (1:1 transports).
    pub fn room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    pub fn raw_payload(mut self, payload: Value) -> Self {
        self.raw_payload = payload;
        self
    }

    pub fn addressing(mut self, addressing: Addressing) -> Self {
        self.addressing = addressing;
        self
    }

    pub fn build(self) -> CanonicalEvent {
        let room = self.room.unwrap_or_else(|| self.user.id.clone());
        CanonicalEvent {
            id: self
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            user: self.user,
            room,
            text: self.text,
            raw_payload: self.raw_payload,
            adapter: self.adapter,
            addressing: self.addressing,
        }
    }
}
