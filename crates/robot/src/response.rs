use std::sync::Arc;

use {
    nurph_brain::Brain,
    nurph_channels::{CanonicalEvent, Envelope},
    rand::seq::IndexedRandom,
};

use crate::{Outbound, PendingDelivery};

/// Handed to a listener's handler when it matches.
///
/// Carries the triggering event, what the listener's pattern saw, and the
/// means to answer.
#[derive(Clone)]
pub struct Response {
    event: Arc<CanonicalEvent>,
    text: String,
    captures: Vec<Option<String>>,
    envelope: Envelope,
    brain: Brain,
    outbound: Outbound,
}

impl Response {
    pub(crate) fn new(
        event: Arc<CanonicalEvent>,
        text: String,
        captures: Vec<Option<String>>,
        brain: Brain,
        outbound: Outbound,
    ) -> Self {
        let envelope = Envelope::from_event(&event);
        Self {
            event,
            text,
            captures,
            envelope,
            brain,
            outbound,
        }
    }

    /// The text the pattern ran against. For respond listeners the address
    /// prefix is already stripped.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Capture groups; index 0 is the whole match.
    pub fn captures(&self) -> &[Option<String>] {
        &self.captures
    }

    /// Capture group `index`, if it participated in the match.
    pub fn capture(&self, index: usize) -> Option<&str> {
        self.captures.get(index)?.as_deref()
    }

    pub fn event(&self) -> &Arc<CanonicalEvent> {
        &self.event
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn brain(&self) -> &Brain {
        &self.brain
    }

    /// Post to the room the message came from.
    pub fn send(&self, text: impl Into<String>) -> PendingDelivery {
        self.outbound.send(&self.envelope, text)
    }

    /// Answer the sender directly.
    pub fn reply(&self, text: impl Into<String>) -> PendingDelivery {
        self.outbound.reply(&self.envelope, text)
    }

    /// Post several lines to the room as one message, joined with `\n`.
    pub fn send_all(&self, lines: &[&str]) -> PendingDelivery {
        self.send(lines.join("\n"))
    }

    /// Answer the sender with several lines as one message.
    pub fn reply_all(&self, lines: &[&str]) -> PendingDelivery {
        self.reply(lines.join("\n"))
    }

    pub fn emote(&self, text: impl Into<String>) -> PendingDelivery {
        self.outbound.emote(&self.envelope, text)
    }

    /// A uniformly random element of `items`.
    pub fn random<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut rand::rng())
    }
}
