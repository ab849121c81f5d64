//! Transport adapter boundary.
//!
//! Each transport (SMS gateway, HTTP webhook, ...) implements [`Adapter`]:
//! it turns its own inbound payloads into a [`CanonicalEvent`] handed to an
//! [`EventSink`], and delivers outbound text addressed by an [`Envelope`].

pub mod adapter;
pub mod envelope;
pub mod error;
pub mod event;
pub mod registry;

pub use {
    adapter::{Adapter, Delivery, EventSink},
    envelope::Envelope,
    error::{Error, Result},
    event::{Addressing, CanonicalEvent, EventBuilder},
    registry::AdapterRegistry,
};
