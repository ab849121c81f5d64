//! The robot: receive pipeline, listeners and outbound dispatch.
//!
//! Adapters hand [`CanonicalEvent`](nurph_channels::CanonicalEvent)s to a
//! [`Robot`], which drops empty and redelivered events, normalizes implicitly
//! addressed ones, and runs every matching listener in registration order.
//! Listeners answer through a [`Response`], whose sends go through
//! [`Outbound`] to the adapter that owns the conversation.

mod address;
pub mod commands;
pub mod error;
pub mod listener;
pub mod outbound;
pub mod response;
pub mod robot;

#[cfg(test)]
pub(crate) mod testing;

pub use {
    error::{Error, Result},
    listener::{Handler, ListenerKind},
    outbound::{Outbound, PendingDelivery},
    response::Response,
    robot::{DropReason, ReceiveOutcome, Robot, RobotConfig},
};
