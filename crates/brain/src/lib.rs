//! The bot's brain: a document-oriented key/value store.
//!
//! Every value lives at a physical path `"{namespace}/{key}"` where the
//! namespace is either a user id or the reserved `GLOBAL` sentinel. On top of
//! the raw store sit the user registry (`GLOBAL/users`) and named item
//! categories (`GLOBAL/categories`), both maintained by whole-document
//! read-modify-write through [`Brain::mutate`].
//!
//! Read-modify-write is last-write-wins by default: two writers racing on the
//! same document can silently drop one delta. [`WritePolicy::Optimistic`]
//! switches to version-checked writes with retry.

pub mod brain;
pub mod categories;
pub mod error;
pub mod memory;
pub mod namespace;
pub mod sqlite;
pub mod store;

pub use {
    brain::{Brain, Fetched, WritePolicy},
    error::{Error, Result},
    memory::MemoryDocumentStore,
    namespace::{GLOBAL, Namespace},
    sqlite::SqliteDocumentStore,
    store::{Document, DocumentStore},
};
