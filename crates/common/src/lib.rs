//! Types shared across all nurph crates.

pub mod types;

pub use types::User;
