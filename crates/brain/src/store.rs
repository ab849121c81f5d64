use {async_trait::async_trait, serde_json::Value};

use crate::Result;

/// A stored document and its write counter.
///
/// The version starts at 1 and increases by one on every successful write.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub value: Value,
    pub version: u64,
}

/// Physical document storage.
///
/// Paths are already resolved (`"GLOBAL/categories"`); namespacing and
/// document/collection rules live in [`crate::Brain`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn read(&self, path: &str) -> Result<Option<Document>>;

    /// Replace the document unconditionally. Returns the new version.
    async fn write(&self, path: &str, value: Value) -> Result<u64>;

    /// Replace the document only if its current version equals `expected`
    /// (`None` means the document must not exist yet).
    ///
    /// Returns the new version, or `None` when the check failed and nothing
    /// was written.
    async fn write_if(&self, path: &str, value: Value, expected: Option<u64>)
    -> Result<Option<u64>>;

    /// Values of the documents exactly one level below `path`, ordered by path.
    async fn children(&self, path: &str) -> Result<Vec<Value>>;

    async fn delete(&self, path: &str) -> Result<bool>;
}

/// Whether `path` sits exactly one level below `parent`.
pub(crate) fn is_direct_child(parent: &str, path: &str) -> bool {
    path.strip_prefix(parent)
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|leaf| !leaf.is_empty() && !leaf.contains('/'))
}
