use std::fmt;

/// Reserved namespace for bot-wide documents.
///
/// A user whose id is literally `GLOBAL` shares this namespace; that collision
/// is a known constraint, not handled.
pub const GLOBAL: &str = "GLOBAL";

/// Partition of the brain: bot-wide or a single user's.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Namespace {
    Global,
    User(String),
}

impl Namespace {
    pub fn user(id: impl Into<String>) -> Self {
        Self::User(id.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Global => GLOBAL,
            Self::User(id) => id,
        }
    }

    /// Physical storage path for `key` in this namespace.
    pub fn physical_key(&self, key: &str) -> String {
        format!("{}/{key}", self.as_str())
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of `/`-separated segments, or `None` if any segment is empty.
fn segment_count(path: &str) -> Option<usize> {
    let mut count = 0;
    for segment in path.split('/') {
        if segment.is_empty() {
            return None;
        }
        count += 1;
    }
    Some(count)
}

/// Paths with an even number of segments address a single document.
pub fn is_document_path(path: &str) -> bool {
    segment_count(path).is_some_and(|n| n % 2 == 0)
}

/// Paths with an odd number of segments address a collection of documents.
pub fn is_collection_path(path: &str) -> bool {
    segment_count(path).is_some_and(|n| n % 2 == 1)
}
