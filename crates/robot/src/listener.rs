use std::{fmt, future::Future, sync::Arc};

use {async_trait::async_trait, regex::Regex};

use crate::{Error, Response, Result, address::Addresser};

/// Code run when a listener matches.
///
/// Implemented for any `Fn(Response) -> impl Future<Output = anyhow::Result<()>>`,
/// so most listeners are plain async closures.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, response: Response) -> anyhow::Result<()>;
}

#[async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(Response) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    async fn handle(&self, response: Response) -> anyhow::Result<()> {
        (self)(response).await
    }
}

/// How a listener decides whether a message concerns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerKind {
    /// Any message whose text matches the pattern.
    Hear,
    /// Only messages addressed to the bot. The address prefix is stripped
    /// before the pattern runs.
    Respond,
}

impl fmt::Display for ListenerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hear => f.write_str("hear"),
            Self::Respond => f.write_str("respond"),
        }
    }
}

pub(crate) struct Listener {
    kind: ListenerKind,
    pattern: Regex,
    handler: Arc<dyn Handler>,
}

/// What a matching listener sees of the message.
pub(crate) struct ListenerMatch {
    pub(crate) text: String,
    pub(crate) captures: Vec<Option<String>>,
}

impl Listener {
    pub(crate) fn new(kind: ListenerKind, pattern: &str, handler: Arc<dyn Handler>) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| Error::pattern(pattern, e))?;
        Ok(Self {
            kind,
            pattern,
            handler,
        })
    }

    pub(crate) fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    pub(crate) fn matches(&self, text: &str, addresser: &Addresser) -> Option<ListenerMatch> {
        let exposed = match self.kind {
            ListenerKind::Hear => text,
            ListenerKind::Respond => addresser.strip(text)?,
        };
        let captures = self.pattern.captures(exposed)?;
        Some(ListenerMatch {
            text: exposed.to_string(),
            captures: captures
                .iter()
                .map(|m| m.map(|m| m.as_str().to_string()))
                .collect(),
        })
    }
}

impl fmt::Display for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} /{}/", self.kind, self.pattern.as_str())
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use {super::*, crate::RobotConfig};

    fn noop() -> Arc<dyn Handler> {
        Arc::new(|_res: Response| async { anyhow::Ok(()) })
    }

    fn addresser() -> Addresser {
        Addresser::new(&RobotConfig::default()).unwrap()
    }

    #[test]
    fn hear_sees_full_text() {
        let listener = Listener::new(ListenerKind::Hear, r"(?i)\bhi\b", noop()).unwrap();
        let m = listener.matches("Nurph: hi there", &addresser()).unwrap();
        assert_eq!(m.text, "Nurph: hi there");
        assert_eq!(m.captures, [Some("hi".to_string())]);
    }

    #[test]
    fn respond_requires_and_strips_prefix() {
        let listener = Listener::new(ListenerKind::Respond, r"(?i)^hi (\w+)?", noop()).unwrap();
        assert!(listener.matches("hi there", &addresser()).is_none());

        let m = listener.matches("Nurph: hi there", &addresser()).unwrap();
        assert_eq!(m.text, "hi there");
        assert_eq!(m.captures, [Some("hi there".to_string()), Some("there".to_string())]);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let err = Listener::new(ListenerKind::Hear, "(", noop()).err().unwrap();
        assert!(matches!(err, Error::Pattern { ref pattern, .. } if pattern == "("));
    }

    #[test]
    fn display_names_kind_and_pattern() {
        let listener = Listener::new(ListenerKind::Respond, "^ping$", noop()).unwrap();
        assert_eq!(listener.to_string(), "respond /^ping$/");
    }
}
