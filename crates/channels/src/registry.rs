use std::{collections::HashMap, sync::Arc};

use tracing::{info, warn};

use crate::{Adapter, Error, EventSink, Result};

/// Adapters known to the robot, keyed by [`Adapter::name`].
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn Adapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `adapter`, replacing any adapter with the same name.
    pub fn register(&mut self, adapter: Arc<dyn Adapter>) {
        let name = adapter.name().to_string();
        if self.adapters.insert(name.clone(), adapter).is_some() {
            warn!(adapter = %name, "replaced previously registered adapter");
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Adapter>> {
        self.adapters.get(name).cloned()
    }

    /// Like [`get`](Self::get) but fails with [`Error::UnknownAdapter`].
    pub fn require(&self, name: &str) -> Result<Arc<dyn Adapter>> {
        self.get(name).ok_or_else(|| Error::unknown_adapter(name))
    }

    /// Registered adapter names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.adapters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Start every adapter, delivering inbound events to `sink`.
    ///
    /// Stops at the first adapter that fails to start.
    pub async fn start_all(&self, sink: Arc<dyn EventSink>) -> Result<()> {
        for name in self.list() {
            let adapter = self.require(name)?;
            adapter.start(Arc::clone(&sink)).await?;
            info!(adapter = name, "adapter started");
        }
        Ok(())
    }

    /// Stop every adapter. Failures are logged and do not stop the others.
    pub async fn stop_all(&self) {
        for (name, adapter) in &self.adapters {
            if let Err(e) = adapter.stop().await {
                warn!(adapter = %name, error = %e, "adapter failed to stop");
            }
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use {super::*, crate::{CanonicalEvent, Delivery, Envelope}, async_trait::async_trait};

    struct Counting {
        name: &'static str,
        starts: AtomicUsize,
    }

    impl Counting {
        fn new(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                starts: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Adapter for Counting {
        fn name(&self) -> &str {
            self.name
        }

        async fn start(&self, _sink: Arc<dyn EventSink>) -> Result<()> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn send_outbound(&self, _envelope: &Envelope, _text: &str) -> Delivery {
            Delivery::success(None)
        }
    }

    struct NullSink;

    #[async_trait]
    impl EventSink for NullSink {
        async fn receive(&self, _event: CanonicalEvent) {}
    }

    #[test]
    fn register_get_and_list() {
        let mut registry = AdapterRegistry::new();
        assert!(registry.is_empty());
        registry.register(Counting::new("webhook"));
        registry.register(Counting::new("twilio"));

        assert_eq!(registry.list(), ["twilio", "webhook"]);
        assert_eq!(registry.get("twilio").unwrap().name(), "twilio");
        assert!(registry.get("irc").is_none());
        assert!(matches!(
            registry.require("irc"),
            Err(Error::UnknownAdapter { .. })
        ));
    }

    #[tokio::test]
    async fn start_all_starts_each_adapter_once() {
        let a = Counting::new("a");
        let b = Counting::new("b");
        let mut registry = AdapterRegistry::new();
        registry.register(a.clone());
        registry.register(b.clone());

        registry.start_all(Arc::new(NullSink)).await.unwrap();
        registry.stop_all().await;

        assert_eq!(a.starts.load(Ordering::SeqCst), 1);
        assert_eq!(b.starts.load(Ordering::SeqCst), 1);
    }
}
