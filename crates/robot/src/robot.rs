use std::{
    collections::{HashSet, VecDeque},
    panic::AssertUnwindSafe,
    sync::{Arc, Mutex},
};

use {
    async_trait::async_trait,
    futures::FutureExt,
    nurph_brain::Brain,
    nurph_channels::{Addressing, AdapterRegistry, CanonicalEvent, EventSink},
    tracing::{debug, error, info, warn},
};

use crate::{
    Handler, ListenerKind, Outbound, Response, Result,
    address::Addresser,
    listener::Listener,
};

/// How many recent event ids are remembered for redelivery detection.
const RECENT_EVENT_IDS: usize = 1024;

/// Bot identity used for addressing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotConfig {
    pub name: String,
    /// Alternative prefix the bot answers to, e.g. `"/"`.
    pub alias: Option<String>,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            name: "Nurph".into(),
            alias: None,
        }
    }
}

impl RobotConfig {
    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.alias.as_deref().filter(|a| !a.is_empty()))
    }
}

/// Why an event never reached the listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    EmptyText,
    Duplicate,
}

/// Terminal state of one pass through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveOutcome {
    Dropped(DropReason),
    Unmatched,
    /// `invoked` listeners ran; `failed` of them returned an error or panicked.
    Matched { invoked: usize, failed: usize },
}

#[derive(Default)]
struct RecentIds {
    order: VecDeque<String>,
    seen: HashSet<String>,
}

impl RecentIds {
    /// Record `id`; false if it was already recorded.
    fn insert(&mut self, id: &str) -> bool {
        if self.seen.contains(id) {
            return false;
        }
        if self.order.len() == RECENT_EVENT_IDS
            && let Some(oldest) = self.order.pop_front()
        {
            self.seen.remove(&oldest);
        }
        self.order.push_back(id.to_string());
        self.seen.insert(id.to_string());
        true
    }
}

/// The receive pipeline.
///
/// Register listeners with [`hear`](Self::hear) and [`respond`](Self::respond),
/// then share the robot as an `Arc` and hand it to adapters as their
/// [`EventSink`].
pub struct Robot {
    config: RobotConfig,
    brain: Brain,
    registry: Arc<AdapterRegistry>,
    outbound: Outbound,
    addresser: Addresser,
    listeners: Vec<Listener>,
    recent: Mutex<RecentIds>,
    track_users: bool,
}

impl Robot {
    pub fn new(config: RobotConfig, brain: Brain, registry: Arc<AdapterRegistry>) -> Result<Self> {
        let addresser = Addresser::new(&config)?;
        Ok(Self {
            config,
            brain,
            outbound: Outbound::new(Arc::clone(&registry)),
            registry,
            addresser,
            listeners: Vec::new(),
            recent: Mutex::new(RecentIds::default()),
            track_users: false,
        })
    }

    /// Record every sender in the brain's user registry.
    ///
    /// The update is spawned and not awaited; concurrent updates are subject
    /// to the brain's write policy.
    pub fn with_user_tracking(mut self, enabled: bool) -> Self {
        self.track_users = enabled;
        self
    }

    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    pub fn brain(&self) -> &Brain {
        &self.brain
    }

    pub fn registry(&self) -> &Arc<AdapterRegistry> {
        &self.registry
    }

    pub fn outbound(&self) -> &Outbound {
        &self.outbound
    }

    /// Run `handler` for any message whose text matches `pattern`.
    pub fn hear(&mut self, pattern: &str, handler: impl Handler + 'static) -> Result<()> {
        self.listen(ListenerKind::Hear, pattern, handler)
    }

    /// Run `handler` for messages addressed to the bot whose remaining text
    /// matches `pattern`.
    pub fn respond(&mut self, pattern: &str, handler: impl Handler + 'static) -> Result<()> {
        self.listen(ListenerKind::Respond, pattern, handler)
    }

    fn listen(
        &mut self,
        kind: ListenerKind,
        pattern: &str,
        handler: impl Handler + 'static,
    ) -> Result<()> {
        let listener = Listener::new(kind, pattern, Arc::new(handler))?;
        debug!(listener = %listener, "listener registered");
        self.listeners.push(listener);
        Ok(())
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Start every registered adapter with this robot as their sink.
    pub async fn run(self: &Arc<Self>) -> Result<()> {
        let sink: Arc<dyn EventSink> = Arc::clone(self) as Arc<dyn EventSink>;
        self.registry.start_all(sink).await?;
        info!(
            name = %self.config.name,
            listeners = self.listeners.len(),
            adapters = ?self.registry.list(),
            "robot running"
        );
        Ok(())
    }

    /// Push one event through the pipeline.
    ///
    /// Returns once every matching listener has finished. Sends those
    /// listeners started but did not wait for may still be in flight.
    pub async fn receive(&self, event: CanonicalEvent) -> ReceiveOutcome {
        if event.text().is_empty() {
            debug!(adapter = event.adapter(), event_id = event.id(), "dropping event with empty text");
            return ReceiveOutcome::Dropped(DropReason::EmptyText);
        }
        let fresh = self
            .recent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(event.id());
        if !fresh {
            debug!(adapter = event.adapter(), event_id = event.id(), "dropping redelivered event");
            return ReceiveOutcome::Dropped(DropReason::Duplicate);
        }

        let event = match event.addressing() {
            Addressing::Implicit => match self.addresser.normalize(event.text()) {
                Some(text) => event.with_text(text),
                None => event,
            },
            Addressing::Explicit => event,
        };
        let event = Arc::new(event);
        debug!(
            adapter = event.adapter(),
            event_id = event.id(),
            room = event.room(),
            "event validated"
        );

        if self.track_users {
            let brain = self.brain.clone();
            let user = event.user().clone();
            tokio::spawn(async move {
                if let Err(e) = brain.update_user(&user).await {
                    warn!(user = %user.id, error = %e, "failed to record user");
                }
            });
        }

        let mut invoked = 0;
        let mut failed = 0;
        for listener in &self.listeners {
            let Some(matched) = listener.matches(event.text(), &self.addresser) else {
                continue;
            };
            invoked += 1;
            let response = Response::new(
                Arc::clone(&event),
                matched.text,
                matched.captures,
                self.brain.clone(),
                self.outbound.clone(),
            );
            let run = AssertUnwindSafe(listener.handler().handle(response)).catch_unwind();
            match run.await {
                Ok(Ok(())) => {
                    debug!(listener = %listener, event_id = event.id(), "listener finished");
                },
                Ok(Err(e)) => {
                    failed += 1;
                    warn!(listener = %listener, event_id = event.id(), error = %e, "listener failed");
                },
                Err(_) => {
                    failed += 1;
                    error!(listener = %listener, event_id = event.id(), "listener panicked");
                },
            }
        }

        if invoked == 0 {
            debug!(event_id = event.id(), "no listener matched");
            ReceiveOutcome::Unmatched
        } else {
            debug!(event_id = event.id(), invoked, failed, "event dispatched");
            ReceiveOutcome::Matched { invoked, failed }
        }
    }
}

#[async_trait]
impl EventSink for Robot {
    async fn receive(&self, event: CanonicalEvent) {
        Robot::receive(self, event).await;
    }
}
