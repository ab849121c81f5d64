use std::{collections::BTreeMap, sync::Arc};

use {
    nurph_common::User,
    serde::de::DeserializeOwned,
    serde_json::{Map, Value},
    tracing::{debug, warn},
};

use crate::{
    Error, MemoryDocumentStore, Result,
    namespace::{Namespace, is_collection_path, is_document_path},
    store::DocumentStore,
};

pub(crate) const USERS_KEY: &str = "users";

/// How [`Brain::mutate`] commits its write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WritePolicy {
    /// Read, apply, overwrite. A concurrent writer's delta can be lost.
    #[default]
    LastWriteWins,
    /// Version-checked write; on conflict re-read and re-apply, up to
    /// `max_attempts` times, then fail with [`Error::Conflict`].
    Optimistic { max_attempts: u32 },
}

/// Result of [`Brain::get`].
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    Document(Value),
    /// The key named a collection; values of its documents in path order.
    Collection(Vec<Value>),
}

impl Fetched {
    /// Collapse into a single JSON value (collections become arrays).
    pub fn into_value(self) -> Value {
        match self {
            Self::Document(value) => value,
            Self::Collection(values) => Value::Array(values),
        }
    }
}

/// Namespaced persistence for handlers.
#[derive(Clone)]
pub struct Brain {
    store: Arc<dyn DocumentStore>,
    policy: WritePolicy,
}

impl Brain {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            policy: WritePolicy::default(),
        }
    }

    /// A brain backed by a fresh [`MemoryDocumentStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryDocumentStore::new()))
    }

    pub fn with_write_policy(mut self, policy: WritePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn write_policy(&self) -> WritePolicy {
        self.policy
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    fn document_path(namespace: &Namespace, key: &str) -> Result<String> {
        let path = namespace.physical_key(key);
        if is_document_path(&path) {
            Ok(path)
        } else {
            Err(Error::invalid_path(path))
        }
    }

    /// Overwrite the document at `(namespace, key)`.
    pub async fn set(&self, namespace: &Namespace, key: &str, value: Value) -> Result<()> {
        let path = Self::document_path(namespace, key)?;
        let version = self.store.write(&path, value).await?;
        debug!(%path, version, "brain set");
        Ok(())
    }

    /// Read `(namespace, key)`. Absence is `Ok(None)`, never an error.
    pub async fn get(&self, namespace: &Namespace, key: &str) -> Result<Option<Fetched>> {
        let path = namespace.physical_key(key);
        if is_document_path(&path) {
            return Ok(self
                .store
                .read(&path)
                .await?
                .map(|doc| Fetched::Document(doc.value)));
        }
        if is_collection_path(&path) {
            let values = self.store.children(&path).await?;
            return Ok((!values.is_empty()).then_some(Fetched::Collection(values)));
        }
        Err(Error::invalid_path(path))
    }

    /// [`Brain::get`] decoded into `T`.
    pub async fn get_as<T: DeserializeOwned>(
        &self,
        namespace: &Namespace,
        key: &str,
    ) -> Result<Option<T>> {
        match self.get(namespace, key).await? {
            None => Ok(None),
            Some(fetched) => serde_json::from_value(fetched.into_value())
                .map(Some)
                .map_err(|e| Error::malformed(namespace.physical_key(key), e)),
        }
    }

    pub async fn remove(&self, namespace: &Namespace, key: &str) -> Result<bool> {
        let path = Self::document_path(namespace, key)?;
        self.store.delete(&path).await
    }

    /// Read-modify-write a whole document.
    ///
    /// `apply` receives the current value (`None` if absent) and returns the
    /// replacement, or `None` to leave the document untouched. Under
    /// [`WritePolicy::Optimistic`] it may run more than once. Returns whether a
    /// write happened.
    pub async fn mutate<F>(&self, namespace: &Namespace, key: &str, mut apply: F) -> Result<bool>
    where
        F: FnMut(Option<Value>) -> Result<Option<Value>> + Send,
    {
        let path = Self::document_path(namespace, key)?;
        match self.policy {
            WritePolicy::LastWriteWins => {
                let current = self.store.read(&path).await?.map(|doc| doc.value);
                let Some(next) = apply(current)? else {
                    return Ok(false);
                };
                self.store.write(&path, next).await?;
                Ok(true)
            },
            WritePolicy::Optimistic { max_attempts } => {
                let attempts = max_attempts.max(1);
                for attempt in 1..=attempts {
                    let current = self.store.read(&path).await?;
                    let expected = current.as_ref().map(|doc| doc.version);
                    let Some(next) = apply(current.map(|doc| doc.value))? else {
                        return Ok(false);
                    };
                    if self.store.write_if(&path, next, expected).await?.is_some() {
                        return Ok(true);
                    }
                    debug!(%path, attempt, "brain write lost a race, retrying");
                }
                warn!(%path, attempts, "brain write gave up after repeated conflicts");
                Err(Error::conflict(path, attempts))
            },
        }
    }

    // ── User registry ───────────────────────────────────────────────────────

    /// Record `user` in the registry, replacing any previous entry.
    ///
    /// The whole registry document is rewritten; see [`WritePolicy`] for what
    /// that means under concurrent updates.
    pub async fn update_user(&self, user: &User) -> Result<()> {
        if user.id.is_empty() {
            warn!(name = %user.name, "cannot record a user without an id");
            return Ok(());
        }
        let entry = serde_json::to_value(user)?;
        let path = Namespace::Global.physical_key(USERS_KEY);
        self.mutate(&Namespace::Global, USERS_KEY, |current| {
            let mut users = object_or_empty(&path, current)?;
            users.insert(user.id.clone(), entry.clone());
            Ok(Some(Value::Object(users)))
        })
        .await?;
        Ok(())
    }

    pub async fn users(&self) -> Result<BTreeMap<String, User>> {
        Ok(self
            .get_as(&Namespace::Global, USERS_KEY)
            .await?
            .unwrap_or_default())
    }

    pub async fn user_for_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users().await?.remove(id))
    }
}

/// Interpret an optional document as a JSON object, treating absence as empty.
pub(crate) fn object_or_empty(path: &str, value: Option<Value>) -> Result<Map<String, Value>> {
    match value {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(Error::malformed(
            path,
            format!("expected an object, found {other}"),
        )),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use {async_trait::async_trait, serde_json::json, tokio::sync::Barrier};

    use {super::*, crate::store::Document};

    #[tokio::test]
    async fn set_then_get() {
        let brain = Brain::in_memory();
        let ns = Namespace::user("alice");
        brain.set(&ns, "prefs", json!({ "tz": "UTC" })).await.unwrap();
        assert_eq!(
            brain.get(&ns, "prefs").await.unwrap(),
            Some(Fetched::Document(json!({ "tz": "UTC" })))
        );
    }

    #[tokio::test]
    async fn absent_key_is_none() {
        let brain = Brain::in_memory();
        assert_eq!(brain.get(&Namespace::Global, "nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_replaces_without_merge() {
        let brain = Brain::in_memory();
        let ns = Namespace::Global;
        brain.set(&ns, "k", json!({ "a": 1, "b": 2 })).await.unwrap();
        brain.set(&ns, "k", json!({ "b": 3 })).await.unwrap();
        assert_eq!(
            brain.get(&ns, "k").await.unwrap().map(Fetched::into_value),
            Some(json!({ "b": 3 }))
        );
    }

    #[tokio::test]
    async fn namespaces_are_isolated() {
        let brain = Brain::in_memory();
        brain
            .set(&Namespace::user("alice"), "score", json!(1))
            .await
            .unwrap();
        brain
            .set(&Namespace::user("bob"), "score", json!(2))
            .await
            .unwrap();
        brain.set(&Namespace::Global, "score", json!(3)).await.unwrap();

        let alice: Option<i64> = brain
            .get_as(&Namespace::user("alice"), "score")
            .await
            .unwrap();
        let global: Option<i64> = brain.get_as(&Namespace::Global, "score").await.unwrap();
        assert_eq!(alice, Some(1));
        assert_eq!(global, Some(3));
    }

    #[tokio::test]
    async fn collection_keys_list_their_documents() {
        let brain = Brain::in_memory();
        let ns = Namespace::user("alice");
        brain.set(&ns, "notes/day/mon", json!("laundry")).await.unwrap();
        brain.set(&ns, "notes/day/tue", json!("dentist")).await.unwrap();

        assert_eq!(
            brain.get(&ns, "notes/day").await.unwrap(),
            Some(Fetched::Collection(vec![json!("laundry"), json!("dentist")]))
        );
        assert_eq!(brain.get(&ns, "notes/week").await.unwrap(), None);
        assert!(matches!(
            brain.set(&ns, "notes/mon", json!("x")).await,
            Err(Error::InvalidPath { .. })
        ));
    }

    #[tokio::test]
    async fn writing_to_a_collection_path_is_rejected() {
        let brain = Brain::in_memory();
        let err = brain
            .set(&Namespace::Global, "a/b", json!(1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPath { path } if path == "GLOBAL/a/b"));
    }

    #[tokio::test]
    async fn mutate_can_skip_the_write() {
        let store = Arc::new(MemoryDocumentStore::new());
        let brain = Brain::new(store.clone());
        let wrote = brain
            .mutate(&Namespace::Global, "k", |_| Ok(None))
            .await
            .unwrap();
        assert!(!wrote);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn update_user_keeps_other_entries() {
        let brain = Brain::in_memory();
        brain.update_user(&User::new("u1", "Ada")).await.unwrap();
        brain.update_user(&User::new("u2", "Bea")).await.unwrap();
        brain.update_user(&User::new("u1", "Ada L.")).await.unwrap();

        let users = brain.users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users["u1"].name, "Ada L.");
        assert_eq!(
            brain.user_for_id("u2").await.unwrap(),
            Some(User::new("u2", "Bea"))
        );
    }

    #[tokio::test]
    async fn update_user_without_id_is_ignored() {
        let brain = Brain::in_memory();
        brain.update_user(&User::new("", "ghost")).await.unwrap();
        assert!(brain.users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_registry_is_a_storage_error() {
        let brain = Brain::in_memory();
        brain
            .set(&Namespace::Global, USERS_KEY, json!(["not", "a", "map"]))
            .await
            .unwrap();
        let err = brain.update_user(&User::new("u1", "Ada")).await.unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }

    /// Holds the first two reads of the registry until both readers have
    /// their snapshot, forcing the interleaving read, read, write, write.
    struct InterleavingStore {
        inner: MemoryDocumentStore,
        barrier: Barrier,
        gated_reads: AtomicUsize,
    }

    impl InterleavingStore {
        fn new() -> Self {
            Self {
                inner: MemoryDocumentStore::new(),
                barrier: Barrier::new(2),
                gated_reads: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DocumentStore for InterleavingStore {
        async fn read(&self, path: &str) -> Result<Option<Document>> {
            let doc = self.inner.read(path).await?;
            if self.gated_reads.fetch_add(1, Ordering::SeqCst) < 2 {
                self.barrier.wait().await;
            }
            Ok(doc)
        }

        async fn write(&self, path: &str, value: Value) -> Result<u64> {
            self.inner.write(path, value).await
        }

        async fn write_if(
            &self,
            path: &str,
            value: Value,
            expected: Option<u64>,
        ) -> Result<Option<u64>> {
            self.inner.write_if(path, value, expected).await
        }

        async fn children(&self, path: &str) -> Result<Vec<Value>> {
            self.inner.children(path).await
        }

        async fn delete(&self, path: &str) -> Result<bool> {
            self.inner.delete(path).await
        }
    }

    #[tokio::test]
    async fn concurrent_user_updates_lose_one_under_last_write_wins() {
        let brain = Brain::new(Arc::new(InterleavingStore::new()));
        let (ada, bea) = (User::new("u1", "Ada"), User::new("u2", "Bea"));
        let (a, b) = tokio::join!(brain.update_user(&ada), brain.update_user(&bea));
        a.unwrap();
        b.unwrap();

        // Both writers started from the same empty snapshot; the second write
        // silently discarded the first.
        let users = brain.users().await.unwrap();
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_user_updates_survive_under_optimistic_policy() {
        let brain = Brain::new(Arc::new(InterleavingStore::new()))
            .with_write_policy(WritePolicy::Optimistic { max_attempts: 3 });
        let (ada, bea) = (User::new("u1", "Ada"), User::new("u2", "Bea"));
        let (a, b) = tokio::join!(brain.update_user(&ada), brain.update_user(&bea));
        a.unwrap();
        b.unwrap();

        let users = brain.users().await.unwrap();
        assert_eq!(users.len(), 2);
    }

    #[tokio::test]
    async fn optimistic_policy_gives_up_when_always_conflicting() {
        struct AlwaysStale(MemoryDocumentStore);

        #[async_trait]
        impl DocumentStore for AlwaysStale {
            async fn read(&self, path: &str) -> Result<Option<Document>> {
                self.0.read(path).await
            }

            async fn write(&self, path: &str, value: Value) -> Result<u64> {
                self.0.write(path, value).await
            }

            async fn write_if(&self, _: &str, _: Value, _: Option<u64>) -> Result<Option<u64>> {
                Ok(None)
            }

            async fn children(&self, path: &str) -> Result<Vec<Value>> {
                self.0.children(path).await
            }

            async fn delete(&self, path: &str) -> Result<bool> {
                self.0.delete(path).await
            }
        }

        let brain = Brain::new(Arc::new(AlwaysStale(MemoryDocumentStore::new())))
            .with_write_policy(WritePolicy::Optimistic { max_attempts: 2 });
        let err = brain
            .update_user(&User::new("u1", "Ada"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict { attempts: 2, .. }));
    }
}
