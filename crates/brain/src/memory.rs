use std::{collections::BTreeMap, sync::RwLock};

use {async_trait::async_trait, serde_json::Value};

use crate::{
    Result,
    store::{Document, DocumentStore, is_direct_child},
};

/// Process-local document store. Contents vanish with the process.
#[derive(Default)]
pub struct MemoryDocumentStore {
    docs: RwLock<BTreeMap<String, Document>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.docs.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn read(&self, path: &str) -> Result<Option<Document>> {
        let docs = self.docs.read().unwrap_or_else(|e| e.into_inner());
        Ok(docs.get(path).cloned())
    }

    async fn write(&self, path: &str, value: Value) -> Result<u64> {
        let mut docs = self.docs.write().unwrap_or_else(|e| e.into_inner());
        let version = docs.get(path).map_or(1, |d| d.version + 1);
        docs.insert(path.to_string(), Document { value, version });
        Ok(version)
    }

    async fn write_if(
        &self,
        path: &str,
        value: Value,
        expected: Option<u64>,
    ) -> Result<Option<u64>> {
        let mut docs = self.docs.write().unwrap_or_else(|e| e.into_inner());
        let current = docs.get(path).map(|d| d.version);
        if current != expected {
            return Ok(None);
        }
        let version = current.map_or(1, |v| v + 1);
        docs.insert(path.to_string(), Document { value, version });
        Ok(Some(version))
    }

    async fn children(&self, path: &str) -> Result<Vec<Value>> {
        let docs = self.docs.read().unwrap_or_else(|e| e.into_inner());
        let prefix = format!("{path}/");
        Ok(docs
            .range(prefix.clone()..)
            .take_while(|(p, _)| p.starts_with(&prefix))
            .filter(|(p, _)| is_direct_child(path, p))
            .map(|(_, d)| d.value.clone())
            .collect())
    }

    async fn delete(&self, path: &str) -> Result<bool> {
        let mut docs = self.docs.write().unwrap_or_else(|e| e.into_inner());
        Ok(docs.remove(path).is_some())
    }
}
