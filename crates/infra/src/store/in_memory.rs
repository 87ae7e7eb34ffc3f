use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use super::{string_field, DocumentStore, Filter, StoreError, Window};

/// In-memory document store for tests/dev.
///
/// Each collection is a `Vec` in insertion order. Uniqueness checks and the
/// insert happen under one write guard.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    inner: RwLock<HashMap<String, Vec<Value>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, collection: &str, unique_fields: &[&str], doc: Value) -> Result<(), StoreError> {
        if string_field(&doc, "id").is_none() {
            return Err(StoreError::MissingId(collection.to_string()));
        }

        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let docs = map.entry(collection.to_string()).or_default();

        for field in unique_fields {
            let Some(value) = string_field(&doc, field) else {
                continue;
            };
            if docs.iter().any(|existing| string_field(existing, field) == Some(value)) {
                return Err(StoreError::Conflict {
                    collection: collection.to_string(),
                    field: field.to_string(),
                });
            }
        }

        docs.push(doc);
        Ok(())
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Value>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)))
            .cloned())
    }

    async fn find(&self, collection: &str, filter: &Filter, window: Window) -> Result<Vec<Value>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let Some(docs) = map.get(collection) else {
            return Ok(Vec::new());
        };

        let skip = usize::try_from(window.skip).unwrap_or(usize::MAX);
        let limit = window
            .limit
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        Ok(docs
            .iter()
            .filter(|d| filter.matches(d))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let n = map
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).count())
            .unwrap_or(0);
        Ok(n as u64)
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let Some(docs) = map.get_mut(collection) else {
            return Ok(false);
        };
        match docs.iter().position(|d| filter.matches(d)) {
            Some(idx) => {
                docs.remove(idx);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
