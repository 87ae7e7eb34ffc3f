//! JSON document persistence.
//!
//! Entities are stored as JSON documents grouped into named collections. The
//! store understands just enough structure to filter on top-level string
//! fields, enforce per-field uniqueness and return documents in insertion
//! order. Typed access goes through [`Collection`].

pub mod in_memory;
pub mod postgres;

use std::fmt::{self, Display};
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use commune_core::{Page, PageMeta, PageRequest};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique field already holds the inserted value.
    #[error("duplicate value for {collection}.{field}")]
    Conflict { collection: String, field: String },

    /// Inserted documents must carry a string `id`.
    #[error("document in {0} has no string id")]
    MissingId(String),

    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store backend error: {0}")]
    Backend(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Queries
// ─────────────────────────────────────────────────────────────────────────────

/// One predicate on a top-level string field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Eq { field: String, value: String },
    /// Matches when the field equals any of `values`; an empty list matches nothing.
    AnyOf { field: String, values: Vec<String> },
}

impl Condition {
    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Condition::Eq { field, value } => string_field(doc, field) == Some(value.as_str()),
            Condition::AnyOf { field, values } => string_field(doc, field)
                .map(|v| values.iter().any(|candidate| candidate == v))
                .unwrap_or(false),
        }
    }
}

/// Conjunction of [`Condition`]s. The empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: impl Display) -> Self {
        Self::all().eq("id", id)
    }

    pub fn eq(mut self, field: &str, value: impl Display) -> Self {
        self.conditions.push(Condition::Eq {
            field: field.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn any_of<I, V>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Display,
    {
        self.conditions.push(Condition::AnyOf {
            field: field.to_string(),
            values: values.into_iter().map(|v| v.to_string()).collect(),
        });
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches(&self, doc: &Value) -> bool {
        self.conditions.iter().all(|c| c.matches(doc))
    }
}

/// Slice of a result set, applied after ordering by insertion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    pub skip: u64,
    pub limit: Option<u64>,
}

impl Window {
    pub fn all() -> Self {
        Self::default()
    }
}

impl From<PageMeta> for Window {
    fn from(meta: PageMeta) -> Self {
        Self {
            skip: meta.skip(),
            limit: Some(meta.limit()),
        }
    }
}

pub(crate) fn string_field<'a>(doc: &'a Value, field: &str) -> Option<&'a str> {
    doc.get(field).and_then(Value::as_str)
}

// ─────────────────────────────────────────────────────────────────────────────
// Store contract
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert `doc` into `collection`, rejecting it with
    /// [`StoreError::Conflict`] when any of `unique_fields` collides with an
    /// existing document.
    async fn insert(&self, collection: &str, unique_fields: &[&str], doc: Value) -> Result<(), StoreError>;

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Value>, StoreError>;

    async fn find(&self, collection: &str, filter: &Filter, window: Window) -> Result<Vec<Value>, StoreError>;

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    /// Delete the oldest matching document. Returns whether one was removed.
    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<bool, StoreError>;
}

#[async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn insert(&self, collection: &str, unique_fields: &[&str], doc: Value) -> Result<(), StoreError> {
        (**self).insert(collection, unique_fields, doc).await
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Value>, StoreError> {
        (**self).find_one(collection, filter).await
    }

    async fn find(&self, collection: &str, filter: &Filter, window: Window) -> Result<Vec<Value>, StoreError> {
        (**self).find(collection, filter, window).await
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        (**self).count(collection, filter).await
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<bool, StoreError> {
        (**self).delete_one(collection, filter).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Typed collections
// ─────────────────────────────────────────────────────────────────────────────

/// A type persisted as a document.
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;
    /// Top-level fields whose values must be unique within the collection.
    const UNIQUE_FIELDS: &'static [&'static str];
}

/// Typed handle onto one collection of a [`DocumentStore`].
pub struct Collection<D> {
    store: Arc<dyn DocumentStore>,
    _doc: PhantomData<fn() -> D>,
}

impl<D> Clone for Collection<D> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _doc: PhantomData,
        }
    }
}

impl<D> fmt::Debug for Collection<D>
where
    D: Document,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection").field("name", &D::COLLECTION).finish()
    }
}

impl<D> Collection<D>
where
    D: Document,
{
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _doc: PhantomData,
        }
    }

    pub async fn insert(&self, doc: &D) -> Result<(), StoreError> {
        let value = serde_json::to_value(doc)?;
        self.store.insert(D::COLLECTION, D::UNIQUE_FIELDS, value).await
    }

    pub async fn find_one(&self, filter: &Filter) -> Result<Option<D>, StoreError> {
        match self.store.find_one(D::COLLECTION, filter).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn find(&self, filter: &Filter, window: Window) -> Result<Vec<D>, StoreError> {
        self.store
            .find(D::COLLECTION, filter, window)
            .await?
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(StoreError::from))
            .collect()
    }

    pub async fn count(&self, filter: &Filter) -> Result<u64, StoreError> {
        self.store.count(D::COLLECTION, filter).await
    }

    pub async fn delete_one(&self, filter: &Filter) -> Result<bool, StoreError> {
        self.store.delete_one(D::COLLECTION, filter).await
    }

    /// Count the matches, clamp the request against them and load that page.
    pub async fn find_page(&self, filter: &Filter, request: PageRequest) -> Result<Page<D>, StoreError> {
        let total = self.count(filter).await?;
        let meta = request.resolve(total);
        let data = if meta.page == 0 {
            Vec::new()
        } else {
            self.find(filter, Window::from(meta)).await?
        };
        Ok(Page::new(meta, data))
    }
}
