//! Infrastructure layer: document persistence and configuration.

pub mod config;
pub mod documents;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use store::in_memory::InMemoryDocumentStore;
pub use store::postgres::{CollectionSpec, PostgresDocumentStore};
pub use store::{Collection, Condition, Document, DocumentStore, Filter, StoreError, Window};
