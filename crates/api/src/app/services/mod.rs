//! Entity services: one validate → query → respond cycle per operation.
//!
//! Handlers stay thin and call into these methods; everything here returns
//! `Result<_, ApiError>` so `?` does the error mapping.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use commune_auth::Credentials;
use commune_community::{Community, Member, Role, User};
use commune_core::Entity;
use commune_infra::{Collection, Document, DocumentStore, Filter, InMemoryDocumentStore, Window};

use crate::app::errors::ApiError;

pub mod communities;
pub mod members;
pub mod roles;
pub mod users;

/// Shared application state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppServices {
    users: Collection<User>,
    roles: Collection<Role>,
    communities: Collection<Community>,
    members: Collection<Member>,
    credentials: Arc<Credentials>,
}

impl AppServices {
    pub fn new(store: Arc<dyn DocumentStore>, credentials: Credentials) -> Self {
        Self {
            users: Collection::new(Arc::clone(&store)),
            roles: Collection::new(Arc::clone(&store)),
            communities: Collection::new(Arc::clone(&store)),
            members: Collection::new(store),
            credentials: Arc::new(credentials),
        }
    }

    /// Services over a fresh in-memory store (dev/tests).
    pub fn in_memory(credentials: Credentials) -> Self {
        Self::new(Arc::new(InMemoryDocumentStore::new()), credentials)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

/// Load the documents whose ids appear in `ids` with one query, keyed by id.
///
/// Ids with no stored document are simply absent from the map.
async fn index_by_id<D, I>(collection: &Collection<D>, ids: I) -> Result<HashMap<D::Id, D>, ApiError>
where
    D: Document + Entity,
    I: IntoIterator<Item = D::Id>,
{
    let ids: BTreeSet<String> = ids.into_iter().map(|id| id.to_string()).collect();
    let docs = collection.find(&Filter::all().any_of("id", ids), Window::all()).await?;
    Ok(docs.into_iter().map(|doc| (doc.id().clone(), doc)).collect())
}
