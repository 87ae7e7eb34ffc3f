//! Postgres-backed document store.
//!
//! All collections share one table:
//!
//! ```sql
//! documents (seq BIGSERIAL PRIMARY KEY, collection TEXT, id TEXT, body JSONB)
//! ```
//!
//! `seq` gives insertion order. Uniqueness of `(collection, id)` is a table
//! constraint; every other unique field gets a partial expression index
//! created by [`PostgresDocumentStore::migrate`], named
//! `documents_<collection>_<field>_key`.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` (field taken from the constraint name) |
//! | Database (other) | Any other | `Backend` |
//! | Other | N/A | `Backend` |

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use super::{string_field, Condition, Document, DocumentStore, Filter, StoreError, Window};

const ID_CONSTRAINT: &str = "documents_collection_id_key";

/// Name and unique fields of a collection, used to create its indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionSpec {
    pub name: &'static str,
    pub unique_fields: &'static [&'static str],
}

impl CollectionSpec {
    pub fn of<D: Document>() -> Self {
        Self {
            name: D::COLLECTION,
            unique_fields: D::UNIQUE_FIELDS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: Arc<PgPool>,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error(None, "connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `documents` table and the unique indexes of `collections`.
    /// Safe to run on every start.
    #[instrument(skip(self, collections), err)]
    pub async fn migrate(&self, collections: &[CollectionSpec]) -> Result<(), StoreError> {
        let create_table = format!(
            "CREATE TABLE IF NOT EXISTS documents (
                seq BIGSERIAL PRIMARY KEY,
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                body JSONB NOT NULL,
                CONSTRAINT {ID_CONSTRAINT} UNIQUE (collection, id)
            )"
        );
        sqlx::query(&create_table)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(None, "migrate", e))?;

        for spec in collections {
            for field in spec.unique_fields.iter().filter(|f| **f != "id") {
                if !is_plain_identifier(spec.name) || !is_plain_identifier(field) {
                    return Err(StoreError::Backend(format!(
                        "cannot index {}.{}: not a plain identifier",
                        spec.name, field
                    )));
                }
                let create_index = format!(
                    "CREATE UNIQUE INDEX IF NOT EXISTS {} ON documents ((body ->> '{field}')) \
                     WHERE collection = '{}'",
                    index_name(spec.name, field),
                    spec.name,
                );
                sqlx::query(&create_index)
                    .execute(&*self.pool)
                    .await
                    .map_err(|e| map_sqlx_error(Some(spec.name), "migrate", e))?;
            }
        }

        tracing::info!(collections = collections.len(), "document store migrated");
        Ok(())
    }
}

fn index_name(collection: &str, field: &str) -> String {
    format!("documents_{collection}_{field}_key")
}

fn is_plain_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, collection: &str, filter: &Filter) {
    qb.push(" WHERE collection = ");
    qb.push_bind(collection.to_string());
    for condition in filter.conditions() {
        match condition {
            Condition::Eq { field, value } => {
                qb.push(" AND body ->> ");
                qb.push_bind(field.clone());
                qb.push(" = ");
                qb.push_bind(value.clone());
            }
            Condition::AnyOf { field, values } => {
                qb.push(" AND body ->> ");
                qb.push_bind(field.clone());
                qb.push(" = ANY(");
                qb.push_bind(values.clone());
                qb.push(")");
            }
        }
    }
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    /// Unique fields are enforced by the indexes created in `migrate`.
    #[instrument(skip(self, _unique_fields, doc), err)]
    async fn insert(&self, collection: &str, _unique_fields: &[&str], doc: Value) -> Result<(), StoreError> {
        let id = string_field(&doc, "id")
            .ok_or_else(|| StoreError::MissingId(collection.to_string()))?
            .to_string();

        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(id)
            .bind(Json(doc))
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(Some(collection), "insert", e))?;
        Ok(())
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Value>, StoreError> {
        let mut docs = self
            .find(collection, filter, Window { skip: 0, limit: Some(1) })
            .await?;
        Ok(docs.pop())
    }

    #[instrument(skip(self, filter), err)]
    async fn find(&self, collection: &str, filter: &Filter, window: Window) -> Result<Vec<Value>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT body FROM documents");
        push_filter(&mut qb, collection, filter);
        qb.push(" ORDER BY seq OFFSET ");
        qb.push_bind(to_i64(window.skip));
        if let Some(limit) = window.limit {
            qb.push(" LIMIT ");
            qb.push_bind(to_i64(limit));
        }

        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(Some(collection), "find", e))?;

        rows.into_iter()
            .map(|row| {
                row.try_get::<Json<Value>, _>("body")
                    .map(|Json(body)| body)
                    .map_err(|e| map_sqlx_error(Some(collection), "find", e))
            })
            .collect()
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) AS n FROM documents");
        push_filter(&mut qb, collection, filter);

        let row = qb
            .build()
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(Some(collection), "count", e))?;
        let n: i64 = row
            .try_get("n")
            .map_err(|e| map_sqlx_error(Some(collection), "count", e))?;
        Ok(n.max(0) as u64)
    }

    #[instrument(skip(self, filter), err)]
    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<bool, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "DELETE FROM documents WHERE seq = (SELECT seq FROM documents",
        );
        push_filter(&mut qb, collection, filter);
        qb.push(" ORDER BY seq LIMIT 1)");

        let result = qb
            .build()
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(Some(collection), "delete_one", e))?;
        Ok(result.rows_affected() > 0)
    }
}

/// Map SQLx errors to store errors; unique violations become conflicts.
fn map_sqlx_error(collection: Option<&str>, operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                if let Some(collection) = collection {
                    return StoreError::Conflict {
                        collection: collection.to_string(),
                        field: conflicting_field(collection, db_err.constraint()),
                    };
                }
            }
            StoreError::Backend(format!("database error in {}: {}", operation, db_err.message()))
        }
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed during {}", operation)),
        other => StoreError::Backend(format!("store error in {}: {}", operation, other)),
    }
}

fn conflicting_field(collection: &str, constraint: Option<&str>) -> String {
    let prefix = format!("documents_{collection}_");
    constraint
        .filter(|name| *name != ID_CONSTRAINT)
        .and_then(|name| name.strip_prefix(prefix.as_str()))
        .and_then(|rest| rest.strip_suffix("_key"))
        .unwrap_or("id")
        .to_string()
}
