use std::sync::Arc;

use anyhow::Context;

use commune_api::app::{build_app, AppServices};
use commune_auth::Credentials;
use commune_infra::{documents, AppConfig, DocumentStore, InMemoryDocumentStore, PostgresDocumentStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    commune_observability::init();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    tracing::debug!(?config, "configuration loaded");

    let store: Arc<dyn DocumentStore> = match config.database_url.as_deref() {
        Some(url) => {
            let store = PostgresDocumentStore::connect(url)
                .await
                .context("failed to connect to the database")?;
            store
                .migrate(&documents::collections())
                .await
                .context("failed to prepare the documents table")?;
            tracing::info!("using postgres document store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; data is kept in memory only");
            Arc::new(InMemoryDocumentStore::new())
        }
    };

    let credentials = Credentials::new(&config.access_token_secret).with_hash_cost(config.bcrypt_cost);
    tracing::debug!(bcrypt_cost = credentials.hash_cost(), "credentials ready");
    let services = Arc::new(AppServices::new(store, credentials));
    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
