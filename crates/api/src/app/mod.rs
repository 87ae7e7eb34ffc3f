//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services/`: entity services over the document store
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: response views, envelopes and the JSON extractor
//! - `errors.rs`: the error envelope

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Largest accepted request body.
pub const BODY_LIMIT_BYTES: usize = 50 * 1024 * 1024;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(services: Arc<AppServices>) -> Router {
    let api = routes::router(Arc::clone(&services)).layer(Extension(services));

    Router::new()
        .route("/", get(routes::system::root))
        .route("/health", get(routes::system::health))
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES)),
        )
}

pub use services::AppServices;
