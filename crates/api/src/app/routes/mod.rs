use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};

use crate::app::services::AppServices;
use crate::middleware::auth_middleware;

pub mod auth;
pub mod communities;
pub mod members;
pub mod roles;
pub mod system;

/// Router for everything under `/api/v1`.
///
/// Protected handlers get the auth gate as a route layer; listings of
/// communities, community members and roles stay public.
pub fn router(services: Arc<AppServices>) -> Router {
    let gate = from_fn_with_state(services, auth_middleware);

    Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/signin", post(auth::signin))
        .route("/auth/me", get(auth::me).route_layer(gate.clone()))
        .route(
            "/community",
            get(communities::list_all).merge(post(communities::create).route_layer(gate.clone())),
        )
        .route(
            "/community/me/member",
            get(communities::list_joined).route_layer(gate.clone()),
        )
        .route(
            "/community/me/owner",
            get(communities::list_owned).route_layer(gate.clone()),
        )
        .route("/community/:id/member", get(communities::list_members))
        .route("/role", post(roles::create).get(roles::list))
        .route("/member", post(members::create).route_layer(gate.clone()))
        .route("/member/:id", delete(members::remove).route_layer(gate))
}
