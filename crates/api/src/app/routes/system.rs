use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe at `/`.
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "API is working",
    }))
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}
