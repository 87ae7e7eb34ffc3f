use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::CurrentUser;

/// Name of the cookie carrying the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

const LOGIN_REQUIRED: &str = "Please login to access this resource";

/// Resolve the caller from the access token and attach a [`CurrentUser`].
///
/// Any failure (no token, bad signature, expired, deleted user) answers 401
/// before the handler runs.
pub async fn auth_middleware(
    State(services): State<Arc<AppServices>>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(req.headers()).ok_or_else(|| ApiError::Unauthorized(LOGIN_REQUIRED.into()))?;

    let claims = services.credentials().verify_token(&token).map_err(|e| {
        tracing::warn!(error = %e, "rejected access token");
        ApiError::Unauthorized(LOGIN_REQUIRED.into())
    })?;

    let user = services.find_user(claims.sub).await?.ok_or_else(|| {
        tracing::warn!(user_id = %claims.sub, "access token refers to a missing user");
        ApiError::Unauthorized(LOGIN_REQUIRED.into())
    })?;

    req.extensions_mut().insert(CurrentUser::new(user));

    Ok(next.run(req).await)
}

/// The `access_token` cookie wins over an `Authorization: Bearer` header.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) {
        let value = cookie.value().trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    extract_bearer(headers).map(str::to_string)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
