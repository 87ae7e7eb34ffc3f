use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use commune_community::{Login, Registration};

use crate::app::dto::{self, ApiJson};
use crate::app::errors::ApiError;
use crate::app::services::users::Session;
use crate::app::services::AppServices;
use crate::context::CurrentUser;
use crate::middleware::ACCESS_TOKEN_COOKIE;

/// Browser-side lifetime of the token cookie; the token itself lives longer.
const COOKIE_MAX_AGE_SECS: i64 = 60 * 60;

pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    jar: CookieJar,
    ApiJson(body): ApiJson<Registration>,
) -> Result<Response, ApiError> {
    let session = services.register(body).await?;
    Ok(session_response(StatusCode::CREATED, jar, session))
}

pub async fn signin(
    Extension(services): Extension<Arc<AppServices>>,
    jar: CookieJar,
    ApiJson(body): ApiJson<Login>,
) -> Result<Response, ApiError> {
    let session = services.login(body).await?;
    Ok(session_response(StatusCode::OK, jar, session))
}

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    current: Option<Extension<CurrentUser>>,
) -> Result<Response, ApiError> {
    let profile = services.me(current.as_ref().map(|Extension(user)| user))?;
    Ok(dto::data_body(profile).into_response())
}

fn session_response(status: StatusCode, jar: CookieJar, session: Session) -> Response {
    let body = dto::session_body(&session.profile, &session.access_token);
    (status, jar.add(access_cookie(session.access_token)), body).into_response()
}

fn access_cookie(token: String) -> Cookie<'static> {
    Cookie::build((ACCESS_TOKEN_COOKIE, token))
        .http_only(true)
        .path("/")
        .max_age(cookie::time::Duration::seconds(COOKIE_MAX_AGE_SECS))
        .build()
}
