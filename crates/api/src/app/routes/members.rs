use std::sync::Arc;

use axum::{
    extract::Extension,
    response::{IntoResponse, Response},
};

use commune_community::NewMember;

use crate::app::dto::{self, ApiJson, ApiPath, MemberCreated};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::CurrentUser;

pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(body): ApiJson<NewMember>,
) -> Result<Response, ApiError> {
    let member = services.add_member(current.id(), body).await?;
    Ok(dto::data_body(MemberCreated::from(&member)).into_response())
}

pub async fn remove(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    ApiPath(id): ApiPath<String>,
) -> Result<Response, ApiError> {
    services.remove_member(current.id(), &id).await?;
    Ok(dto::ok_body().into_response())
}
