use std::sync::Arc;

use axum::{
    extract::Extension,
    response::{IntoResponse, Response},
};

use commune_community::NewRole;

use crate::app::dto::{self, ApiJson, ApiQuery, PageQuery};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<NewRole>,
) -> Result<Response, ApiError> {
    let role = services.create_role(body).await?;
    Ok(dto::data_body(role).into_response())
}

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Response, ApiError> {
    let page = services.list_roles(query.request()).await?;
    Ok(dto::page_body(page).into_response())
}
