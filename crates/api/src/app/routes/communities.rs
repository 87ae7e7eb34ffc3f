use std::sync::Arc;

use axum::{
    extract::Extension,
    response::{IntoResponse, Response},
};

use commune_community::NewCommunity;

use crate::app::dto::{self, ApiJson, ApiPath, ApiQuery, PageQuery};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::CurrentUser;

pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(body): ApiJson<NewCommunity>,
) -> Result<Response, ApiError> {
    let community = services.create_community(current.id(), body).await?;
    Ok(dto::data_body(community).into_response())
}

pub async fn list_all(
    Extension(services): Extension<Arc<AppServices>>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Response, ApiError> {
    let page = services.list_communities(query.request()).await?;
    Ok(dto::page_body(page).into_response())
}

pub async fn list_owned(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Response, ApiError> {
    let page = services.list_owned_communities(current.id(), query.request()).await?;
    Ok(dto::page_body(page).into_response())
}

pub async fn list_joined(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Response, ApiError> {
    let page = services.list_joined_communities(current.id(), query.request()).await?;
    Ok(dto::page_body(page).into_response())
}

pub async fn list_members(
    Extension(services): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<String>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Response, ApiError> {
    let page = services.list_community_members(&id, query.request()).await?;
    Ok(dto::page_body(page).into_response())
}
