use axum::extract::{FromRequest, FromRequestParts};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use commune_community::{Community, Member, Role, User};
use commune_core::{CommunityId, MemberId, Page, PageRequest, RoleId, UserId};

use crate::app::errors::ApiError;

// -------------------------
// Extractors
// -------------------------

/// `axum::Json` whose rejections use the API error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` with enveloped rejections.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// `axum::extract::Path` with enveloped rejections.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// `?page=` on listing routes. Kept as a raw string so junk falls back to page 1.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn request(&self) -> PageRequest {
        PageRequest::parse(self.page.as_deref())
    }
}

// -------------------------
// Response views
// -------------------------

/// A populated reference: the referenced entity's id and display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub id: String,
    pub name: Option<String>,
}

impl Reference {
    pub fn user(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
        }
    }

    pub fn role(role: &Role) -> Self {
        Self {
            id: role.id.to_string(),
            name: Some(role.name.clone()),
        }
    }
}

/// Community with its owner populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommunityListing {
    pub id: CommunityId,
    pub name: String,
    pub slug: String,
    pub owner: Option<Reference>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommunityListing {
    pub fn new(community: Community, owner: Option<Reference>) -> Self {
        Self {
            id: community.id,
            name: community.name,
            slug: community.slug,
            owner,
            created_at: community.timestamps.created_at,
            updated_at: community.timestamps.updated_at,
        }
    }
}

/// Membership row with user and role populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberListing {
    pub id: MemberId,
    pub community: CommunityId,
    pub user: Option<Reference>,
    pub role: Option<Reference>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MemberListing {
    pub fn new(member: Member, user: Option<Reference>, role: Option<Reference>) -> Self {
        Self {
            id: member.id,
            community: member.community,
            user,
            role,
            created_at: member.timestamps.created_at,
            updated_at: member.timestamps.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberCreated {
    pub id: MemberId,
    pub community: CommunityId,
    pub user: UserId,
    pub role: RoleId,
    pub created_at: DateTime<Utc>,
}

impl From<&Member> for MemberCreated {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id,
            community: member.community,
            user: member.user,
            role: member.role,
            created_at: member.timestamps.created_at,
        }
    }
}

// -------------------------
// Envelopes
// -------------------------

/// `{status:true, content:{data}}`
pub fn data_body<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({
        "status": true,
        "content": { "data": data },
    }))
}

/// `{status:true, content:{meta:{total,pages,page}, data:[...]}}`
pub fn page_body<T: Serialize>(page: Page<T>) -> Json<Value> {
    Json(json!({
        "status": true,
        "content": {
            "meta": page.meta,
            "data": page.data,
        },
    }))
}

/// `{status:true, content:{data, meta:{access_token}}}`
pub fn session_body<T: Serialize>(data: T, access_token: &str) -> Json<Value> {
    Json(json!({
        "status": true,
        "content": {
            "data": data,
            "meta": { "access_token": access_token },
        },
    }))
}

pub fn ok_body() -> Json<Value> {
    Json(json!({ "status": true }))
}
