use chrono::Utc;
use tracing::info;

use commune_community::{NewRole, Role};
use commune_core::{Page, PageRequest};
use commune_infra::Filter;

use super::AppServices;
use crate::app::errors::ApiError;

impl AppServices {
    pub async fn create_role(&self, input: NewRole) -> Result<Role, ApiError> {
        input.validate()?;

        if self.roles.find_one(&Filter::all().eq("name", &input.name)).await?.is_some() {
            return Err(ApiError::Conflict("Role name already exists".into()));
        }

        let role = Role::create(&input, Utc::now());
        self.roles.insert(&role).await?;
        info!(role_id = %role.id, name = %role.name, "role created");
        Ok(role)
    }

    pub async fn list_roles(&self, request: PageRequest) -> Result<Page<Role>, ApiError> {
        Ok(self.roles.find_page(&Filter::all(), request).await?)
    }
}
