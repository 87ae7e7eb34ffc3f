use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use commune_community::{Login, Registration, User, UserProfile};
use commune_core::UserId;
use commune_infra::Filter;

use super::AppServices;
use crate::app::errors::ApiError;
use crate::context::CurrentUser;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// A signed-in user and the token that proves it.
#[derive(Debug, Clone)]
pub struct Session {
    pub profile: UserProfile,
    pub access_token: String,
}

impl AppServices {
    pub async fn register(&self, input: Registration) -> Result<Session, ApiError> {
        input.validate()?;

        let by_email = Filter::all().eq("email", &input.email);
        if self.users.find_one(&by_email).await?.is_some() {
            return Err(ApiError::Conflict("Email already exists".into()));
        }

        let credentials = Arc::clone(&self.credentials);
        let password = input.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || credentials.hash(&password))
            .await
            .map_err(|e| ApiError::internal(format!("hashing task failed: {e}")))??;

        let user = User::register(&input, password_hash, Utc::now());
        self.users.insert(&user).await?;
        info!(user_id = %user.id, "user registered");

        self.open_session(&user)
    }

    pub async fn login(&self, input: Login) -> Result<Session, ApiError> {
        input.validate()?;

        let by_email = Filter::all().eq("email", &input.email);
        let Some(user) = self.users.find_one(&by_email).await? else {
            debug!("login for unknown email");
            return Err(ApiError::InvalidCredentials(INVALID_CREDENTIALS.into()));
        };

        let credentials = Arc::clone(&self.credentials);
        let password = input.password;
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || credentials.verify(&password, &hash))
            .await
            .map_err(|e| ApiError::internal(format!("verification task failed: {e}")))?;

        if !matches {
            debug!(user_id = %user.id, "login with wrong password");
            return Err(ApiError::InvalidCredentials(INVALID_CREDENTIALS.into()));
        }

        info!(user_id = %user.id, "user signed in");
        self.open_session(&user)
    }

    /// Profile of the authenticated caller.
    pub fn me(&self, current: Option<&CurrentUser>) -> Result<UserProfile, ApiError> {
        current
            .map(CurrentUser::profile)
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    pub async fn find_user(&self, id: UserId) -> Result<Option<User>, ApiError> {
        Ok(self.users.find_one(&Filter::by_id(id)).await?)
    }

    fn open_session(&self, user: &User) -> Result<Session, ApiError> {
        let access_token = self.credentials.issue_token(user.id)?;
        Ok(Session {
            profile: user.profile(),
            access_token,
        })
    }
}
