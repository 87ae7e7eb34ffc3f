use commune_community::{User, UserProfile};
use commune_core::UserId;

/// The authenticated caller of a request.
///
/// Inserted into request extensions by the auth middleware; present for
/// every protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    user: User,
}

impl CurrentUser {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn id(&self) -> UserId {
        self.user.id
    }

    pub fn profile(&self) -> UserProfile {
        self.user.profile()
    }
}
