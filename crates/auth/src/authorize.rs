use thiserror::Error;

/// Role name that lets a member manage other members of the same community.
pub const COMMUNITY_MODERATOR: &str = "Community Moderator";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("Not Allowed Access")]
    Forbidden,
}

/// The caller's relationship to a community, as resolved by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MembershipStanding {
    /// The caller owns the community.
    pub is_owner: bool,
    /// The caller is a member holding [`COMMUNITY_MODERATOR`] there.
    pub is_moderator: bool,
}

impl MembershipStanding {
    pub fn owner() -> Self {
        Self {
            is_owner: true,
            is_moderator: false,
        }
    }

    pub fn moderator() -> Self {
        Self {
            is_owner: false,
            is_moderator: true,
        }
    }
}

/// Only the owner may add members.
///
/// - No IO
/// - No panics
pub fn authorize_member_assignment(standing: MembershipStanding) -> Result<(), AuthzError> {
    if standing.is_owner {
        Ok(())
    } else {
        Err(AuthzError::Forbidden)
    }
}

/// The owner or a moderator of the member's community may remove it.
pub fn authorize_member_removal(standing: MembershipStanding) -> Result<(), AuthzError> {
    if standing.is_owner || standing.is_moderator {
        Ok(())
    } else {
        Err(AuthzError::Forbidden)
    }
}
