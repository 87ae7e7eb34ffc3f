//! Memberships: "user X holds role R in community C".

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use commune_core::{CommunityId, Entity, MemberId, RoleId, Timestamps, UserId};

use crate::validation::ValidationErrors;

/// A membership row.
///
/// Nothing prevents the same user from being added to a community twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub community: CommunityId,
    pub user: UserId,
    pub role: RoleId,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Member {
    pub fn create(assignment: MemberAssignment, now: DateTime<Utc>) -> Self {
        Self {
            id: MemberId::new(),
            community: assignment.community,
            user: assignment.user,
            role: assignment.role,
            timestamps: Timestamps::created(now),
        }
    }
}

impl Entity for Member {
    type Id = MemberId;

    fn id(&self) -> &MemberId {
        &self.id
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }
}

/// Raw "add member" input, as received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewMember {
    pub community: String,
    pub user: String,
    pub role: String,
}

/// A validated "add member" request with parsed references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberAssignment {
    pub community: CommunityId,
    pub user: UserId,
    pub role: RoleId,
}

impl NewMember {
    pub fn validate(&self) -> Result<MemberAssignment, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let community = reference::<CommunityId>(&mut errors, "community", &self.community);
        let user = reference::<UserId>(&mut errors, "user", &self.user);
        let role = reference::<RoleId>(&mut errors, "role", &self.role);

        match (community, user, role) {
            (Some(community), Some(user), Some(role)) => Ok(MemberAssignment {
                community,
                user,
                role,
            }),
            _ => Err(errors),
        }
    }
}

fn reference<T: FromStr>(errors: &mut ValidationErrors, field: &str, raw: &str) -> Option<T> {
    if raw.trim().is_empty() {
        errors.push(format!("{field} is required"));
        return None;
    }
    match raw.parse::<T>() {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push(format!("{field} must be a valid identifier"));
            None
        }
    }
}
