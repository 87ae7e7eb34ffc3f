//! Communities and their owners.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use commune_core::{CommunityId, Entity, Timestamps, UserId};

use crate::validation::ValidationErrors;

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 128;
const SLUG_MAX: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    pub id: CommunityId,
    pub name: String,
    /// Unique across all communities.
    pub slug: String,
    pub owner: UserId,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Community {
    pub fn create(input: &NewCommunity, owner: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: CommunityId::new(),
            name: input.name.clone(),
            slug: derive_slug(&input.name),
            owner,
            timestamps: Timestamps::created(now),
        }
    }

    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner == user
    }
}

impl Entity for Community {
    type Id = CommunityId;

    fn id(&self) -> &CommunityId {
        &self.id
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }
}

/// Slug for a community name.
///
/// The slug is the name itself, so two communities cannot share a name.
pub fn derive_slug(name: &str) -> String {
    name.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewCommunity {
    pub name: String,
}

impl NewCommunity {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_length("name", &self.name, NAME_MIN, NAME_MAX);
        if derive_slug(&self.name).chars().count() > SLUG_MAX {
            errors.push(format!("slug must contain at most {SLUG_MAX} character(s)"));
        }
        errors.into_result()
    }
}
