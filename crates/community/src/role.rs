//! Roles a member can hold inside a community.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use commune_core::{Entity, RoleId, Timestamps};

use crate::validation::ValidationErrors;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Role {
    pub fn create(input: &NewRole, now: DateTime<Utc>) -> Self {
        Self {
            id: RoleId::new(),
            name: input.name.clone(),
            timestamps: Timestamps::created(now),
        }
    }
}

impl Entity for Role {
    type Id = RoleId;

    fn id(&self) -> &RoleId {
        &self.id
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewRole {
    pub name: String,
}

impl NewRole {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_length("name", &self.name, 2, 128);
        errors.into_result()
    }
}
