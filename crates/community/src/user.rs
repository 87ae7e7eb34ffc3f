//! User accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use commune_auth::PasswordPolicy;
use commune_core::{Entity, Timestamps, UserId};

use crate::validation::{is_valid_email, ValidationErrors};

const NAME_MAX: usize = 64;
const EMAIL_MAX: usize = 128;
const LOGIN_PASSWORD_MIN: usize = 6;

// ─────────────────────────────────────────────────────────────────────────────
// Entity
// ─────────────────────────────────────────────────────────────────────────────

/// A registered account.
///
/// `password_hash` is the stored credential; it must never be rendered in a
/// response. Use [`UserProfile`] for anything client-facing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl User {
    /// Build a new account from a validated registration and an already
    /// hashed password.
    pub fn register(registration: &Registration, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            name: registration.name.clone(),
            email: registration.email.clone(),
            password_hash,
            timestamps: Timestamps::created(now),
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.timestamps.created_at,
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &UserId {
        &self.id
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: Option<String>,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Inputs
// ─────────────────────────────────────────────────────────────────────────────

/// Sign-up input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Registration {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(name) = &self.name {
            errors.check_length("name", name, 1, NAME_MAX);
        }
        check_email(&mut errors, &self.email);
        errors.extend(PasswordPolicy::default().check(&self.password));

        errors.into_result()
    }
}

/// Sign-in input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Login {
    pub email: String,
    pub password: String,
}

impl Login {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        check_email(&mut errors, &self.email);
        if self.password.chars().count() < LOGIN_PASSWORD_MIN {
            errors.push(format!(
                "password must contain at least {LOGIN_PASSWORD_MIN} character(s)"
            ));
        }

        errors.into_result()
    }
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if email.chars().count() > EMAIL_MAX || !is_valid_email(email) {
        errors.push("Please enter a valid email");
    }
}
