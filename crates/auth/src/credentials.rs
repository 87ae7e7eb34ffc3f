//! Credential service: password hashing plus bearer token issuance.
//!
//! The signing key is injected at construction; nothing here reads process
//! configuration.

use std::collections::HashSet;
use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use commune_core::UserId;

use crate::claims::{validate_claims, AccessClaims, TokenValidationError};
use crate::password;

/// bcrypt cost used when none is configured.
pub const DEFAULT_HASH_COST: u32 = 10;

/// Lifetime of an issued access token.
pub const TOKEN_TTL_DAYS: i64 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Hashes passwords and signs/verifies HS256 access tokens.
#[derive(Clone)]
pub struct Credentials {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    hash_cost: u32,
    token_ttl: Duration,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("hash_cost", &self.hash_cost)
            .field("token_ttl", &self.token_ttl)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();

        // Expiry is checked by `validate_claims` so the window logic lives in one place.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims =
            HashSet::from(["exp".to_string(), "sub".to_string()]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            hash_cost: DEFAULT_HASH_COST,
            token_ttl: Duration::days(TOKEN_TTL_DAYS),
        }
    }

    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn hash_cost(&self) -> u32 {
        self.hash_cost
    }

    /// One-way salted hash of a plaintext password.
    pub fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        password::hash_password(plaintext, self.hash_cost)
    }

    /// `true` only when `plaintext` produced `hash`.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        password::verify_password(plaintext, hash)
    }

    /// Sign a token for `user_id`, valid for the configured lifetime.
    pub fn issue_token(&self, user_id: UserId) -> Result<String, CredentialError> {
        let now = Utc::now();
        let claims = AccessClaims::new(user_id, now, now + self.token_ttl);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| CredentialError::Signing(e.to_string()))
    }

    /// Check signature and validity window, returning the embedded claims.
    pub fn verify_token(&self, token: &str) -> Result<AccessClaims, CredentialError> {
        let data = decode::<AccessClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| CredentialError::InvalidToken(e.to_string()))?;

        validate_claims(&data.claims, Utc::now())?;
        Ok(data.claims)
    }
}
