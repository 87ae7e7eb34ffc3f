//! `commune-auth`: credentials and access decisions.
//!
//! This crate is intentionally decoupled from HTTP and storage: it hashes and
//! verifies passwords, issues and verifies bearer tokens, and decides whether
//! a caller may manage a community's members.

pub mod authorize;
pub mod claims;
pub mod credentials;
pub mod password;

pub use authorize::{
    authorize_member_assignment, authorize_member_removal, AuthzError, MembershipStanding,
    COMMUNITY_MODERATOR,
};
pub use claims::{validate_claims, AccessClaims, TokenValidationError};
pub use credentials::{CredentialError, Credentials, DEFAULT_HASH_COST, TOKEN_TTL_DAYS};
pub use password::{PasswordPolicy, PASSWORD_SYMBOLS};
