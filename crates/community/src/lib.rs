//! Community domain module: users, roles, communities and memberships.
//!
//! Entities and their input validation, implemented purely as deterministic
//! domain logic (no IO, no HTTP, no storage).

pub mod community;
pub mod member;
pub mod role;
pub mod user;
pub mod validation;

pub use community::{derive_slug, Community, NewCommunity};
pub use member::{Member, MemberAssignment, NewMember};
pub use role::{NewRole, Role};
pub use user::{Login, Registration, User, UserProfile};
pub use validation::{is_valid_email, ValidationErrors};
