//! `commune-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the domain error model, the entity contract and the shared
//! pagination policy.

pub mod entity;
pub mod error;
pub mod id;
pub mod pagination;

pub use entity::{Entity, Timestamps};
pub use error::DomainError;
pub use id::{CommunityId, MemberId, RoleId, UserId};
pub use pagination::{Page, PageMeta, PageRequest, PAGE_SIZE};
