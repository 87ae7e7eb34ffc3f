//! Collection bindings for the community entities.

use commune_community::{Community, Member, Role, User};

use crate::store::postgres::CollectionSpec;
use crate::store::Document;

impl Document for User {
    const COLLECTION: &'static str = "users";
    const UNIQUE_FIELDS: &'static [&'static str] = &["id", "email"];
}

impl Document for Role {
    const COLLECTION: &'static str = "roles";
    const UNIQUE_FIELDS: &'static [&'static str] = &["id", "name"];
}

impl Document for Community {
    const COLLECTION: &'static str = "communities";
    const UNIQUE_FIELDS: &'static [&'static str] = &["id", "slug"];
}

/// Members carry no uniqueness beyond their id; a user may be added twice.
impl Document for Member {
    const COLLECTION: &'static str = "members";
    const UNIQUE_FIELDS: &'static [&'static str] = &["id"];
}

/// Every collection the application stores, for backend migrations.
pub fn collections() -> [CollectionSpec; 4] {
    [
        CollectionSpec::of::<User>(),
        CollectionSpec::of::<Role>(),
        CollectionSpec::of::<Community>(),
        CollectionSpec::of::<Member>(),
    ]
}
