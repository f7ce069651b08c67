use chrono::{DateTime, Utc};
use diesel::prelude::*;

pub use crate::schema::users::*;
use crate::{
    object_id::{TierId, UserId},
    schema::*,
    tiers::Tier,
};

#[derive(Clone, Debug, Queryable, Selectable, Identifiable, Insertable)]
#[diesel(table_name = users, primary_key(user_id))]
pub struct User {
    pub user_id: UserId,
    pub username: String,
    pub password_hash: String,
    pub tier_id: Option<TierId>,
    pub is_active: bool,
    pub created: DateTime<Utc>,
}

/// A user along with the tier it references, if any.
#[derive(Clone, Debug)]
pub struct UserWithTier {
    pub user: User,
    pub tier: Option<Tier>,
}
