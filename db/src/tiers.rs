use diesel::prelude::*;
use serde::Serialize;

pub use crate::schema::tiers::*;
use crate::{object_id::TierId, schema::*};

#[derive(Clone, Debug, PartialEq, Eq, Queryable, Selectable, Identifiable, Insertable, Serialize)]
#[diesel(table_name = tiers, primary_key(tier_id))]
pub struct Tier {
    pub tier_id: TierId,
    pub name: String,
    /// The single thumbnail height for tiers without a built-in size list.
    pub thumbnail_height: Option<i32>,
    pub presence_of_original_file_link: bool,
    pub ability_to_fetch_expiring_link: bool,
}
