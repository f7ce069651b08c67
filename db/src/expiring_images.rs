use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;

pub use crate::schema::expiring_images::*;
use crate::{
    object_id::{ExpiringImageId, UserId},
    schema::*,
};

#[derive(Clone, Debug, Queryable, Selectable, Identifiable, Insertable)]
#[diesel(table_name = expiring_images, primary_key(expiring_image_id))]
pub struct ExpiringImage {
    pub expiring_image_id: ExpiringImageId,
    pub user_id: UserId,
    pub location: String,
    /// Seconds after `created_at` during which the image may be fetched.
    pub live_time: i32,
    pub created_at: DateTime<Utc>,
}

impl ExpiringImage {
    /// True once strictly more than `live_time` seconds have passed since creation.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at > Duration::seconds(i64::from(self.live_time))
    }
}
