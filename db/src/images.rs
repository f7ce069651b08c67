use chrono::{DateTime, Utc};
use diesel::prelude::*;

pub use crate::schema::images::*;
use crate::{
    enums::ImageFormat,
    object_id::{ImageId, UserId},
    schema::*,
};

#[derive(Clone, Debug, Queryable, Selectable, Identifiable, Insertable)]
#[diesel(table_name = images, primary_key(image_id))]
pub struct Image {
    pub image_id: ImageId,
    pub user_id: UserId,
    /// Path of the original in the blob store. Thumbnails sit beside it and have no rows.
    pub location: String,
    pub format: ImageFormat,
    pub created_at: DateTime<Utc>,
}
