use bytes::Bytes;
use chrono::{DateTime, Utc};
use thumbtier_db::{
    self as db,
    expiring_images::ExpiringImage,
    object_id::{ExpiringImageId, UserId},
    Store,
};
use thumbtier_storage::{self as storage, Operator};
use tracing::{event, instrument, Level};

use crate::Error;

/// Expiring copies live here, shared by all users.
pub const EXPIRING_DIR: &str = "expiring-images";

/// How long an expiring link stays valid, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveTime(i32);

impl LiveTime {
    pub const MIN: i32 = 300;
    pub const MAX: i32 = 3000;

    pub fn new(seconds: i64) -> Result<Self, Error> {
        if !(i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&seconds) {
            return Err(Error::validation(
                "Live time must be between 300 and 3000 seconds",
            ));
        }

        Ok(Self(seconds as i32))
    }

    /// Validate the raw `live_time` form value.
    pub fn parse(raw: Option<&str>) -> Result<Self, Error> {
        let raw = raw.ok_or_else(|| Error::validation("No live_time field"))?;
        let seconds = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::validation("live_time must be an integer"))?;
        Self::new(seconds)
    }

    pub fn seconds(&self) -> i32 {
        self.0
    }
}

/// Store a copy of `source` under [EXPIRING_DIR] and record it with its live time.
#[instrument(skip(store, blobs, source))]
pub async fn mint(
    store: &dyn Store,
    blobs: &Operator,
    user_id: UserId,
    live_time: LiveTime,
    source: Bytes,
    file_name: &str,
) -> Result<ExpiringImage, Error> {
    let location = blobs
        .available_location(&format!("{EXPIRING_DIR}/{file_name}"))
        .await?;
    blobs.put(&location, source).await?;

    let record = store
        .create_expiring_image(ExpiringImage {
            expiring_image_id: ExpiringImageId::new(),
            user_id,
            location,
            live_time: live_time.seconds(),
            created_at: Utc::now(),
        })
        .await?;

    Ok(record)
}

/// Read an expiring image as of `now`. The first read after expiry deletes the record and
/// its copy.
#[instrument(skip(store, blobs))]
pub async fn fetch(
    store: &dyn Store,
    blobs: &Operator,
    file_name: &str,
    now: DateTime<Utc>,
) -> Result<Bytes, Error> {
    let location = format!("{EXPIRING_DIR}/{file_name}");
    let record = match store.get_expiring_image_by_location(&location).await {
        Ok(record) => record,
        Err(db::Error::NotFound) => return Err(Error::NotFound("Image does not exist")),
        Err(e) => return Err(e.into()),
    };

    if record.is_expired_at(now) {
        event!(Level::INFO, location = %record.location, "Deleting expired image");
        store
            .delete_expiring_image(record.expiring_image_id)
            .await?;
        if let Err(e) = blobs.delete(&record.location).await {
            event!(Level::WARN, location = %record.location, error = %e, "Failed to delete expired image file");
        }
        return Err(Error::NotFound("Image has expired"));
    }

    let path = match record.location.rsplit_once('/') {
        Some((dir, _)) => format!("{dir}/{file_name}"),
        None => file_name.to_string(),
    };

    match blobs.get(&path).await {
        Ok(bytes) => Ok(bytes),
        Err(storage::Error::NotFound(_)) => Err(Error::NotFound("Image not found")),
        Err(e) => Err(e.into()),
    }
}
