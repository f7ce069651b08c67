use bytes::Bytes;
use thumbtier_db::{self as db, Store};
use thumbtier_storage::{self as storage, Operator};
use tracing::instrument;

use crate::{auth::UserInfo, Error};

/// The directory holding a user's originals and their thumbnails.
pub fn images_dir(user_key: &str) -> String {
    format!("{user_key}/images")
}

/// Only the owner may read files under their key. Anonymous requests never match.
pub fn authorize(user: Option<&UserInfo>, user_key: &str) -> Result<(), Error> {
    match user {
        Some(user) if user.user_key() == user_key => Ok(()),
        _ => Err(Error::Forbidden),
    }
}

/// Read a file from the owner's image directory. Originals are found through their records;
/// anything else in the directory, such as a thumbnail, by its exact name.
#[instrument(skip(store, blobs, user), fields(user_id = ?user.map(|u| &u.user_id)))]
pub async fn fetch_owned(
    store: &dyn Store,
    blobs: &Operator,
    user: Option<&UserInfo>,
    user_key: &str,
    file_name: &str,
) -> Result<Bytes, Error> {
    authorize(user, user_key)?;

    let dir = images_dir(user_key);
    let location = format!("{dir}/{file_name}");

    let found = match store.get_image_by_location(&location).await {
        Ok(image) => Some(image.location),
        Err(db::Error::NotFound) => blobs
            .list(&dir)
            .await?
            .into_iter()
            .find(|name| name == file_name)
            .map(|name| format!("{dir}/{name}")),
        Err(e) => return Err(e.into()),
    };

    let Some(path) = found else {
        return Err(Error::NotFound("Image not found"));
    };

    match blobs.get(&path).await {
        Ok(bytes) => Ok(bytes),
        Err(storage::Error::NotFound(_)) => Err(Error::NotFound("Image not found")),
        Err(e) => Err(e.into()),
    }
}
