use std::sync::Arc;

use bytes::Bytes;
use image::DynamicImage;
use serde::{ser::SerializeMap, Serialize, Serializer};
use thumbtier_db::images::Image;
use tracing::{event, instrument, Level};

use crate::{
    auth::UserInfo,
    expiring::{self, LiveTime},
    shared_state::InnerState,
    thumbnail,
    tiers::TierPolicy,
    Error,
};

/// An uploaded original, both as stored and as decoded.
pub struct Source {
    pub decoded: Arc<DynamicImage>,
    pub bytes: Bytes,
}

/// Upload form fields beyond the file itself.
#[derive(Debug, Default)]
pub struct UploadPayload {
    pub live_time: Option<String>,
}

/// Links produced by an upload, serialized as a flat object in insertion order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UploadResult(Vec<(String, String)>);

impl UploadResult {
    fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }
}

impl Serialize for UploadResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Run the pipeline that `user`'s tier calls for on an image that has already been stored and
/// recorded. A failure part way through leaves earlier outputs in place.
#[instrument(skip(state, user, image, source, payload), fields(user_id = %user.user_id, location = %image.location))]
pub async fn process(
    state: &InnerState,
    user: &UserInfo,
    image: &Image,
    source: Source,
    payload: &UploadPayload,
) -> Result<UploadResult, Error> {
    let policy = TierPolicy::for_tier(user.tier.as_ref())?;
    event!(Level::DEBUG, ?policy, "Resolved tier policy");

    let mut result = UploadResult::default();

    for height in policy.sizes() {
        let location = thumbnail::generate(
            &state.blobs,
            &image.location,
            source.decoded.clone(),
            image.format,
            height,
        )
        .await?;
        result.insert(format!("{height}px_thumbnail"), state.media_url(&location));
    }

    if policy.expose_original() {
        result.insert("original_image", state.media_url(&image.location));
    }

    if policy.allow_expiring_link() {
        let live_time = LiveTime::parse(payload.live_time.as_deref())?;
        let file_name = image
            .location
            .rsplit_once('/')
            .map(|(_, name)| name)
            .unwrap_or(&image.location);

        let expiring = expiring::mint(
            state.store.as_ref(),
            &state.blobs,
            user.user_id,
            live_time,
            source.bytes,
            file_name,
        )
        .await?;
        result.insert(
            format!("{}s_expiring_link", live_time.seconds()),
            state.media_url(&expiring.location),
        );
    }

    result.insert("success", "Image uploaded successfully");
    Ok(result)
}
