use std::{num::NonZeroU32, sync::Arc};

use bytes::Bytes;
use image::DynamicImage;
use thumbtier_db::ImageFormat;
use thumbtier_storage::Operator;
use tracing::instrument;

use crate::Error;

/// Downscale `source` to `height` and store it beside the original at
/// `<stem>_<height>px_thumbnail<ext>`, replacing any file already there.
/// Returns the thumbnail's location.
#[instrument(skip(blobs, source))]
pub async fn generate(
    blobs: &Operator,
    source_location: &str,
    source: Arc<DynamicImage>,
    format: ImageFormat,
    height: NonZeroU32,
) -> Result<String, Error> {
    let location = thumbtier_convert::thumbnail_location(source_location, height.get());
    let output = tokio::task::spawn_blocking(move || {
        thumbtier_convert::thumbnail(&source, height, format.into())
    })
    .await??;

    blobs.put(&location, Bytes::from(output)).await?;
    Ok(location)
}
