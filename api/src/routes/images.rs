use std::sync::Arc;

use axum::{
    extract::Multipart,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thumbtier_db::{images::Image, object_id::ImageId, ImageFormat};
use tracing::{event, instrument, Level};

use crate::{
    access,
    auth::UserInfo,
    dispatch::{self, Source, UploadPayload},
    shared_state::State,
    Error,
};

const IMAGE_FIELD: &str = "original_image";
const LIVE_TIME_FIELD: &str = "live_time";

const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";
const UNSUPPORTED_FORMAT: &str = "Image format not supported";

/// Reduce a client-supplied file name to something safe to use as a single path segment.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect::<String>();

    if cleaned.trim_matches('.').is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

struct UploadForm {
    file: Option<(String, Bytes)>,
    payload: UploadPayload,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, Error> {
    let mut form = UploadForm {
        file: None,
        payload: UploadPayload::default(),
    };

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(IMAGE_FIELD) => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                form.file = Some((file_name, bytes));
            }
            Some(LIVE_TIME_FIELD) => {
                form.payload.live_time = Some(field.text().await?);
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Check the upload is a jpeg or png, and that its name and its content agree on which.
fn validate_format(file_name: &str, bytes: &[u8]) -> Result<ImageFormat, Error> {
    let (_, ext) = thumbtier_convert::split_extension(file_name);
    let named = ext
        .strip_prefix('.')
        .and_then(ImageFormat::from_extension)
        .ok_or_else(|| Error::validation(UNSUPPORTED_FORMAT))?;

    let detected = match image::guess_format(bytes) {
        Ok(image::ImageFormat::Jpeg) => ImageFormat::Jpeg,
        Ok(image::ImageFormat::Png) => ImageFormat::Png,
        _ => return Err(Error::validation(UNSUPPORTED_FORMAT)),
    };

    if named != detected {
        event!(Level::INFO, ?named, ?detected, "Upload extension does not match its content");
        return Err(Error::validation(UNSUPPORTED_FORMAT));
    }

    Ok(detected)
}

#[instrument(skip_all, fields(user_id = %user.user_id))]
async fn upload_image(
    Extension(ref state): Extension<State>,
    user: UserInfo,
    multipart: Multipart,
) -> Result<impl IntoResponse, Error> {
    let UploadForm { file, payload } = read_form(multipart).await?;
    let (file_name, bytes) = file
        .filter(|(_, bytes)| !bytes.is_empty())
        .ok_or_else(|| Error::validation("No file was submitted"))?;

    let decode_bytes = bytes.clone();
    let decoded =
        tokio::task::spawn_blocking(move || thumbtier_convert::image_from_bytes(&decode_bytes))
            .await?
            .map_err(|e| {
                event!(Level::INFO, error = %e, "Upload did not decode");
                Error::validation(INVALID_IMAGE)
            })?;

    let file_name = sanitize_file_name(&file_name);
    let format = validate_format(&file_name, &bytes)?;

    let dir = access::images_dir(&user.user_key());
    let location = state
        .blobs
        .available_location(&format!("{dir}/{file_name}"))
        .await?;
    state.blobs.put(&location, bytes.clone()).await?;

    let image = state
        .store
        .create_image(Image {
            image_id: ImageId::new(),
            user_id: user.user_id,
            location,
            format,
            created_at: Utc::now(),
        })
        .await?;
    event!(Level::INFO, image_id = %image.image_id, location = %image.location, "Stored upload");

    let source = Source {
        decoded: Arc::new(decoded),
        bytes,
    };
    let result = dispatch::process(state, &user, &image, source, &payload).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

#[derive(Serialize)]
struct ImageListItem {
    pk: ImageId,
    original_image: String,
    created_at: DateTime<Utc>,
}

async fn list_images(
    Extension(ref state): Extension<State>,
    user: UserInfo,
) -> Result<impl IntoResponse, Error> {
    let images = state.store.list_images(user.user_id).await?;
    if images.is_empty() {
        return Err(Error::NotFound("No images found"));
    }

    let items = images
        .into_iter()
        .map(|image| ImageListItem {
            pk: image.image_id,
            original_image: state.media_url(&image.location),
            created_at: image.created_at,
        })
        .collect::<Vec<_>>();

    Ok(Json(items))
}

pub fn configure() -> Router {
    Router::new().route("/", get(list_images).post(upload_image))
}
