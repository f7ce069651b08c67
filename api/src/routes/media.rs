use axum::{
    extract::Path,
    http::header,
    response::IntoResponse,
    routing::get,
    Extension, Router,
};
use bytes::Bytes;
use chrono::Utc;
use thumbtier_db::ImageFormat;

use crate::{access, auth::UserInfo, expiring, shared_state::State, Error};

/// Served files are labeled `image/jpeg` unless content type detection is turned on, in which
/// case the file's extension decides.
fn content_type(state: &State, file_name: &str) -> &'static str {
    if !state.detect_content_type {
        return ImageFormat::Jpeg.mime_type();
    }

    let (_, ext) = thumbtier_convert::split_extension(file_name);
    ext.strip_prefix('.')
        .and_then(ImageFormat::from_extension)
        .map(|f| f.mime_type())
        .unwrap_or("application/octet-stream")
}

fn image_response(state: &State, file_name: &str, bytes: Bytes) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, content_type(state, file_name))], bytes)
}

async fn get_expiring_image(
    Extension(ref state): Extension<State>,
    Path(file_name): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let bytes = expiring::fetch(state.store.as_ref(), &state.blobs, &file_name, Utc::now()).await?;
    Ok(image_response(state, &file_name, bytes))
}

async fn get_owned_image(
    Extension(ref state): Extension<State>,
    user: Option<UserInfo>,
    Path((user_key, file_name)): Path<(String, String)>,
) -> Result<impl IntoResponse, Error> {
    let bytes = access::fetch_owned(
        state.store.as_ref(),
        &state.blobs,
        user.as_ref(),
        &user_key,
        &file_name,
    )
    .await?;
    Ok(image_response(state, &file_name, bytes))
}

pub fn configure() -> Router {
    Router::new()
        .route(
            &format!("/{}/:file_name", expiring::EXPIRING_DIR),
            get(get_expiring_image),
        )
        .route("/:user_key/images/:file_name", get(get_owned_image))
}
