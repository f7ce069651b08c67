use axum::Router;

mod health;
mod images;
mod media;
mod users;

/// The path the media routes are served under, taken from the link base. A base with a scheme
/// and host only contributes its path.
pub fn media_mount_path(media_url_base: &str) -> &str {
    let path = match media_url_base.split_once("://") {
        Some((_, rest)) => rest.find('/').map(|i| &rest[i..]).unwrap_or(""),
        None => media_url_base,
    };
    path.trim_end_matches('/')
}

pub fn configure_routes(router: Router, media_url_base: &str) -> Router {
    let media_path = media_mount_path(media_url_base);
    let router = router
        .merge(health::configure())
        .nest("/images", images::configure())
        .nest("/users", users::configure());

    if media_path.is_empty() {
        router.merge(media::configure())
    } else {
        router.nest(media_path, media::configure())
    }
}
