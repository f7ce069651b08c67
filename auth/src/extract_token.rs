use axum::{
    http::{header::AUTHORIZATION, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thumbtier_http_errors::ErrorResponseData;
use tower_cookies::{Cookies, Key};

pub fn invalid_message() -> Response {
    // Intentionally vague error message
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponseData::new("authn", "Unauthorized")),
    )
        .into_response()
}

pub fn extract_bearer_auth_value<B>(req: &Request<B>) -> Result<Option<String>, Response> {
    match req.headers().get(AUTHORIZATION) {
        None => Ok(None),
        Some(value) => {
            let (auth_type, token) = value
                .to_str()
                .map_err(|_| invalid_message())?
                .split_once(' ')
                .ok_or_else(invalid_message)?;

            if auth_type != "Bearer" || token.is_empty() {
                return Err(invalid_message());
            }

            Ok(Some(token.to_string()))
        }
    }
}

/// Read a signed cookie from the [Cookies] that the cookie manager layer placed in the request.
/// Cookies with a bad signature are ignored.
pub fn extract_from_cookie<B>(req: &Request<B>, key: &Key, cookie_name: &str) -> Option<String> {
    req.extensions()
        .get::<Cookies>()
        .and_then(|cookies| cookies.signed(key).get(cookie_name))
        .map(|cookie| cookie.value().to_string())
}
