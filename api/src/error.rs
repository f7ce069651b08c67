use std::borrow::Cow;

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use thumbtier_db as db;
use thumbtier_http_errors::ErrorResponseData;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Database Error: {0}")]
    Db(#[from] db::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] thumbtier_storage::Error),

    #[error("Failed to write image: {0}")]
    Encode(#[from] thumbtier_convert::EncodeError),

    #[error("{0}")]
    Validation(Cow<'static, str>),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("Forbidden")]
    Forbidden,

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Invalid session id")]
    InvalidSessionId,

    #[error("{0}")]
    LoginFailed(&'static str),

    #[error("Tier misconfigured: {0}")]
    TierMisconfigured(String),

    #[error("Invalid upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Background task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Auth error: {0}")]
    AuthError(#[from] thumbtier_auth::Error),
}

impl Error {
    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Error::Validation(message.into())
    }

    fn error_kind(&self) -> &'static str {
        match self {
            Error::Db(db::Error::NotFound) => "not_found",
            Error::Db(_) => "db",
            Error::Storage(_) => "storage",
            Error::Encode(_) => "image_encode",
            Error::Validation(_) => "validation",
            Error::NotFound(_) => "not_found",
            Error::Forbidden => "forbidden",
            Error::Unauthenticated => "authn",
            Error::InvalidSessionId => "authn",
            Error::LoginFailed(_) => "login_failed",
            Error::TierMisconfigured(_) => "tier_misconfigured",
            Error::Multipart(_) => "bad_request",
            Error::TaskJoin(_) => "internal_server_error",
            Error::AuthError(thumbtier_auth::Error::InvalidSessionId) => "authn",
            Error::AuthError(_) => "internal_server_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Multipart(e) => e.status(),
            Error::NotFound(_) | Error::LoginFailed(_) | Error::Db(db::Error::NotFound) => {
                StatusCode::NOT_FOUND
            }
            Error::Forbidden | Error::Unauthenticated => StatusCode::FORBIDDEN,
            Error::InvalidSessionId
            | Error::AuthError(thumbtier_auth::Error::InvalidSessionId) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn response_tuple(&self) -> (StatusCode, ErrorResponseData) {
        (
            self.status_code(),
            ErrorResponseData::new(self.error_kind(), self.to_string()),
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (code, json) = self.response_tuple();
        (code, Json(json)).into_response()
    }
}
