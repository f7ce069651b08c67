use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Password hashing error: {0}")]
    PasswordHasherError(String),

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Invalid session id")]
    InvalidSessionId,

    #[error("Invalid cookie key: {0}")]
    InvalidCookieKey(String),

    #[error("Missing credentials")]
    MissingCredentials,
}
