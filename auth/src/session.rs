use async_trait::async_trait;
use axum::{http::Request, response::IntoResponse, response::Response};
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use tower_cookies::{
    cookie::{Cookie, SameSite},
    Cookies, Key,
};
use tracing::{event, Level};

use crate::{
    error::Error,
    extract_token::{extract_bearer_auth_value, extract_from_cookie},
};

#[async_trait]
pub trait SessionStore: Clone + Send + Sync + 'static {
    type UserId: Send + 'static;
    type SessionFetchData: Send + 'static;
    type Error: IntoResponse + From<Error> + Send + 'static;

    async fn create_session(
        &self,
        user_id: Self::UserId,
        expires: DateTime<Utc>,
    ) -> Result<String, Self::Error>;

    /// Look up a live session. Unknown and expired sessions return `None`.
    async fn get_session(&self, id: &str) -> Result<Option<Self::SessionFetchData>, Self::Error>;

    async fn delete_session(&self, id: &str) -> Result<(), Self::Error>;
}

#[derive(Clone)]
pub struct SessionCookieManager {
    pub signing_key: Key,
    pub cookie_name: String,
}

impl std::fmt::Debug for SessionCookieManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCookieManager")
            .field("cookie_name", &self.cookie_name)
            .finish_non_exhaustive()
    }
}

impl SessionCookieManager {
    /// Build the signing key from base64-encoded bytes, or generate a random one. A random key
    /// invalidates existing cookies whenever the process restarts.
    pub fn new(cookie_name: String, key_b64: Option<&str>) -> Result<Self, Error> {
        let signing_key = match key_b64 {
            Some(encoded) => {
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(encoded)
                    .map_err(|e| Error::InvalidCookieKey(e.to_string()))?;
                Key::try_from(bytes.as_slice())
                    .map_err(|e| Error::InvalidCookieKey(e.to_string()))?
            }
            None => {
                event!(Level::WARN, "No cookie key configured, generating one");
                Key::generate()
            }
        };

        Ok(Self {
            signing_key,
            cookie_name,
        })
    }

    pub fn get<B>(&self, req: &Request<B>) -> Option<String> {
        extract_from_cookie(req, &self.signing_key, &self.cookie_name)
    }

    pub fn set(&self, cookies: &Cookies, value: String, expire_days: i64) {
        let cookie = Cookie::build((self.cookie_name.clone(), value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::days(expire_days))
            .build();
        cookies.signed(&self.signing_key).add(cookie);
    }

    pub fn clear(&self, cookies: &Cookies) {
        let cookie = Cookie::build((self.cookie_name.clone(), "")).path("/").build();
        cookies.signed(&self.signing_key).remove(cookie);
    }
}

#[derive(Clone)]
pub struct SessionManager<STORE: SessionStore> {
    pub store: STORE,
    pub cookies: SessionCookieManager,
    pub expire_days: i64,
}

impl<STORE: SessionStore> SessionManager<STORE> {
    /// The session ID sent with the request, from a bearer token or else the session cookie.
    /// A malformed authorization header is rejected outright.
    pub fn session_id<B>(&self, req: &Request<B>) -> Result<Option<String>, Response> {
        if let Some(token) = extract_bearer_auth_value(req)? {
            return Ok(Some(token));
        }

        Ok(self.cookies.get(req))
    }

    pub async fn get_session(
        &self,
        id: &str,
    ) -> Result<Option<STORE::SessionFetchData>, STORE::Error> {
        self.store.get_session(id).await
    }

    /// Start a new session, set its cookie, and return its ID.
    pub async fn login(
        &self,
        cookies: &Cookies,
        user_id: STORE::UserId,
    ) -> Result<String, STORE::Error> {
        let expires = Utc::now() + Duration::days(self.expire_days);
        let session_id = self.store.create_session(user_id, expires).await?;
        self.cookies
            .set(cookies, session_id.clone(), self.expire_days);
        Ok(session_id)
    }

    pub async fn logout(&self, cookies: &Cookies, session_id: &str) -> Result<(), STORE::Error> {
        self.store.delete_session(session_id).await?;
        self.cookies.clear(cookies);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn short_cookie_key_rejected() {
        let key = base64::engine::general_purpose::STANDARD.encode([1u8; 16]);
        let result = SessionCookieManager::new("sid".to_string(), Some(&key));
        assert_matches!(result, Err(Error::InvalidCookieKey(_)));
    }

    #[test]
    fn cookie_key_from_base64() {
        let key = base64::engine::general_purpose::STANDARD.encode([7u8; 64]);
        let manager = SessionCookieManager::new("sid".to_string(), Some(&key)).unwrap();
        assert_eq!(manager.signing_key.master(), &[7u8; 64][..]);
    }

    #[test]
    fn debug_output_hides_key() {
        let key = base64::engine::general_purpose::STANDARD.encode([7u8; 64]);
        let manager = SessionCookieManager::new("sid".to_string(), Some(&key)).unwrap();
        let output = format!("{manager:?}");
        assert!(output.contains("sid"));
        assert!(!output.contains("signing_key"));
        assert!(!output.contains('7'), "{output}");
    }

    #[test]
    fn bad_base64_rejected() {
        let result = SessionCookieManager::new("sid".to_string(), Some("not base64!"));
        assert_matches!(result, Err(Error::InvalidCookieKey(_)));
    }
}
