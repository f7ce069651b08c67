use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Utc};
use thumbtier_auth::{
    session::{SessionCookieManager, SessionManager, SessionStore},
    AuthenticationLayer,
};
use uuid::Uuid;

use thumbtier_db::{
    object_id::UserId,
    sessions::Session,
    tiers::Tier,
    users::UserWithTier,
    Store,
};

use crate::Error;

#[derive(Clone)]
pub struct SessionBackend {
    pub store: Arc<dyn Store>,
}

fn parse_session_id(id: &str) -> Result<Uuid, Error> {
    id.parse::<Uuid>().map_err(|_| Error::InvalidSessionId)
}

#[async_trait]
impl SessionStore for SessionBackend {
    type UserId = UserId;
    type SessionFetchData = UserWithTier;
    type Error = crate::Error;

    async fn create_session(
        &self,
        user_id: UserId,
        expires: DateTime<Utc>,
    ) -> Result<String, Self::Error> {
        let session_id = thumbtier_db::new_uuid();
        self.store
            .create_session(Session {
                session_id,
                user_id,
                expires,
            })
            .await?;

        Ok(session_id.to_string())
    }

    async fn get_session(&self, id: &str) -> Result<Option<UserWithTier>, Self::Error> {
        let session_id = parse_session_id(id)?;
        let user = self.store.get_session(session_id, Utc::now()).await?;
        Ok(user)
    }

    async fn delete_session(&self, id: &str) -> Result<(), Self::Error> {
        let session_id = parse_session_id(id)?;
        self.store.delete_session(session_id).await?;
        Ok(())
    }
}

/// The authenticated identity of a request.
#[derive(Clone, Debug)]
pub struct UserInfo {
    pub user_id: UserId,
    pub username: String,
    pub tier: Option<Tier>,
}

impl UserInfo {
    /// The key that namespaces this user's files.
    pub fn user_key(&self) -> String {
        self.user_id.to_string()
    }
}

impl From<UserWithTier> for UserInfo {
    fn from(u: UserWithTier) -> Self {
        UserInfo {
            user_id: u.user.user_id,
            username: u.user.username,
            tier: u.tier,
        }
    }
}

/// Extracting a `UserInfo` requires an authenticated request. Use `Option<UserInfo>` where
/// anonymous requests are allowed.
#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for UserInfo {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserInfo>()
            .cloned()
            .ok_or(Error::Unauthenticated)
    }
}

pub fn session_manager(
    store: Arc<dyn Store>,
    cookie_name: String,
    cookie_key_b64: Option<&str>,
    expire_days: i64,
) -> Result<SessionManager<SessionBackend>, Error> {
    Ok(SessionManager {
        store: SessionBackend { store },
        cookies: SessionCookieManager::new(cookie_name, cookie_key_b64)?,
        expire_days,
    })
}

pub fn auth_layer(
    sessions: SessionManager<SessionBackend>,
) -> AuthenticationLayer<SessionBackend, UserInfo> {
    AuthenticationLayer::new(sessions)
}
