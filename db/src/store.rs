use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::Result,
    expiring_images::ExpiringImage,
    images::Image,
    object_id::{ExpiringImageId, ImageId, UserId},
    sessions::Session,
    tiers::Tier,
    users::{User, UserWithTier},
};

/// Record persistence. Lookups of a single missing record fail with [crate::Error::NotFound].
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Round trip to the backing store.
    async fn ping(&self) -> Result<()>;

    async fn create_tier(&self, tier: Tier) -> Result<Tier>;
    async fn get_tier_by_name(&self, name: &str) -> Result<Tier>;
    async fn list_tiers(&self) -> Result<Vec<Tier>>;

    async fn create_user(&self, user: User) -> Result<User>;
    async fn get_user(&self, user_id: UserId) -> Result<UserWithTier>;
    async fn get_user_by_username(&self, username: &str) -> Result<UserWithTier>;

    async fn create_image(&self, image: Image) -> Result<Image>;
    async fn get_image_by_location(&self, location: &str) -> Result<Image>;
    /// The user's images, oldest first.
    async fn list_images(&self, user_id: UserId) -> Result<Vec<Image>>;
    async fn delete_image(&self, image_id: ImageId) -> Result<()>;

    async fn create_expiring_image(&self, image: ExpiringImage) -> Result<ExpiringImage>;
    async fn get_expiring_image_by_location(&self, location: &str) -> Result<ExpiringImage>;
    async fn list_expiring_images(&self, user_id: UserId) -> Result<Vec<ExpiringImage>>;
    async fn delete_expiring_image(&self, expiring_image_id: ExpiringImageId) -> Result<()>;

    async fn create_session(&self, session: Session) -> Result<()>;
    /// The owner of a session, if the session hasn't expired as of `now` and the owner is active.
    async fn get_session(&self, session_id: Uuid, now: DateTime<Utc>)
        -> Result<Option<UserWithTier>>;
    async fn delete_session(&self, session_id: Uuid) -> Result<()>;
}
