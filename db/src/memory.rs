use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    expiring_images::ExpiringImage,
    images::Image,
    object_id::{ExpiringImageId, ImageId, UserId},
    sessions::Session,
    store::Store,
    tiers::Tier,
    users::{User, UserWithTier},
};

#[derive(Default)]
struct Tables {
    tiers: Vec<Tier>,
    users: Vec<User>,
    images: Vec<Image>,
    expiring_images: Vec<ExpiringImage>,
    sessions: Vec<Session>,
}

impl Tables {
    fn with_tier(&self, user: &User) -> UserWithTier {
        let tier = user
            .tier_id
            .and_then(|id| self.tiers.iter().find(|t| t.tier_id == id))
            .cloned();
        UserWithTier {
            user: user.clone(),
            tier,
        }
    }
}

/// [Store] kept entirely in process memory, with the same constraints as the database schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // Every operation leaves the tables consistent, so a poisoned lock is still usable.
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn create_tier(&self, tier: Tier) -> Result<Tier> {
        let mut tables = self.tables();
        if tables.tiers.iter().any(|t| t.name == tier.name) {
            return Err(Error::Conflict("tiers_name_key".to_string()));
        }
        if matches!(tier.thumbnail_height, Some(h) if h <= 0) {
            return Err(Error::Constraint(
                "tiers_thumbnail_height_check".to_string(),
            ));
        }

        tables.tiers.push(tier.clone());
        Ok(tier)
    }

    async fn get_tier_by_name(&self, name: &str) -> Result<Tier> {
        self.tables()
            .tiers
            .iter()
            .find(|t| t.name == name)
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn list_tiers(&self) -> Result<Vec<Tier>> {
        let mut tiers = self.tables().tiers.clone();
        tiers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tiers)
    }

    async fn create_user(&self, user: User) -> Result<User> {
        let mut tables = self.tables();
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(Error::Conflict("users_username_key".to_string()));
        }

        tables.users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: UserId) -> Result<UserWithTier> {
        let tables = self.tables();
        tables
            .users
            .iter()
            .find(|u| u.user_id == user_id)
            .map(|u| tables.with_tier(u))
            .ok_or(Error::NotFound)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<UserWithTier> {
        let tables = self.tables();
        tables
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| tables.with_tier(u))
            .ok_or(Error::NotFound)
    }

    async fn create_image(&self, image: Image) -> Result<Image> {
        self.tables().images.push(image.clone());
        Ok(image)
    }

    async fn get_image_by_location(&self, location: &str) -> Result<Image> {
        self.tables()
            .images
            .iter()
            .find(|i| i.location == location)
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn list_images(&self, user_id: UserId) -> Result<Vec<Image>> {
        let mut images = self
            .tables()
            .images
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect::<Vec<_>>();
        images.sort_by_key(|i| (i.created_at, i.image_id));
        Ok(images)
    }

    async fn delete_image(&self, image_id: ImageId) -> Result<()> {
        self.tables().images.retain(|i| i.image_id != image_id);
        Ok(())
    }

    async fn create_expiring_image(&self, image: ExpiringImage) -> Result<ExpiringImage> {
        if !(300..=3000).contains(&image.live_time) {
            return Err(Error::Constraint(
                "expiring_images_live_time_check".to_string(),
            ));
        }

        self.tables().expiring_images.push(image.clone());
        Ok(image)
    }

    async fn get_expiring_image_by_location(&self, location: &str) -> Result<ExpiringImage> {
        self.tables()
            .expiring_images
            .iter()
            .find(|i| i.location == location)
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn list_expiring_images(&self, user_id: UserId) -> Result<Vec<ExpiringImage>> {
        let mut images = self
            .tables()
            .expiring_images
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect::<Vec<_>>();
        images.sort_by_key(|i| (i.created_at, i.expiring_image_id));
        Ok(images)
    }

    async fn delete_expiring_image(&self, expiring_image_id: ExpiringImageId) -> Result<()> {
        self.tables()
            .expiring_images
            .retain(|i| i.expiring_image_id != expiring_image_id);
        Ok(())
    }

    async fn create_session(&self, session: Session) -> Result<()> {
        self.tables().sessions.push(session);
        Ok(())
    }

    async fn get_session(
        &self,
        session_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<UserWithTier>> {
        let tables = self.tables();
        let found = tables
            .sessions
            .iter()
            .find(|s| s.session_id == session_id && s.expires > now)
            .and_then(|s| {
                tables
                    .users
                    .iter()
                    .find(|u| u.user_id == s.user_id && u.is_active)
            })
            .map(|u| tables.with_tier(u));
        Ok(found)
    }

    async fn delete_session(&self, session_id: Uuid) -> Result<()> {
        self.tables().sessions.retain(|s| s.session_id != session_id);
        Ok(())
    }
}
