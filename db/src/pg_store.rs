use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    expiring_images::{self, ExpiringImage},
    images::{self, Image},
    object_id::{ExpiringImageId, ImageId, UserId},
    sessions::{self, Session},
    store::Store,
    tiers::{self, Tier},
    users::{self, User, UserWithTier},
    Pool, PoolExt,
};

/// [Store] backed by Postgres.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}

fn to_user_with_tier((user, tier): (User, Option<Tier>)) -> UserWithTier {
    UserWithTier { user, tier }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<()> {
        self.pool
            .interact(|conn| {
                diesel::sql_query("SELECT 1")
                    .execute(conn)
                    .map(|_| ())
                    .map_err(Error::from)
            })
            .await
    }

    async fn create_tier(&self, tier: Tier) -> Result<Tier> {
        self.pool
            .interact(move |conn| {
                diesel::insert_into(tiers::table)
                    .values(&tier)
                    .returning(Tier::as_returning())
                    .get_result(conn)
                    .map_err(Error::from)
            })
            .await
    }

    async fn get_tier_by_name(&self, name: &str) -> Result<Tier> {
        let name = name.to_string();
        self.pool
            .interact(move |conn| {
                tiers::table
                    .filter(tiers::name.eq(name))
                    .select(Tier::as_select())
                    .first(conn)
                    .map_err(Error::from)
            })
            .await
    }

    async fn list_tiers(&self) -> Result<Vec<Tier>> {
        self.pool
            .interact(|conn| {
                tiers::table
                    .order_by(tiers::name)
                    .select(Tier::as_select())
                    .load(conn)
                    .map_err(Error::from)
            })
            .await
    }

    async fn create_user(&self, user: User) -> Result<User> {
        self.pool
            .interact(move |conn| {
                diesel::insert_into(users::table)
                    .values(&user)
                    .returning(User::as_returning())
                    .get_result(conn)
                    .map_err(Error::from)
            })
            .await
    }

    async fn get_user(&self, user_id: UserId) -> Result<UserWithTier> {
        self.pool
            .interact(move |conn| {
                users::table
                    .left_join(tiers::table)
                    .filter(users::user_id.eq(user_id))
                    .select((User::as_select(), Option::<Tier>::as_select()))
                    .first::<(User, Option<Tier>)>(conn)
                    .map(to_user_with_tier)
                    .map_err(Error::from)
            })
            .await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<UserWithTier> {
        let username = username.to_string();
        self.pool
            .interact(move |conn| {
                users::table
                    .left_join(tiers::table)
                    .filter(users::username.eq(username))
                    .select((User::as_select(), Option::<Tier>::as_select()))
                    .first::<(User, Option<Tier>)>(conn)
                    .map(to_user_with_tier)
                    .map_err(Error::from)
            })
            .await
    }

    async fn create_image(&self, image: Image) -> Result<Image> {
        self.pool
            .interact(move |conn| {
                diesel::insert_into(images::table)
                    .values(&image)
                    .returning(Image::as_returning())
                    .get_result(conn)
                    .map_err(Error::from)
            })
            .await
    }

    async fn get_image_by_location(&self, location: &str) -> Result<Image> {
        let location = location.to_string();
        self.pool
            .interact(move |conn| {
                images::table
                    .filter(images::location.eq(location))
                    .select(Image::as_select())
                    .first(conn)
                    .map_err(Error::from)
            })
            .await
    }

    async fn list_images(&self, user_id: UserId) -> Result<Vec<Image>> {
        self.pool
            .interact(move |conn| {
                images::table
                    .filter(images::user_id.eq(user_id))
                    .order_by((images::created_at, images::image_id))
                    .select(Image::as_select())
                    .load(conn)
                    .map_err(Error::from)
            })
            .await
    }

    async fn delete_image(&self, image_id: ImageId) -> Result<()> {
        self.pool
            .interact(move |conn| {
                diesel::delete(images::table)
                    .filter(images::image_id.eq(image_id))
                    .execute(conn)
                    .map(|_| ())
                    .map_err(Error::from)
            })
            .await
    }

    async fn create_expiring_image(&self, image: ExpiringImage) -> Result<ExpiringImage> {
        self.pool
            .interact(move |conn| {
                diesel::insert_into(expiring_images::table)
                    .values(&image)
                    .returning(ExpiringImage::as_returning())
                    .get_result(conn)
                    .map_err(Error::from)
            })
            .await
    }

    async fn get_expiring_image_by_location(&self, location: &str) -> Result<ExpiringImage> {
        let location = location.to_string();
        self.pool
            .interact(move |conn| {
                expiring_images::table
                    .filter(expiring_images::location.eq(location))
                    .select(ExpiringImage::as_select())
                    .first(conn)
                    .map_err(Error::from)
            })
            .await
    }

    async fn list_expiring_images(&self, user_id: UserId) -> Result<Vec<ExpiringImage>> {
        self.pool
            .interact(move |conn| {
                expiring_images::table
                    .filter(expiring_images::user_id.eq(user_id))
                    .order_by((
                        expiring_images::created_at,
                        expiring_images::expiring_image_id,
                    ))
                    .select(ExpiringImage::as_select())
                    .load(conn)
                    .map_err(Error::from)
            })
            .await
    }

    async fn delete_expiring_image(&self, expiring_image_id: ExpiringImageId) -> Result<()> {
        self.pool
            .interact(move |conn| {
                diesel::delete(expiring_images::table)
                    .filter(expiring_images::expiring_image_id.eq(expiring_image_id))
                    .execute(conn)
                    .map(|_| ())
                    .map_err(Error::from)
            })
            .await
    }

    async fn create_session(&self, session: Session) -> Result<()> {
        self.pool
            .interact(move |conn| {
                diesel::insert_into(sessions::table)
                    .values(&session)
                    .execute(conn)
                    .map(|_| ())
                    .map_err(Error::from)
            })
            .await
    }

    async fn get_session(
        &self,
        session_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<UserWithTier>> {
        self.pool
            .interact(move |conn| {
                sessions::table
                    .inner_join(users::table.left_join(tiers::table))
                    .filter(sessions::session_id.eq(session_id))
                    .filter(sessions::expires.gt(now))
                    .filter(users::is_active.eq(true))
                    .select((User::as_select(), Option::<Tier>::as_select()))
                    .first::<(User, Option<Tier>)>(conn)
                    .optional()
                    .map(|row| row.map(to_user_with_tier))
                    .map_err(Error::from)
            })
            .await
    }

    async fn delete_session(&self, session_id: Uuid) -> Result<()> {
        self.pool
            .interact(move |conn| {
                diesel::delete(sessions::table)
                    .filter(sessions::session_id.eq(session_id))
                    .execute(conn)
                    .map(|_| ())
                    .map_err(Error::from)
            })
            .await
    }
}

#[cfg(all(test, feature = "test-postgres"))]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    use super::*;
    use crate::{
        object_id::TierId,
        test::{run_database_test, TestDatabase},
        ImageFormat,
    };

    fn user(username: &str, tier_id: Option<TierId>) -> User {
        User {
            user_id: UserId::new(),
            username: username.to_string(),
            password_hash: "not a real hash".to_string(),
            tier_id,
            is_active: true,
            created: Utc::now(),
        }
    }

    fn premium() -> Tier {
        Tier {
            tier_id: TierId::new(),
            name: "Premium".to_string(),
            thumbnail_height: None,
            presence_of_original_file_link: true,
            ability_to_fetch_expiring_link: false,
        }
    }

    #[tokio::test]
    async fn user_with_and_without_tier() {
        run_database_test(|db: TestDatabase| async move {
            let store = PgStore::new(db.pool.clone());
            let tier = store.create_tier(premium()).await?;
            let with = store.create_user(user("with", Some(tier.tier_id))).await?;
            let without = store.create_user(user("without", None)).await?;

            let found = store.get_user(with.user_id).await?;
            assert_eq!(found.tier, Some(tier));

            let found = store.get_user_by_username("without").await?;
            assert_eq!(found.user.user_id, without.user_id);
            assert!(found.tier.is_none());

            assert_matches!(store.get_user(UserId::new()).await, Err(Error::NotFound));
            assert_matches!(
                store.create_user(user("with", None)).await,
                Err(Error::Conflict(_))
            );
            Ok(())
        })
        .await;
    }

    #[tokio::test]
    async fn images_by_location_and_owner() {
        run_database_test(|db: TestDatabase| async move {
            let store = PgStore::new(db.pool.clone());
            let owner = store.create_user(user("owner", None)).await?;
            let other = store.create_user(user("other", None)).await?;

            let first = store
                .create_image(Image {
                    image_id: ImageId::new(),
                    user_id: owner.user_id,
                    location: "a/images/1.jpg".to_string(),
                    format: ImageFormat::Jpeg,
                    created_at: Utc::now() - Duration::seconds(10),
                })
                .await?;
            store
                .create_image(Image {
                    image_id: ImageId::new(),
                    user_id: owner.user_id,
                    location: "a/images/2.png".to_string(),
                    format: ImageFormat::Png,
                    created_at: Utc::now(),
                })
                .await?;

            let found = store.get_image_by_location("a/images/1.jpg").await?;
            assert_eq!(found.image_id, first.image_id);

            let listed = store.list_images(owner.user_id).await?;
            assert_eq!(
                listed.iter().map(|i| i.location.as_str()).collect::<Vec<_>>(),
                vec!["a/images/1.jpg", "a/images/2.png"]
            );
            assert!(store.list_images(other.user_id).await?.is_empty());

            store.delete_image(first.image_id).await?;
            assert_matches!(
                store.get_image_by_location("a/images/1.jpg").await,
                Err(Error::NotFound)
            );
            Ok(())
        })
        .await;
    }

    #[tokio::test]
    async fn live_time_is_checked() {
        run_database_test(|db: TestDatabase| async move {
            let store = PgStore::new(db.pool.clone());
            let owner = store.create_user(user("owner", None)).await?;
            let result = store
                .create_expiring_image(ExpiringImage {
                    expiring_image_id: ExpiringImageId::new(),
                    user_id: owner.user_id,
                    location: "expiring-images/a.jpg".to_string(),
                    live_time: 299,
                    created_at: Utc::now(),
                })
                .await;
            assert_matches!(result, Err(Error::Constraint(_)));
            assert!(store.list_expiring_images(owner.user_id).await?.is_empty());
            Ok(())
        })
        .await;
    }

    #[tokio::test]
    async fn sessions_expire() {
        run_database_test(|db: TestDatabase| async move {
            let store = PgStore::new(db.pool.clone());
            let owner = store.create_user(user("owner", None)).await?;
            let session_id = crate::new_uuid();
            let now = Utc::now();
            store
                .create_session(Session {
                    session_id,
                    user_id: owner.user_id,
                    expires: now + Duration::days(1),
                })
                .await?;

            let found = store.get_session(session_id, now).await?;
            assert_eq!(found.map(|u| u.user.user_id), Some(owner.user_id));
            assert!(store
                .get_session(session_id, now + Duration::days(2))
                .await?
                .is_none());

            store.delete_session(session_id).await?;
            assert!(store.get_session(session_id, now).await?.is_none());
            Ok(())
        })
        .await;
    }
}
