use chrono::Utc;
use thumbtier_db::{
    self as db,
    object_id::{TierId, UserId},
    tiers::Tier,
    users::User,
    Store,
};
use tracing::{event, instrument, Level};

use crate::{tiers, Error};

#[derive(Debug, Clone)]
pub struct NewTier {
    pub name: String,
    pub thumbnail_height: Option<i32>,
    pub original_link: bool,
    pub expiring_link: bool,
}

/// Create the built-in tiers that don't exist yet, returning the ones created.
#[instrument(skip(store))]
pub async fn seed_tiers(store: &dyn Store) -> Result<Vec<Tier>, Error> {
    let builtins = [
        (tiers::BASIC, false, false),
        (tiers::PREMIUM, true, false),
        (tiers::ENTERPRISE, true, true),
    ];

    let mut created = Vec::new();
    for (name, original_link, expiring_link) in builtins {
        match store.get_tier_by_name(name).await {
            Ok(_) => continue,
            Err(db::Error::NotFound) => {}
            Err(e) => return Err(e.into()),
        }

        let tier = add_tier(
            store,
            NewTier {
                name: name.to_string(),
                thumbnail_height: None,
                original_link,
                expiring_link,
            },
        )
        .await?;
        created.push(tier);
    }

    Ok(created)
}

#[instrument(skip(store))]
pub async fn add_tier(store: &dyn Store, tier: NewTier) -> Result<Tier, Error> {
    let name = tier.name.trim();
    if name.is_empty() {
        return Err(Error::validation("Tier name is required"));
    }

    match tier.thumbnail_height {
        Some(h) if h <= 0 => {
            return Err(Error::validation("Thumbnail height must be a positive integer"))
        }
        None if !tiers::is_builtin(name) => {
            return Err(Error::validation(
                "Thumbnail height is required for tiers other than Basic, Premium, and Enterprise",
            ))
        }
        _ => {}
    }

    let tier = store
        .create_tier(Tier {
            tier_id: TierId::new(),
            name: name.to_string(),
            thumbnail_height: tier.thumbnail_height,
            presence_of_original_file_link: tier.original_link,
            ability_to_fetch_expiring_link: tier.expiring_link,
        })
        .await?;

    event!(Level::INFO, tier_id = %tier.tier_id, name = %tier.name, "Created tier");
    Ok(tier)
}

#[instrument(skip(store, password))]
pub async fn add_user(
    store: &dyn Store,
    username: &str,
    password: String,
    tier_name: Option<&str>,
) -> Result<User, Error> {
    let username = username.trim();
    if username.is_empty() {
        return Err(Error::validation("Username is required"));
    }

    let tier_id = match tier_name {
        Some(name) => match store.get_tier_by_name(name).await {
            Ok(tier) => Some(tier.tier_id),
            Err(db::Error::NotFound) => return Err(Error::validation(format!("No tier named {name}"))),
            Err(e) => return Err(e.into()),
        },
        None => None,
    };

    let password_hash =
        tokio::task::spawn_blocking(move || thumbtier_auth::password::new_hash(&password))
            .await??;

    let user = store
        .create_user(User {
            user_id: UserId::new(),
            username: username.to_string(),
            password_hash,
            tier_id,
            is_active: true,
            created: Utc::now(),
        })
        .await?;

    event!(Level::INFO, user_id = %user.user_id, %username, "Created user");
    Ok(user)
}
