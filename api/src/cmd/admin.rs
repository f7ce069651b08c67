use std::sync::Arc;

use clap::{Args, Subcommand};
use thumbtier_api::provision::{self, NewTier};
use thumbtier_db::{object_id, PgStore, Store};

#[derive(Debug, Args)]
pub struct AdminArgs {
    #[clap(subcommand)]
    commands: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an object ID
    ///
    /// This is useful for generating fixtures or for other testing.
    MakeId(MakeId),
    /// Hash a password
    HashPassword(HashPassword),
    /// Create the Basic, Premium, and Enterprise tiers if they don't exist.
    SeedTiers(DbArgs),
    /// Create a tier
    AddTier(AddTier),
    /// Create a user
    AddUser(AddUser),
}

#[derive(Debug, Args)]
pub struct MakeId {
    #[clap(subcommand)]
    command: IdType,
}

#[derive(Debug, Subcommand)]
enum IdType {
    User,
    Tier,
    Image,
    ExpiringImage,
}

#[derive(Debug, Args)]
pub struct HashPassword {
    /// The password to hash
    password: String,
}

#[derive(Debug, Args)]
pub struct DbArgs {
    #[clap(long = "db", env = "DATABASE_URL")]
    database_url: String,
}

#[derive(Debug, Args)]
pub struct AddTier {
    #[clap(flatten)]
    db: DbArgs,

    #[clap(long)]
    name: String,

    /// Thumbnail height for tiers other than the built-in ones.
    #[clap(long)]
    thumbnail_height: Option<i32>,

    /// Include a link to the original in upload results.
    #[clap(long)]
    original_link: bool,

    /// Allow creating expiring links.
    #[clap(long)]
    expiring_link: bool,
}

#[derive(Debug, Args)]
pub struct AddUser {
    #[clap(flatten)]
    db: DbArgs,

    #[clap(long)]
    username: String,

    #[clap(long, env = "THUMBTIER_PASSWORD")]
    password: String,

    /// Name of the user's tier
    #[clap(long)]
    tier: Option<String>,
}

pub async fn admin_commands(cmd: AdminArgs) -> Result<(), eyre::Report> {
    match cmd.commands {
        Commands::MakeId(MakeId { command }) => make_id(command),
        Commands::HashPassword(HashPassword { password }) => hash_password(password)?,
        Commands::SeedTiers(db) => {
            let store = connect(&db).await?;
            for tier in provision::seed_tiers(store.as_ref()).await? {
                println!("Created tier {} ({})", tier.name, tier.tier_id);
            }
        }
        Commands::AddTier(args) => {
            let store = connect(&args.db).await?;
            let tier = provision::add_tier(
                store.as_ref(),
                NewTier {
                    name: args.name,
                    thumbnail_height: args.thumbnail_height,
                    original_link: args.original_link,
                    expiring_link: args.expiring_link,
                },
            )
            .await?;
            println!("{}", tier.tier_id);
        }
        Commands::AddUser(args) => {
            let store = connect(&args.db).await?;
            let user = provision::add_user(
                store.as_ref(),
                &args.username,
                args.password,
                args.tier.as_deref(),
            )
            .await?;
            println!("{}", user.user_id);
        }
    }

    Ok(())
}

async fn connect(args: &DbArgs) -> Result<Arc<dyn Store>, eyre::Report> {
    let pool = thumbtier_db::connect(&args.database_url, 2)?;
    thumbtier_db::run_migrations(&pool).await?;
    Ok(Arc::new(PgStore::new(pool)))
}

fn make_id(id: IdType) {
    let id = match id {
        IdType::User => object_id::UserId::new().to_string(),
        IdType::Tier => object_id::TierId::new().to_string(),
        IdType::Image => object_id::ImageId::new().to_string(),
        IdType::ExpiringImage => object_id::ExpiringImageId::new().to_string(),
    };

    println!("{id}");
}

fn hash_password(password: String) -> Result<(), eyre::Report> {
    let hash = thumbtier_auth::password::new_hash(password.as_str())?;
    println!("{hash}");
    Ok(())
}
