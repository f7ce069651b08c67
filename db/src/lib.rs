#[macro_use]
extern crate diesel;

mod enums;
mod error;
mod memory;
mod pg_store;
mod schema;
mod store;

pub mod expiring_images;
pub mod images;
pub mod object_id;
pub mod sessions;
pub mod tiers;
pub mod users;


pub use enums::*;
pub use error::*;
pub use memory::MemoryStore;
pub use pg_store::PgStore;
pub use store::Store;

use async_trait::async_trait;
use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness};

pub type Pool = deadpool_diesel::postgres::Pool;

pub const MIGRATIONS: EmbeddedMigrations = diesel_migrations::embed_migrations!();

pub fn connect(conn_str: &str, max_connections: usize) -> Result<Pool, impl std::error::Error> {
    let manager =
        deadpool_diesel::postgres::Manager::new(conn_str, deadpool_diesel::Runtime::Tokio1);
    deadpool_diesel::Pool::builder(manager)
        .max_size(max_connections)
        .build()
}

/// Apply any migrations the database hasn't seen yet.
pub async fn run_migrations(pool: &Pool) -> Result<(), Error> {
    pool.interact(|conn| {
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| Error::Migration(e.to_string()))?;
        for version in applied {
            tracing::event!(tracing::Level::INFO, %version, "Applied migration");
        }
        Ok::<_, Error>(())
    })
    .await
}

pub fn new_uuid() -> uuid::Uuid {
    ulid::Ulid::new().into()
}

#[async_trait]
pub trait PoolExt<F, RETVAL, ERR>
where
    F: (FnOnce(&mut PgConnection) -> Result<RETVAL, ERR>) + Send + 'static,
    RETVAL: Send + 'static,
    ERR: Send + 'static,
{
    async fn interact(&self, f: F) -> Result<RETVAL, ERR>;
    async fn transaction(&self, f: F) -> Result<RETVAL, ERR>;
}

#[async_trait]
impl<F, RETVAL, ERR> PoolExt<F, RETVAL, ERR> for Pool
where
    F: (FnOnce(&mut PgConnection) -> Result<RETVAL, ERR>) + Send + 'static,
    RETVAL: Send + 'static,
    ERR: From<diesel::result::Error>
        + From<deadpool_diesel::PoolError>
        + From<deadpool_diesel::InteractError>
        + Send
        + 'static,
{
    async fn interact(&self, f: F) -> Result<RETVAL, ERR> {
        let conn = self.get().await?;
        conn.interact(move |conn| f(conn)).await?
    }

    async fn transaction(&self, f: F) -> Result<RETVAL, ERR> {
        let conn = self.get().await?;
        conn.interact(move |conn| conn.transaction(move |conn| f(conn)))
            .await?
    }
}
