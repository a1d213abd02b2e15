use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

use crate::error::Result;

pub type DbPool = Pool<Postgres>;

/// Establish a new Postgres connection pool. The ETL run is single-writer,
/// so a small pool is plenty.
pub async fn connect(database_url: &str) -> Result<DbPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
        .map_err(Into::into)
}
