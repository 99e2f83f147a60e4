use crate::config::Config;
use crate::error::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;

pub const MAX_CONNECTIONS: u32 = 20;
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(30);
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(2);
pub const MAX_LIFETIME: Duration = Duration::from_secs(30 * 60);

fn pool_options() -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .idle_timeout(IDLE_TIMEOUT)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME)
}

pub async fn create_pool(config: &Config) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");
    let pool = pool_options()
        .connect_with(config.connect_options()?)
        .await?;
    info!(max_connections = MAX_CONNECTIONS, "PostgreSQL connection pool established");
    Ok(pool)
}
