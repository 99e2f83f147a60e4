use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::dto::health_dto::ConnectionDetails;
use crate::error::Result;

/// Runs a timestamp query and a row count on `candidates`. Read-only.
pub async fn check_connection(pool: &PgPool) -> Result<ConnectionDetails> {
    let mut conn = pool.acquire().await?;

    let timestamp: DateTime<Utc> = sqlx::query_scalar("SELECT NOW()")
        .fetch_one(&mut *conn)
        .await?;
    let candidates_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM candidates")
        .fetch_one(&mut *conn)
        .await?;

    Ok(ConnectionDetails {
        timestamp,
        candidates_count,
    })
}
