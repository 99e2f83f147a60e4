use crate::error::Result;
use sqlx::PgPool;
use tracing::info;

const SETUP_LOCK_KEY: i64 = 0x1e7e_c0de;

const CREATE_EXTENSION: &str = r#"CREATE EXTENSION IF NOT EXISTS "uuid-ossp""#;

const CREATE_CANDIDATES: &str = r#"
CREATE TABLE IF NOT EXISTS candidates (
    id UUID PRIMARY KEY DEFAULT uuid_generate_v4(),
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL,
    job_title VARCHAR(255) NOT NULL,
    stage INTEGER NOT NULL DEFAULT 1,
    status VARCHAR(50) NOT NULL DEFAULT 'pending',
    cv TEXT,
    interview_date TIMESTAMPTZ,
    meeting_location TEXT,
    meeting_link TEXT,
    suggested_job_title TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

const CREATE_COMMENTS: &str = r#"
CREATE TABLE IF NOT EXISTS comments (
    id UUID PRIMARY KEY DEFAULT uuid_generate_v4(),
    candidate_id UUID REFERENCES candidates(id) ON DELETE CASCADE,
    interviewer_name VARCHAR(255) NOT NULL,
    text TEXT NOT NULL,
    status VARCHAR(50) NOT NULL DEFAULT 'pending',
    created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

const CREATE_CANDIDATE_INTERVIEWERS: &str = r#"
CREATE TABLE IF NOT EXISTS candidate_interviewers (
    candidate_id UUID REFERENCES candidates(id) ON DELETE CASCADE,
    interviewer_name VARCHAR(255) NOT NULL,
    PRIMARY KEY (candidate_id, interviewer_name)
)
"#;

const CREATE_UPDATED_AT_FUNCTION: &str = r#"
CREATE OR REPLACE FUNCTION update_updated_at_column()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = CURRENT_TIMESTAMP;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql
"#;

const DROP_UPDATED_AT_TRIGGER: &str =
    "DROP TRIGGER IF EXISTS update_candidates_updated_at ON candidates";

const CREATE_UPDATED_AT_TRIGGER: &str = r#"
CREATE TRIGGER update_candidates_updated_at
    BEFORE UPDATE ON candidates
    FOR EACH ROW
    EXECUTE FUNCTION update_updated_at_column()
"#;

/// Statements in execution order. Each one is safe to run against an existing schema.
const STATEMENTS: [(&str, &str); 7] = [
    ("uuid-ossp extension", CREATE_EXTENSION),
    ("candidates table", CREATE_CANDIDATES),
    ("comments table", CREATE_COMMENTS),
    ("candidate_interviewers table", CREATE_CANDIDATE_INTERVIEWERS),
    ("updated_at function", CREATE_UPDATED_AT_FUNCTION),
    ("stale updated_at trigger", DROP_UPDATED_AT_TRIGGER),
    ("updated_at trigger", CREATE_UPDATED_AT_TRIGGER),
];

/// Creates the tables and the `updated_at` trigger if they are missing.
///
/// Runs inside one transaction so a failure leaves the previous schema in place.
pub async fn setup_database(pool: &PgPool) -> Result<()> {
    let mut tx = pool.begin().await?;
    // Concurrent initializers would otherwise race on the catalog.
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SETUP_LOCK_KEY)
        .execute(&mut *tx)
        .await?;
    for (what, sql) in STATEMENTS {
        if let Err(e) = sqlx::query(sql).execute(&mut *tx).await {
            tracing::error!(error = %e, step = what, "Database setup failed");
            tx.rollback().await?;
            return Err(e.into());
        }
        tracing::debug!(step = what, "Schema step applied");
    }
    tx.commit().await?;
    info!("Database setup completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_statement_is_guarded() {
        for (what, sql) in STATEMENTS {
            let sql = sql.to_uppercase();
            let guarded = sql.contains("IF NOT EXISTS")
                || sql.contains("IF EXISTS")
                || sql.contains("CREATE OR REPLACE")
                || what == "updated_at trigger";
            assert!(guarded, "{} is not idempotent", what);
        }
    }

    #[test]
    fn trigger_is_dropped_before_it_is_created() {
        let drop_at = STATEMENTS
            .iter()
            .position(|(_, sql)| *sql == DROP_UPDATED_AT_TRIGGER)
            .unwrap();
        let create_at = STATEMENTS
            .iter()
            .position(|(_, sql)| *sql == CREATE_UPDATED_AT_TRIGGER)
            .unwrap();
        assert!(drop_at < create_at);
    }
}
