use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::candidate_dto::{
    non_blank, CreateCandidatePayload, CreateCommentPayload, StageAdvanceResponse,
    UpdateCandidatePayload,
};
use crate::error::{Error, Result};
use crate::models::candidate::{
    Candidate, CandidateRecord, CandidateRow, Comment, Stage, Status,
};

/// Storage behind the candidate endpoints.
///
/// Lookups by id return `Ok(None)` when no candidate has that id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// Every candidate with its interviewers and comments, newest first.
    async fn list_candidates(&self) -> Result<Vec<Candidate>>;

    async fn get_candidate(&self, id: Uuid) -> Result<Option<Candidate>>;

    /// Inserts the candidate, its interviewers and its comments atomically.
    async fn create_candidate(&self, payload: CreateCandidatePayload) -> Result<Candidate>;

    async fn update_candidate(
        &self,
        id: Uuid,
        payload: UpdateCandidatePayload,
    ) -> Result<Option<Candidate>>;

    /// Returns whether a row was removed.
    async fn delete_candidate(&self, id: Uuid) -> Result<bool>;

    /// Marks the candidate accepted and opens a pending copy at the next stage.
    /// Fails with `Error::Conflict` at the final stage.
    async fn advance_stage(&self, id: Uuid) -> Result<Option<StageAdvanceResponse>>;

    async fn add_comment(
        &self,
        id: Uuid,
        payload: CreateCommentPayload,
    ) -> Result<Option<Comment>>;

    async fn add_interviewer(&self, id: Uuid, name: String) -> Result<Option<Vec<String>>>;

    async fn remove_interviewer(&self, id: Uuid, name: String) -> Result<Option<Vec<String>>>;

    /// `(stage, status, count)` for every populated combination.
    async fn stage_counts(&self) -> Result<Vec<(Stage, Status, i64)>>;
}

const CANDIDATE_COLUMNS: &str = "id, name, email, job_title, stage, status, cv, interview_date, \
     meeting_location, meeting_link, suggested_job_title, created_at, updated_at";

fn candidate_query(tail: &str) -> String {
    format!(
        r#"
        SELECT c.id, c.name, c.email, c.job_title, c.stage, c.status, c.cv, c.interview_date,
               c.meeting_location, c.meeting_link, c.suggested_job_title, c.created_at, c.updated_at,
               COALESCE(
                   (SELECT array_agg(DISTINCT ci.interviewer_name::text)
                      FROM candidate_interviewers ci
                     WHERE ci.candidate_id = c.id),
                   '{{}}'::text[]
               ) AS interviewers,
               COALESCE(
                   (SELECT jsonb_agg(
                               jsonb_build_object(
                                   'id', cm.id,
                                   'interviewerName', cm.interviewer_name,
                                   'text', cm.text,
                                   'status', cm.status,
                                   'timestamp', cm.created_at
                               )
                               ORDER BY cm.created_at, cm.id
                           )
                      FROM comments cm
                     WHERE cm.candidate_id = c.id),
                   '[]'::jsonb
               ) AS comments
        FROM candidates c
        {}
        "#,
        tail
    )
}

async fn fetch_candidate<'e, E>(executor: E, id: Uuid) -> Result<Option<Candidate>>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, CandidateRow>(&candidate_query("WHERE c.id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(row.map(Candidate::from))
}

async fn interviewer_names(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Vec<String>> {
    let names = sqlx::query_scalar::<_, String>(
        r#"
        SELECT interviewer_name::text
        FROM candidate_interviewers
        WHERE candidate_id = $1
        ORDER BY interviewer_name
        "#,
    )
    .bind(id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(names)
}

async fn candidate_exists(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM candidates WHERE id = $1)")
        .bind(id)
        .fetch_one(&mut **tx)
        .await?;
    Ok(exists)
}

/// Commits on success, rolls back explicitly on failure and hands back the original error.
async fn finish<T>(tx: Transaction<'_, Postgres>, outcome: Result<T>, op: &str) -> Result<T> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            tracing::warn!(error = %err, op, "Rolling back transaction");
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(error = %rollback_err, op, "Rollback failed");
            }
            Err(err)
        }
    }
}

#[derive(Clone)]
pub struct CandidateService {
    pool: PgPool,
}

impl CandidateService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_candidate_graph(
        tx: &mut Transaction<'_, Postgres>,
        payload: &CreateCandidatePayload,
    ) -> Result<Candidate> {
        let record = sqlx::query_as::<_, CandidateRecord>(&format!(
            r#"
            INSERT INTO candidates (
                name, email, job_title, stage, status, cv,
                interview_date, meeting_location, meeting_link,
                suggested_job_title
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            CANDIDATE_COLUMNS
        ))
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(&payload.job_title)
        .bind(payload.stage.unwrap_or_default().number())
        .bind(payload.status.unwrap_or_default().as_str())
        .bind(non_blank(payload.cv.clone()))
        .bind(payload.interview_date)
        .bind(non_blank(payload.meeting_location.clone()))
        .bind(non_blank(payload.meeting_link.clone()))
        .bind(non_blank(payload.suggested_job_title.clone()))
        .fetch_one(&mut **tx)
        .await?;

        let interviewers = payload.unique_interviewers();
        if !interviewers.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO candidate_interviewers (candidate_id, interviewer_name)
                SELECT $1, t.interviewer_name
                FROM UNNEST($2::text[]) AS t(interviewer_name)
                "#,
            )
            .bind(record.id)
            .bind(&interviewers)
            .execute(&mut **tx)
            .await?;
        }

        let mut comments = Vec::with_capacity(payload.comments.len());
        if !payload.comments.is_empty() {
            let names: Vec<String> = payload
                .comments
                .iter()
                .map(|c| c.interviewer_name.clone())
                .collect();
            let texts: Vec<String> = payload.comments.iter().map(|c| c.text.clone()).collect();
            let statuses: Vec<String> = payload
                .comments
                .iter()
                .map(|c| c.status.as_str().to_string())
                .collect();

            comments = sqlx::query_as::<_, Comment>(
                r#"
                INSERT INTO comments (candidate_id, interviewer_name, text, status)
                SELECT $1, t.interviewer_name, t.body, t.status
                FROM UNNEST($2::text[], $3::text[], $4::text[])
                     WITH ORDINALITY AS t(interviewer_name, body, status, ord)
                ORDER BY t.ord
                RETURNING id, interviewer_name, text, status, created_at AS "timestamp"
                "#,
            )
            .bind(record.id)
            .bind(&names)
            .bind(&texts)
            .bind(&statuses)
            .fetch_all(&mut **tx)
            .await?;
        }

        Ok(Candidate::from_record(record, interviewers, comments))
    }

    async fn advance_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<StageAdvanceResponse>> {
        let current = sqlx::query_as::<_, CandidateRecord>(&format!(
            "SELECT {} FROM candidates WHERE id = $1 FOR UPDATE",
            CANDIDATE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        let Some(current) = current else {
            return Ok(None);
        };
        let next_stage = current.stage.next().ok_or_else(|| {
            Error::Conflict(format!(
                "Candidate {} is already at the final stage",
                current.id
            ))
        })?;

        sqlx::query("UPDATE candidates SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(Status::Accepted.as_str())
            .execute(&mut **tx)
            .await?;

        let next_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO candidates (
                name, email, job_title, stage, status, cv,
                interview_date, meeting_location, meeting_link,
                suggested_job_title
            )
            SELECT name, email, job_title, $2, $3, cv,
                   interview_date, meeting_location, meeting_link,
                   suggested_job_title
            FROM candidates
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(next_stage.number())
        .bind(Status::Pending.as_str())
        .fetch_one(&mut **tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO candidate_interviewers (candidate_id, interviewer_name)
            SELECT $2, interviewer_name
            FROM candidate_interviewers
            WHERE candidate_id = $1
            "#,
        )
        .bind(id)
        .bind(next_id)
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO comments (candidate_id, interviewer_name, text, status, created_at)
            SELECT $2, interviewer_name, text, status, created_at
            FROM comments
            WHERE candidate_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(id)
        .bind(next_id)
        .execute(&mut **tx)
        .await?;

        let previous = fetch_candidate(&mut **tx, id)
            .await?
            .ok_or_else(|| Error::Internal(format!("Candidate {} vanished mid-advance", id)))?;
        let next = fetch_candidate(&mut **tx, next_id)
            .await?
            .ok_or_else(|| Error::Internal(format!("Candidate {} vanished mid-advance", next_id)))?;

        Ok(Some(StageAdvanceResponse { previous, next }))
    }
}

#[async_trait]
impl CandidateStore for CandidateService {
    async fn list_candidates(&self) -> Result<Vec<Candidate>> {
        let rows = sqlx::query_as::<_, CandidateRow>(&candidate_query("ORDER BY c.created_at DESC"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Candidate::from).collect())
    }

    async fn get_candidate(&self, id: Uuid) -> Result<Option<Candidate>> {
        fetch_candidate(&self.pool, id).await
    }

    async fn create_candidate(&self, payload: CreateCandidatePayload) -> Result<Candidate> {
        let mut tx = self.pool.begin().await?;
        let outcome = Self::insert_candidate_graph(&mut tx, &payload).await;
        let candidate = finish(tx, outcome, "create_candidate").await?;
        tracing::info!(
            candidate_id = %candidate.id,
            interviewers = candidate.interviewers.len(),
            comments = candidate.comments.len(),
            "Candidate created"
        );
        Ok(candidate)
    }

    async fn update_candidate(
        &self,
        id: Uuid,
        payload: UpdateCandidatePayload,
    ) -> Result<Option<Candidate>> {
        let mut tx = self.pool.begin().await?;
        let updated: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE candidates SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                job_title = COALESCE($4, job_title),
                status = COALESCE($5, status),
                cv = COALESCE($6, cv),
                interview_date = COALESCE($7, interview_date),
                meeting_location = COALESCE($8, meeting_location),
                meeting_link = COALESCE($9, meeting_link),
                suggested_job_title = COALESCE($10, suggested_job_title)
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(payload.name)
        .bind(payload.email)
        .bind(payload.job_title)
        .bind(payload.status.map(Status::as_str))
        .bind(non_blank(payload.cv))
        .bind(payload.interview_date)
        .bind(non_blank(payload.meeting_location))
        .bind(non_blank(payload.meeting_link))
        .bind(non_blank(payload.suggested_job_title))
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }
        let candidate = fetch_candidate(&mut *tx, id).await?;
        tx.commit().await?;
        tracing::info!(candidate_id = %id, "Candidate updated");
        Ok(candidate)
    }

    async fn delete_candidate(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM candidates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(candidate_id = %id, "Candidate deleted");
        }
        Ok(deleted)
    }

    async fn advance_stage(&self, id: Uuid) -> Result<Option<StageAdvanceResponse>> {
        let mut tx = self.pool.begin().await?;
        let outcome = Self::advance_in_tx(&mut tx, id).await;
        let advanced = finish(tx, outcome, "advance_stage").await?;
        if let Some(advance) = &advanced {
            tracing::info!(
                candidate_id = %id,
                next_candidate_id = %advance.next.id,
                stage = %advance.next.stage,
                "Candidate moved to next stage"
            );
        }
        Ok(advanced)
    }

    async fn add_comment(
        &self,
        id: Uuid,
        payload: CreateCommentPayload,
    ) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (candidate_id, interviewer_name, text, status)
            SELECT id, $2, $3, $4 FROM candidates WHERE id = $1
            RETURNING id, interviewer_name, text, status, created_at AS "timestamp"
            "#,
        )
        .bind(id)
        .bind(&payload.interviewer_name)
        .bind(&payload.text)
        .bind(payload.status.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn add_interviewer(&self, id: Uuid, name: String) -> Result<Option<Vec<String>>> {
        let mut tx = self.pool.begin().await?;
        if !candidate_exists(&mut tx, id).await? {
            tx.rollback().await?;
            return Ok(None);
        }
        sqlx::query(
            r#"
            INSERT INTO candidate_interviewers (candidate_id, interviewer_name)
            VALUES ($1, $2)
            ON CONFLICT (candidate_id, interviewer_name) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(&name)
        .execute(&mut *tx)
        .await?;
        let names = interviewer_names(&mut tx, id).await?;
        tx.commit().await?;
        Ok(Some(names))
    }

    async fn remove_interviewer(&self, id: Uuid, name: String) -> Result<Option<Vec<String>>> {
        let mut tx = self.pool.begin().await?;
        if !candidate_exists(&mut tx, id).await? {
            tx.rollback().await?;
            return Ok(None);
        }
        sqlx::query(
            "DELETE FROM candidate_interviewers WHERE candidate_id = $1 AND interviewer_name = $2",
        )
        .bind(id)
        .bind(&name)
        .execute(&mut *tx)
        .await?;
        let names = interviewer_names(&mut tx, id).await?;
        tx.commit().await?;
        Ok(Some(names))
    }

    async fn stage_counts(&self) -> Result<Vec<(Stage, Status, i64)>> {
        let rows = sqlx::query_as::<_, (i32, String, i64)>(
            r#"
            SELECT stage, status, COUNT(*)
            FROM candidates
            GROUP BY stage, status
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(stage, status, count)| {
                let stage = Stage::try_from(stage).map_err(|e| Error::Internal(e.to_string()))?;
                let status = status
                    .parse::<Status>()
                    .map_err(|e| Error::Internal(e.to_string()))?;
                Ok((stage, status, count))
            })
            .collect()
    }
}
