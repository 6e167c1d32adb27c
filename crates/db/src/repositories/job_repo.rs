//! Repository for the `jobs` table.
//!
//! Claiming uses `SELECT FOR UPDATE SKIP LOCKED`, so any number of
//! worker processes can pull from the queue without double-dispatch.

use std::time::Duration;

use groundwork_core::terraform::ExecResult;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::job::{Job, NewJob};
use crate::models::status::{JobStatus, StatusId};

/// Column list for `jobs` queries.
const COLUMNS: &str = "\
    id, configuration, action, variables, workspace, dedup_signature, \
    status_id, attempts, exit_code, stdout, stderr, error_message, \
    scheduled_at, submitted_at, started_at, completed_at";

/// Provides CRUD operations for queued jobs.
pub struct JobRepo;

impl JobRepo {
    /// Insert a new queued job, deferred by the submission delay.
    /// Returns immediately with the job row.
    pub async fn submit(pool: &PgPool, input: &NewJob) -> Result<Job, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs \
                 (id, configuration, action, variables, workspace, dedup_signature, \
                  status_id, scheduled_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW() + $8 * INTERVAL '1 second') \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(Uuid::new_v4())
            .bind(&input.configuration)
            .bind(input.action.as_str())
            .bind(input.variables_json())
            .bind(&input.workspace)
            .bind(&input.dedup_signature)
            .bind(JobStatus::Queued.id())
            .bind(input.delay.as_secs_f64())
            .fetch_one(pool)
            .await
    }

    /// Atomically claim the next due job for execution.
    ///
    /// Picks the oldest Queued or Retrying job whose `scheduled_at` has
    /// passed, marks it Running, and counts the attempt. `FOR UPDATE
    /// SKIP LOCKED` prevents double-dispatch across worker processes.
    pub async fn claim_next(pool: &PgPool) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs \
             SET status_id = $1, started_at = NOW(), attempts = attempts + 1 \
             WHERE id = ( \
                 SELECT id FROM jobs \
                 WHERE status_id IN ($2, $3) AND scheduled_at <= NOW() \
                 ORDER BY scheduled_at ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(JobStatus::Running.id())
            .bind(JobStatus::Queued.id())
            .bind(JobStatus::Retrying.id())
            .fetch_optional(pool)
            .await
    }

    /// Record a completed execution. The exit code decides the terminal
    /// status: zero is Succeeded, anything else is Failed.
    pub async fn complete(
        pool: &PgPool,
        job_id: Uuid,
        result: &ExecResult,
    ) -> Result<(), sqlx::Error> {
        let status = if result.success() {
            JobStatus::Succeeded
        } else {
            JobStatus::Failed
        };
        sqlx::query(
            "UPDATE jobs \
             SET status_id = $2, exit_code = $3, stdout = $4, stderr = $5, \
                 completed_at = NOW() \
             WHERE id = $1",
        )
        .bind(job_id)
        .bind(status.id())
        .bind(result.exit_code)
        .bind(&result.stdout)
        .bind(&result.stderr)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Mark a job as failed without a captured triple (fatal error or
    /// exhausted retries).
    pub async fn fail(pool: &PgPool, job_id: Uuid, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE jobs \
             SET status_id = $2, error_message = $3, completed_at = NOW() \
             WHERE id = $1",
        )
        .bind(job_id)
        .bind(JobStatus::Failed.id())
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Put a job back on the queue for one retry hop after a transient
    /// failure, deferred by the retry delay.
    pub async fn requeue_retry(
        pool: &PgPool,
        job_id: Uuid,
        delay: Duration,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE jobs \
             SET status_id = $2, scheduled_at = NOW() + $3 * INTERVAL '1 second' \
             WHERE id = $1",
        )
        .bind(job_id)
        .bind(JobStatus::Retrying.id())
        .bind(delay.as_secs_f64())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Find a job by its ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Current status of a job, without fetching the whole row.
    pub async fn status_of(pool: &PgPool, id: Uuid) -> Result<Option<JobStatus>, sqlx::Error> {
        let status_id: Option<StatusId> =
            sqlx::query_scalar("SELECT status_id FROM jobs WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(status_id.and_then(JobStatus::from_id))
    }

    /// Job ids currently in any of the given statuses, oldest first.
    pub async fn list_ids_by_status(
        pool: &PgPool,
        statuses: &[JobStatus],
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let ids: Vec<StatusId> = statuses.iter().map(|s| s.id()).collect();
        sqlx::query_scalar(
            "SELECT id FROM jobs WHERE status_id = ANY($1) ORDER BY submitted_at ASC",
        )
        .bind(&ids)
        .fetch_all(pool)
        .await
    }

    /// All job ids, oldest first.
    pub async fn list_all_ids(pool: &PgPool) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM jobs ORDER BY submitted_at ASC")
            .fetch_all(pool)
            .await
    }
}
