//! Repository for the `workers` table.

use std::time::Duration;

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::worker::WorkerRow;

pub struct WorkerRepo;

impl WorkerRepo {
    /// Register a worker process at startup.
    pub async fn register(pool: &PgPool, hostname: &str) -> Result<WorkerRow, sqlx::Error> {
        sqlx::query_as::<_, WorkerRow>(
            "INSERT INTO workers (id, hostname) VALUES ($1, $2) \
             RETURNING id, hostname, started_at, last_seen_at",
        )
        .bind(Uuid::new_v4())
        .bind(hostname)
        .fetch_one(pool)
        .await
    }

    /// Refresh a worker's heartbeat.
    pub async fn heartbeat(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE workers SET last_seen_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Remove a worker's registration on shutdown.
    pub async fn deregister(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM workers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Whether any worker heartbeat is fresher than `timeout`.
    pub async fn any_alive(pool: &PgPool, timeout: Duration) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS ( \
                 SELECT 1 FROM workers \
                 WHERE last_seen_at > NOW() - $1 * INTERVAL '1 second' \
             )",
        )
        .bind(timeout.as_secs_f64())
        .fetch_one(pool)
        .await
    }
}
