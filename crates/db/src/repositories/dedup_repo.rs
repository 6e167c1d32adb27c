//! Repository for the `dedup_locks` table.
//!
//! A lock row per dedup signature enforces single-flight submission
//! cluster-wide: the insert either takes the lock or reports how much
//! cooldown is left on the holder.

use std::time::Duration;

use sqlx::PgPool;

/// Outcome of a lock acquisition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupAcquire {
    /// The lock is ours until released or expired.
    Acquired,
    /// Another submission holds the signature.
    Held { remaining: Duration },
}

pub struct DedupRepo;

impl DedupRepo {
    /// Try to take the lock for `signature` with the given cooldown.
    ///
    /// Atomic against concurrent submitters: the insert succeeds for
    /// exactly one of them; an existing row is only taken over once its
    /// cooldown has expired.
    pub async fn acquire(
        pool: &PgPool,
        signature: &str,
        cooldown: Duration,
    ) -> Result<DedupAcquire, sqlx::Error> {
        let taken: Option<String> = sqlx::query_scalar(
            "INSERT INTO dedup_locks (signature, expires_at) \
             VALUES ($1, NOW() + $2 * INTERVAL '1 second') \
             ON CONFLICT (signature) DO UPDATE \
                 SET expires_at = EXCLUDED.expires_at \
                 WHERE dedup_locks.expires_at <= NOW() \
             RETURNING signature",
        )
        .bind(signature)
        .bind(cooldown.as_secs_f64())
        .fetch_optional(pool)
        .await?;

        if taken.is_some() {
            return Ok(DedupAcquire::Acquired);
        }

        let remaining_secs: Option<f64> = sqlx::query_scalar(
            "SELECT GREATEST(EXTRACT(EPOCH FROM (expires_at - NOW())), 0)::DOUBLE PRECISION \
             FROM dedup_locks WHERE signature = $1",
        )
        .bind(signature)
        .fetch_optional(pool)
        .await?;

        Ok(DedupAcquire::Held {
            remaining: Duration::from_secs_f64(remaining_secs.unwrap_or(0.0)),
        })
    }

    /// Release the lock for `signature`. A no-op when absent.
    pub async fn release(pool: &PgPool, signature: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM dedup_locks WHERE signature = $1")
            .bind(signature)
            .execute(pool)
            .await?;
        Ok(())
    }
}
