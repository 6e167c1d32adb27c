use std::time::Duration;

use uuid::Uuid;

/// Errors surfaced to submitters and pollers.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// Submission-time control signal: an active job with the same dedup
    /// signature exists. Carries the cooldown left on the lock so the
    /// caller can decide to poll, wait, or abandon.
    #[error("This task is already queued! Cooldown time left: {}s", remaining.as_secs())]
    AlreadyQueued { remaining: Duration },

    #[error("No workers are currently reachable")]
    NoWorkers,

    #[error("Unknown job id: {0}")]
    UnknownJob(Uuid),

    #[error("Unknown state filter: {0}")]
    InvalidStateFilter(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
