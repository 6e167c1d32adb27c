//! Worker heartbeat upkeep.
//!
//! Registration and a periodic `last_seen_at` refresh; job listings
//! refuse to answer when every heartbeat is stale.

use std::time::Duration;

use groundwork_db::repositories::WorkerRepo;
use groundwork_db::DbPool;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// How often the heartbeat is refreshed.
pub const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// If a worker has not refreshed its heartbeat within this many seconds
/// it is considered unreachable.
pub const HEARTBEAT_TIMEOUT_SECS: u64 = 120;

/// Refresh this worker's heartbeat until cancelled.
pub async fn run(pool: DbPool, worker_id: Uuid, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if let Err(e) = WorkerRepo::heartbeat(&pool, worker_id).await {
                    tracing::error!(error = %e, "Heartbeat update failed");
                }
            }
        }
    }
}
