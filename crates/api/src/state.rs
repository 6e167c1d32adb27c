use std::sync::Arc;
use std::time::Duration;

use groundwork_db::DbPool;
use groundwork_queue::JobQueue;

use crate::config::ServerConfig;

/// Shared application state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<ServerConfig>,
    pub queue: JobQueue,
}

impl AppState {
    pub fn new(pool: DbPool, config: ServerConfig) -> Self {
        let queue = JobQueue::new(pool.clone())
            .with_cooldown(Duration::from_secs(config.dedup_cooldown_secs))
            .with_heartbeat_timeout(Duration::from_secs(config.heartbeat_timeout_secs));

        Self {
            pool,
            config: Arc::new(config),
            queue,
        }
    }
}
