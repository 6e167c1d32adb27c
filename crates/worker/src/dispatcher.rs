//! Claim-loop dispatcher.
//!
//! A single long-lived task polls the queue and hands claimed jobs to a
//! bounded pool of execution tasks. Claiming uses `FOR UPDATE SKIP
//! LOCKED` via [`JobRepo::claim_next`], so any number of worker
//! processes can run the same loop without double-dispatch.

use std::sync::Arc;
use std::time::Duration;

use groundwork_db::repositories::JobRepo;
use groundwork_db::DbPool;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::execute::JobExecutor;

pub struct Dispatcher {
    pool: DbPool,
    executor: Arc<JobExecutor>,
    poll_interval: Duration,
    concurrency: usize,
}

impl Dispatcher {
    pub fn new(
        pool: DbPool,
        executor: JobExecutor,
        poll_interval: Duration,
        concurrency: usize,
    ) -> Self {
        Self {
            pool,
            executor: Arc::new(executor),
            poll_interval,
            concurrency,
        }
    }

    /// Run the claim loop until the cancellation token is triggered,
    /// then wait for in-flight jobs to finish.
    pub async fn run(&self, cancel: CancellationToken) {
        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut ticker = tokio::time::interval(self.poll_interval);
        tracing::info!(
            concurrency = self.concurrency,
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Dispatcher started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Dispatcher shutting down");
                    break;
                }
                _ = ticker.tick() => self.claim_cycle(&permits).await,
            }
        }

        // All permits back means all spawned executions have finished.
        let _ = permits.acquire_many(self.concurrency as u32).await;
        tracing::info!("Dispatcher drained");
    }

    /// One poll cycle: claim due jobs while execution slots are free.
    async fn claim_cycle(&self, permits: &Arc<Semaphore>) {
        loop {
            let Ok(permit) = Arc::clone(permits).try_acquire_owned() else {
                break;
            };

            match JobRepo::claim_next(&self.pool).await {
                Ok(Some(job)) => {
                    tracing::info!(
                        job_id = %job.id,
                        configuration = %job.configuration,
                        action = %job.action,
                        attempt = job.attempts,
                        "Job claimed",
                    );
                    let executor = Arc::clone(&self.executor);
                    tokio::spawn(async move {
                        executor.execute(job).await;
                        drop(permit);
                    });
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "Claim cycle failed");
                    break;
                }
            }
        }
    }
}
