//! Execution of one claimed job, including the bounded retry hop.

use std::path::PathBuf;
use std::time::Duration;

use groundwork_core::config;
use groundwork_core::{Action, ExecOutcome, Runner, Terraform};
use groundwork_db::models::job::Job;
use groundwork_db::repositories::{DedupRepo, JobRepo};
use groundwork_db::DbPool;

/// Retry policy and configuration lookup settings for job execution.
#[derive(Debug, Clone)]
pub struct ExecutionSettings {
    pub config_root: PathBuf,
    /// Retry hops allowed per job on retryable failures.
    pub max_retries: i32,
    /// Delay before a retried job becomes due again.
    pub retry_delay: Duration,
}

/// Executes claimed jobs against their configurations.
#[derive(Debug, Clone)]
pub struct JobExecutor {
    pool: DbPool,
    terraform: Terraform,
    settings: ExecutionSettings,
}

impl JobExecutor {
    pub fn new(pool: DbPool, terraform: Terraform, settings: ExecutionSettings) -> Self {
        Self {
            pool,
            terraform,
            settings,
        }
    }

    /// Run a job that was already claimed (status Running) and record
    /// its terminal transition or retry hop.
    ///
    /// The dedup lock is released on every terminal transition, so the
    /// signature becomes submittable again as soon as the job settles.
    pub async fn execute(&self, job: Job) {
        let outcome = self.run_attempt(&job).await;

        let recorded = match outcome {
            ExecOutcome::Completed(result) => {
                tracing::info!(
                    job_id = %job.id,
                    configuration = %job.configuration,
                    action = %job.action,
                    exit_code = result.exit_code,
                    "Job finished",
                );
                let recorded = JobRepo::complete(&self.pool, job.id, &result).await;
                self.release_lock(&job).await;
                recorded
            }
            ExecOutcome::Retryable(reason) if job.attempts <= self.settings.max_retries => {
                tracing::warn!(
                    job_id = %job.id,
                    attempt = job.attempts,
                    reason = %reason,
                    delay_secs = self.settings.retry_delay.as_secs(),
                    "Transient failure, requeueing",
                );
                JobRepo::requeue_retry(&self.pool, job.id, self.settings.retry_delay).await
            }
            ExecOutcome::Retryable(reason) => {
                tracing::error!(
                    job_id = %job.id,
                    attempt = job.attempts,
                    reason = %reason,
                    "Retries exhausted",
                );
                let recorded = JobRepo::fail(&self.pool, job.id, &reason).await;
                self.release_lock(&job).await;
                recorded
            }
            ExecOutcome::Fatal(reason) => {
                tracing::error!(job_id = %job.id, reason = %reason, "Job failed");
                let recorded = JobRepo::fail(&self.pool, job.id, &reason).await;
                self.release_lock(&job).await;
                recorded
            }
        };

        if let Err(e) = recorded {
            tracing::error!(job_id = %job.id, error = %e, "Failed to record job transition");
        }
    }

    /// One execution attempt. Never panics or raises through the queue:
    /// every condition maps onto the explicit outcome taxonomy.
    async fn run_attempt(&self, job: &Job) -> ExecOutcome {
        let action: Action = match job.action.parse() {
            Ok(action) => action,
            Err(e) => return ExecOutcome::from(e),
        };

        let configuration = match config::find(&self.settings.config_root, &job.configuration) {
            Ok(configuration) => configuration,
            Err(e) => return ExecOutcome::from(e),
        };

        // The runner clones the configuration and selects the workspace;
        // its sandbox is released when it goes out of scope, on every
        // path out of this function.
        let runner = match Runner::new(configuration, &job.workspace, self.terraform.clone()).await
        {
            Ok(runner) => runner,
            Err(e) => return ExecOutcome::from(e),
        };

        match runner.execute(action, &job.variables_map()).await {
            Ok(result) => ExecOutcome::Completed(result),
            Err(e) => ExecOutcome::from(e),
        }
    }

    async fn release_lock(&self, job: &Job) {
        if let Err(e) = DedupRepo::release(&self.pool, &job.dedup_signature).await {
            tracing::error!(job_id = %job.id, error = %e, "Failed to release dedup lock");
        }
    }
}
