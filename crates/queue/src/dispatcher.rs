//! Submission, dedup, and query operations on the shared job queue.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use groundwork_core::signature::dedup_signature;
use groundwork_core::terraform::ExecResult;
use groundwork_core::workspace::DEFAULT_WORKSPACE;
use groundwork_core::Action;
use groundwork_db::models::job::NewJob;
use groundwork_db::models::status::JobStatus;
use groundwork_db::repositories::{DedupAcquire, DedupRepo, JobRepo, WorkerRepo};
use groundwork_db::DbPool;
use uuid::Uuid;

use crate::error::QueueError;

/// Default single-flight cooldown on the dedup lock.
const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

/// A worker is considered reachable while its heartbeat is fresher than
/// this.
const DEFAULT_HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(120);

/// How often `wait` re-checks the job row.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A job submission.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub configuration: String,
    pub action: Action,
    pub variables: BTreeMap<String, String>,
    pub workspace: String,
    /// Defer execution by this much.
    pub delay: Duration,
}

impl SubmitRequest {
    pub fn new(configuration: impl Into<String>, action: Action) -> Self {
        Self {
            configuration: configuration.into(),
            action,
            variables: BTreeMap::new(),
            workspace: DEFAULT_WORKSPACE.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_variables(mut self, variables: BTreeMap<String, String>) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_workspace(mut self, workspace: impl Into<String>) -> Self {
        self.workspace = workspace.into();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// State filter for job listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateFilter {
    /// Queued or Retrying.
    Pending,
    /// Running.
    Started,
    All,
}

impl FromStr for StateFilter {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(StateFilter::Pending),
            "started" => Ok(StateFilter::Started),
            "all" => Ok(StateFilter::All),
            other => Err(QueueError::InvalidStateFilter(other.to_string())),
        }
    }
}

/// Outcome of a result query, distinct from true failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultLookup {
    Ready(ExecResult),
    Pending,
    Unknown,
}

/// Handle on the shared job queue for submitters and pollers.
#[derive(Debug, Clone)]
pub struct JobQueue {
    pool: DbPool,
    cooldown: Duration,
    heartbeat_timeout: Duration,
}

impl JobQueue {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            cooldown: DEFAULT_COOLDOWN,
            heartbeat_timeout: DEFAULT_HEARTBEAT_TIMEOUT,
        }
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_heartbeat_timeout(mut self, timeout: Duration) -> Self {
        self.heartbeat_timeout = timeout;
        self
    }

    /// Submit a job. Non-blocking: returns the job id as soon as the row
    /// is queued.
    ///
    /// Enforces single-flight per dedup signature: while an earlier
    /// submission with the same configuration, action, and variables is
    /// active, this returns [`QueueError::AlreadyQueued`] with the
    /// remaining cooldown.
    pub async fn submit(&self, request: SubmitRequest) -> Result<Uuid, QueueError> {
        let signature = dedup_signature(
            &request.configuration,
            request.action.as_str(),
            &request.variables,
        );

        match DedupRepo::acquire(&self.pool, &signature, self.cooldown).await? {
            DedupAcquire::Held { remaining } => {
                tracing::debug!(
                    configuration = %request.configuration,
                    action = %request.action,
                    remaining_secs = remaining.as_secs(),
                    "Duplicate submission rejected",
                );
                Err(QueueError::AlreadyQueued { remaining })
            }
            DedupAcquire::Acquired => {
                let new_job = NewJob {
                    configuration: request.configuration,
                    action: request.action,
                    variables: request.variables,
                    workspace: request.workspace,
                    dedup_signature: signature.clone(),
                    delay: request.delay,
                };

                match JobRepo::submit(&self.pool, &new_job).await {
                    Ok(job) => {
                        tracing::info!(
                            job_id = %job.id,
                            configuration = %job.configuration,
                            action = %job.action,
                            workspace = %job.workspace,
                            "Job submitted",
                        );
                        Ok(job.id)
                    }
                    Err(e) => {
                        // Do not leave the signature locked for a job
                        // that never made it onto the queue.
                        let _ = DedupRepo::release(&self.pool, &signature).await;
                        Err(e.into())
                    }
                }
            }
        }
    }

    /// Current lifecycle state of a job.
    pub async fn get_state(&self, id: Uuid) -> Result<JobStatus, QueueError> {
        JobRepo::status_of(&self.pool, id)
            .await?
            .ok_or(QueueError::UnknownJob(id))
    }

    /// The job's result triple once it reached a terminal state.
    ///
    /// A job that failed fatally (no execution triple) reports the error
    /// message as stderr with a -1 exit code.
    pub async fn get_result(&self, id: Uuid) -> Result<ResultLookup, QueueError> {
        let Some(job) = JobRepo::find_by_id(&self.pool, id).await? else {
            return Ok(ResultLookup::Unknown);
        };

        if !job.status().is_some_and(JobStatus::is_terminal) {
            return Ok(ResultLookup::Pending);
        }

        let result = job.result().unwrap_or_else(|| ExecResult {
            exit_code: -1,
            stdout: String::new(),
            stderr: job.error_message.clone().unwrap_or_default(),
        });
        Ok(ResultLookup::Ready(result))
    }

    /// Block until the job reaches a terminal state, then return its
    /// result.
    pub async fn wait(&self, id: Uuid) -> Result<ExecResult, QueueError> {
        loop {
            match self.get_result(id).await? {
                ResultLookup::Ready(result) => return Ok(result),
                ResultLookup::Unknown => return Err(QueueError::UnknownJob(id)),
                ResultLookup::Pending => tokio::time::sleep(WAIT_POLL_INTERVAL).await,
            }
        }
    }

    /// Job ids matching the state filter.
    ///
    /// Errors with [`QueueError::NoWorkers`] when no worker heartbeat is
    /// fresh, since listing queue state without anyone executing it is
    /// misleading.
    pub async fn list_jobs(&self, filter: StateFilter) -> Result<Vec<Uuid>, QueueError> {
        if !WorkerRepo::any_alive(&self.pool, self.heartbeat_timeout).await? {
            return Err(QueueError::NoWorkers);
        }

        let ids = match filter {
            StateFilter::Pending => {
                JobRepo::list_ids_by_status(&self.pool, &[JobStatus::Queued, JobStatus::Retrying])
                    .await?
            }
            StateFilter::Started => {
                JobRepo::list_ids_by_status(&self.pool, &[JobStatus::Running]).await?
            }
            StateFilter::All => JobRepo::list_all_ids(&self.pool).await?,
        };
        Ok(ids)
    }
}
