use std::path::PathBuf;
use std::time::Duration;

/// Worker configuration loaded from environment variables.
///
/// All fields except the database URL have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Directory whose subdirectories are the known configurations.
    pub config_root: PathBuf,
    /// Number of jobs executed concurrently by this process.
    pub concurrency: usize,
    /// How often the claim loop polls the queue.
    pub poll_interval: Duration,
    /// How many retry hops a retryable failure is allowed.
    pub max_retries: i32,
    /// Delay before a retried job becomes due again.
    pub retry_delay: Duration,
    /// Wall-clock bound on a single Terraform invocation. `None`
    /// disables the bound.
    pub exec_timeout: Option<Duration>,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default            |
    /// |----------------------|--------------------|
    /// | `CONFIG_ROOT`        | `./configurations` |
    /// | `WORKER_CONCURRENCY` | `4`                |
    /// | `POLL_INTERVAL_MS`   | `1000`             |
    /// | `MAX_RETRIES`        | `1`                |
    /// | `RETRY_DELAY_SECS`   | `5`                |
    /// | `EXEC_TIMEOUT_SECS`  | `3600` (`0` = off) |
    pub fn from_env() -> Self {
        let config_root =
            PathBuf::from(std::env::var("CONFIG_ROOT").unwrap_or_else(|_| "./configurations".into()));

        let concurrency: usize = std::env::var("WORKER_CONCURRENCY")
            .unwrap_or_else(|_| "4".into())
            .parse()
            .expect("WORKER_CONCURRENCY must be a valid usize");

        let poll_interval_ms: u64 = std::env::var("POLL_INTERVAL_MS")
            .unwrap_or_else(|_| "1000".into())
            .parse()
            .expect("POLL_INTERVAL_MS must be a valid u64");

        let max_retries: i32 = std::env::var("MAX_RETRIES")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("MAX_RETRIES must be a valid i32");

        let retry_delay_secs: u64 = std::env::var("RETRY_DELAY_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("RETRY_DELAY_SECS must be a valid u64");

        let exec_timeout_secs: u64 = std::env::var("EXEC_TIMEOUT_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("EXEC_TIMEOUT_SECS must be a valid u64");

        Self {
            config_root,
            concurrency,
            poll_interval: Duration::from_millis(poll_interval_ms),
            max_retries,
            retry_delay: Duration::from_secs(retry_delay_secs),
            exec_timeout: (exec_timeout_secs > 0).then(|| Duration::from_secs(exec_timeout_secs)),
        }
    }
}
