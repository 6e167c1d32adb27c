//! Execution outcome taxonomy.
//!
//! Retry is an explicit, visible contract: the execution layer reports
//! one of three outcomes and the dispatcher's bounded retry loop consumes
//! them. Nothing is signalled by raising through the queue framework.

use crate::error::CoreError;
use crate::terraform::ExecResult;

/// Result of one execution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    /// The tool ran to completion. The exit code decides whether the job
    /// succeeded; a non-zero code is still a completed attempt.
    Completed(ExecResult),
    /// Transient condition worth a bounded retry.
    Retryable(String),
    /// Non-retryable condition; the job fails immediately.
    Fatal(String),
}

impl From<CoreError> for ExecOutcome {
    fn from(err: CoreError) -> Self {
        match err {
            // Spawn-level I/O failures (fork pressure, fd exhaustion) are
            // worth one retry; everything else in the domain taxonomy is
            // fatal by definition.
            CoreError::Io(_) => ExecOutcome::Retryable(err.to_string()),
            other => ExecOutcome::Fatal(other.to_string()),
        }
    }
}
