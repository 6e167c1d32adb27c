//! Job entity model and submission DTO.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use groundwork_core::terraform::ExecResult;
use groundwork_core::Action;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::status::{JobStatus, StatusId};

/// A row from the `jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: Uuid,
    pub configuration: String,
    pub action: String,
    pub variables: serde_json::Value,
    pub workspace: String,
    pub dedup_signature: String,
    pub status_id: StatusId,
    pub attempts: i32,
    pub exit_code: Option<i32>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub error_message: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub submitted_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn status(&self) -> Option<JobStatus> {
        JobStatus::from_id(self.status_id)
    }

    /// Decode the stored variables back into an ordered map. Non-string
    /// values cannot occur through the submission path and are skipped.
    pub fn variables_map(&self) -> BTreeMap<String, String> {
        self.variables
            .as_object()
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The captured `(exit_code, stdout, stderr)` triple, present once
    /// the job reached a terminal state through a completed execution.
    pub fn result(&self) -> Option<ExecResult> {
        let exit_code = self.exit_code?;
        Some(ExecResult {
            exit_code,
            stdout: self.stdout.clone().unwrap_or_default(),
            stderr: self.stderr.clone().unwrap_or_default(),
        })
    }
}

/// Parameters for inserting a new queued job.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub configuration: String,
    pub action: Action,
    pub variables: BTreeMap<String, String>,
    pub workspace: String,
    pub dedup_signature: String,
    /// Execution is deferred by this much from submission time.
    pub delay: Duration,
}

impl NewJob {
    pub fn variables_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.variables
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect(),
        )
    }
}
