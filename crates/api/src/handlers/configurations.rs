//! Handlers for the `/configurations` resource: listing and action
//! submission.

use std::collections::BTreeMap;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::Deserialize;

use groundwork_core::config;
use groundwork_core::workspace::{validate_workspace_name, DEFAULT_WORKSPACE};
use groundwork_core::Action;
use groundwork_queue::SubmitRequest;

use crate::error::AppResult;
use crate::middleware::auth::ApiToken;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/configurations
///
/// List the names of every configuration under the root.
pub async fn list(
    _auth: ApiToken,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let names: Vec<String> = config::discover(&state.config.config_root)?
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    Ok(Json(DataResponse { data: names }))
}

/// Query parameters for action submission.
#[derive(Debug, Deserialize)]
pub struct SubmitParams {
    /// Presence selects asynchronous submission: respond with the job id
    /// instead of waiting for the result.
    #[serde(rename = "async")]
    pub asynchronous: Option<String>,
    /// Defer execution by this many seconds.
    pub delay: Option<u64>,
    /// Target workspace; `default` when absent.
    pub workspace: Option<String>,
}

/// POST /api/v1/configurations/{config}/{action}
///
/// Submit a Terraform action against a configuration. Variables arrive
/// as form fields, one `key=value` per variable. Synchronous callers
/// block until the job settles and receive stdout (or stderr on a
/// non-zero exit); asynchronous callers get the job id immediately.
pub async fn submit_action(
    _auth: ApiToken,
    State(state): State<AppState>,
    Path((config_name, action)): Path<(String, String)>,
    Query(params): Query<SubmitParams>,
    Form(variables): Form<BTreeMap<String, String>>,
) -> AppResult<Response> {
    let action: Action = action.parse()?;

    // Reject unknown configurations and bad workspace names here, so
    // nothing invalid ever reaches the queue.
    config::find(&state.config.config_root, &config_name)?;
    let workspace = params
        .workspace
        .unwrap_or_else(|| DEFAULT_WORKSPACE.to_string());
    validate_workspace_name(&workspace)?;

    tracing::debug!(
        configuration = %config_name,
        action = %action,
        variables = variables.len(),
        "Submitting action",
    );

    let request = SubmitRequest::new(config_name, action)
        .with_variables(variables)
        .with_workspace(workspace)
        .with_delay(Duration::from_secs(params.delay.unwrap_or(0)));

    let id = state.queue.submit(request).await?;

    if params.asynchronous.is_some() {
        return Ok((StatusCode::CREATED, id.to_string()).into_response());
    }

    tracing::debug!(job_id = %id, "Waiting for job to finish");
    let result = state.queue.wait(id).await?;
    if !result.success() {
        return Ok((StatusCode::INTERNAL_SERVER_ERROR, result.stderr).into_response());
    }
    Ok((StatusCode::CREATED, result.stdout).into_response())
}
