//! Handlers for the `/jobs` resource: listing, state, and results.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use groundwork_queue::{ResultLookup, StateFilter};

use crate::error::AppResult;
use crate::middleware::auth::ApiToken;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /api/v1/jobs`.
#[derive(Debug, Deserialize)]
pub struct JobListParams {
    /// `pending`, `started`, or `all` (the default).
    pub state: Option<String>,
}

/// GET /api/v1/jobs
///
/// Job ids filtered by state. Errors when no worker is reachable.
pub async fn list(
    _auth: ApiToken,
    State(state): State<AppState>,
    Query(params): Query<JobListParams>,
) -> AppResult<impl IntoResponse> {
    let filter = match params.state.as_deref() {
        Some(raw) => raw.parse::<StateFilter>()?,
        None => StateFilter::All,
    };

    let ids = state.queue.list_jobs(filter).await?;
    Ok(Json(DataResponse { data: ids }))
}

#[derive(Debug, Serialize)]
pub struct JobStateBody {
    pub id: Uuid,
    pub state: &'static str,
}

/// GET /api/v1/jobs/{id}
///
/// Current lifecycle state of a job.
pub async fn get_state(
    _auth: ApiToken,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let status = state.queue.get_state(id).await?;
    Ok(Json(DataResponse {
        data: JobStateBody {
            id,
            state: status.name(),
        },
    }))
}

/// GET /api/v1/jobs/{id}/result
///
/// Terminal result of a job: stdout on success, stderr with a 500 on a
/// non-zero exit. Unknown ids and jobs that have not settled yet are
/// reported distinctly from execution failures.
pub async fn get_result(
    _auth: ApiToken,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    match state.queue.get_result(id).await? {
        ResultLookup::Ready(result) => {
            if result.success() {
                Ok((StatusCode::OK, result.stdout).into_response())
            } else {
                Ok((StatusCode::INTERNAL_SERVER_ERROR, result.stderr).into_response())
            }
        }
        ResultLookup::Pending | ResultLookup::Unknown => Ok((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": "ID is incorrect or job is still pending",
                "code": "UNKNOWN_OR_PENDING",
            })),
        )
            .into_response()),
    }
}
