//! Static token authentication.
//!
//! Callers present `Authorization: Token <value>`. When no token is
//! configured, authentication fails closed for every request.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

/// Extractor that rejects the request unless the configured API token
/// is presented.
pub struct ApiToken;

impl FromRequestParts<AppState> for ApiToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.api_token.as_deref() else {
            tracing::error!("API token is not configured, auth will fail!");
            return Err(AppError::Unauthorized(
                "API token is not configured".to_string(),
            ));
        };

        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Token "))
            .ok_or_else(|| AppError::Unauthorized("Missing API token".to_string()))?;

        if presented != expected {
            return Err(AppError::Unauthorized("Invalid API token".to_string()));
        }

        Ok(ApiToken)
    }
}
