use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use warden_application::commands::evaluate_commands;
use warden_application::AppState;

use crate::error::HttpError;
use crate::middleware::authorize;

#[derive(serde::Serialize)]
pub struct DrainResponse {
    pub processed: usize,
}

pub async fn health_live() -> StatusCode {
    StatusCode::OK
}

pub async fn health_ready(State(state): State<AppState>) -> Result<StatusCode, HttpError> {
    state
        .event_repo
        .ping()
        .await
        .map_err(|err| HttpError::Internal(err.to_string()))?;
    Ok(StatusCode::OK)
}

pub async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render_prometheus(),
    )
}

/// Manual drain trigger, for operators and tests. Runs one cycle with the
/// configured batch size.
pub async fn drain_now(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DrainResponse>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let processed =
        evaluate_commands::drain_pending(&state, state.config.poll_batch_size).await?;
    Ok(Json(DrainResponse { processed }))
}
