use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use warden_application::commands::violation_commands;
use warden_application::queries::violation_queries;
use warden_application::queries::violation_queries::ViolationQuery;
use warden_application::AppState;
use warden_domain::{Violation, ViolationId};

use crate::error::HttpError;
use crate::middleware::authorize;

#[derive(serde::Serialize)]
pub struct ViolationList {
    pub violations: Vec<Violation>,
}

pub async fn list_violations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ViolationQuery>,
) -> Result<Json<ViolationList>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let violations = violation_queries::list_violations(&state, query).await?;
    Ok(Json(ViolationList { violations }))
}

pub async fn resolve_violation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<uuid::Uuid>,
) -> Result<StatusCode, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    violation_commands::resolve_violation(&state, ViolationId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
