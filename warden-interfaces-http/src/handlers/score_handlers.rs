use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;

use warden_application::commands::score_commands;
use warden_application::commands::score_commands::{ScoreSubmitOutcome, SubmitScoreRequest};
use warden_application::queries::score_queries;
use warden_application::queries::score_queries::ScoreQuery;
use warden_application::AppState;
use warden_domain::{PlayerId, PlayerScore};

use crate::error::HttpError;
use crate::middleware::authorize;

#[derive(serde::Deserialize)]
pub struct SubmitScorePayload {
    pub player: String,
    #[serde(flatten)]
    pub request: SubmitScoreRequest,
}

#[derive(serde::Serialize)]
pub struct SubmitScoreResponse {
    pub ok: bool,
    pub result: ScoreSubmitOutcome,
}

#[derive(serde::Serialize)]
pub struct ScoreList {
    pub entries: Vec<PlayerScore>,
}

pub async fn submit_score(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SubmitScorePayload>,
) -> Result<Json<SubmitScoreResponse>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    if payload.player.trim().is_empty() {
        return Err(HttpError::BadRequest("player must not be empty".into()));
    }

    let result =
        score_commands::submit_score(&state, PlayerId(payload.player), payload.request).await?;
    Ok(Json(SubmitScoreResponse { ok: true, result }))
}

pub async fn list_scores(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ScoreQuery>,
) -> Result<Json<ScoreList>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let entries = score_queries::list_scores(&state, query).await?;
    Ok(Json(ScoreList { entries }))
}
