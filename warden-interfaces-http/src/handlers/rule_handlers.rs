use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

use warden_application::commands::rule_commands;
use warden_application::queries::rule_queries;
use warden_application::AppState;
use warden_domain::{Rule, RuleDraft, RuleId};

use crate::error::HttpError;
use crate::middleware::authorize;

#[derive(serde::Serialize)]
pub struct RuleList {
    pub rules: Vec<Rule>,
}

pub async fn list_rules(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RuleList>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let rules = rule_queries::list_rules(&state).await?;
    Ok(Json(RuleList { rules }))
}

pub async fn create_rule(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(draft): Json<RuleDraft>,
) -> Result<Json<Rule>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let rule = rule_commands::create_rule(&state, draft).await?;
    Ok(Json(rule))
}

pub async fn update_rule(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<uuid::Uuid>,
    Json(draft): Json<RuleDraft>,
) -> Result<Json<Rule>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let rule = rule_commands::update_rule(&state, RuleId(id), draft).await?;
    Ok(Json(rule))
}
