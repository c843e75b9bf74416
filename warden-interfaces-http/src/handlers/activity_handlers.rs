use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;

use warden_application::queries::activity_queries;
use warden_application::queries::activity_queries::ActivityQuery;
use warden_application::AppState;
use warden_domain::PlayerActivity;

use crate::error::HttpError;
use crate::middleware::authorize;

#[derive(serde::Serialize)]
pub struct ActivityList {
    pub activities: Vec<PlayerActivity>,
}

pub async fn list_activities(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<ActivityList>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let activities = activity_queries::list_activities(&state, query).await?;
    Ok(Json(ActivityList { activities }))
}
