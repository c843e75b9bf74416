use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use tracing::error;

use warden_application::commands::ingest_commands;
use warden_application::commands::ingest_commands::IngestEventRequest;
use warden_application::queries::event_queries;
use warden_application::queries::event_queries::EventQuery;
use warden_application::AppState;
use warden_domain::TelemetryEvent;

use crate::error::HttpError;
use crate::middleware::{authorize, parse_json_body};

#[derive(serde::Serialize)]
pub struct IngestResponse {
    pub ok: bool,
    pub id: String,
}

#[derive(serde::Serialize)]
pub struct EventList {
    pub events: Vec<TelemetryEvent>,
}

pub async fn ingest_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<(StatusCode, Json<IngestResponse>), HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }

    let request: IngestEventRequest = parse_json_body(&headers, &body).map_err(|err| {
        error!("failed to parse ingest body: {}", err);
        HttpError::BadRequest(err.to_string())
    })?;

    let event_id = ingest_commands::ingest_event(&state, request).await?;
    // Accepted: rule evaluation and activity emission may still be pending.
    Ok((
        StatusCode::ACCEPTED,
        Json(IngestResponse {
            ok: true,
            id: event_id.to_string(),
        }),
    ))
}

pub async fn list_player_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<EventQuery>,
) -> Result<Json<EventList>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let events = event_queries::list_player_events(&state, query).await?;
    Ok(Json(EventList { events }))
}
