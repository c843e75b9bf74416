// Event ingestion.
//
// The caller gets its event id back as soon as the append succeeds; the
// snapshot fast path and the payload-score submission run afterwards as
// best-effort work whose failures are logged, never surfaced.

use serde::Deserialize;
use tracing::warn;

use warden_domain::{EventId, EventOwner, PlayerId, SessionId, TelemetryEvent, SNAPSHOT_EVENT_TYPE};

use crate::commands::{evaluate_commands, score_commands};
use crate::commands::score_commands::SubmitScoreRequest;
use crate::{AppError, AppState};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestEventRequest {
    pub player_id: Option<String>,
    pub session_id: Option<String>,
    pub event_type: String,
    pub game_id: Option<String>,
    pub payload: Option<serde_json::Value>,
}

pub async fn ingest_event(
    state: &AppState,
    request: IngestEventRequest,
) -> Result<EventId, AppError> {
    let owner = resolve_owner(request.player_id, request.session_id)?;
    if request.event_type.trim().is_empty() {
        return Err(AppError::BadRequest("event_type must not be empty".into()));
    }

    let event = TelemetryEvent::new(owner, request.event_type, request.game_id, request.payload);
    let event_id = event.id;
    state
        .event_repo
        .insert_event(&event)
        .await
        .map_err(|err| {
            state.metrics.record_ingest_error();
            AppError::Internal(err)
        })?;
    state.metrics.record_ingest();

    // Snapshot events are evaluated inline so range-mode findings surface
    // immediately; the idempotency guard turns the poller's later pass into
    // a no-op.
    if event.event_type == SNAPSHOT_EVENT_TYPE {
        if let Err(err) = evaluate_commands::evaluate_event(state, &event_id).await {
            warn!("snapshot fast-path evaluation failed for {}: {}", event_id, err);
        }
    }

    if let Some(player) = event.player_id() {
        if let Some(score) = payload_score(event.payload.as_ref()) {
            let submit = SubmitScoreRequest {
                game_id: event.game_id.clone(),
                score,
                scope: event
                    .payload
                    .as_ref()
                    .and_then(|p| p.get("scope"))
                    .and_then(|v| serde_json::from_value(v.clone()).ok()),
                local_id: event
                    .payload
                    .as_ref()
                    .and_then(|p| p.get("localId"))
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_string),
            };
            if let Err(err) = score_commands::submit_score(state, player.clone(), submit).await {
                warn!("payload score submission failed for {}: {}", event_id, err);
            }
        }
    }

    Ok(event_id)
}

fn resolve_owner(
    player_id: Option<String>,
    session_id: Option<String>,
) -> Result<EventOwner, AppError> {
    let player_id = player_id.filter(|id| !id.trim().is_empty());
    let session_id = session_id.filter(|id| !id.trim().is_empty());
    match (player_id, session_id) {
        (Some(player), None) => Ok(EventOwner::Player(PlayerId(player))),
        (None, Some(session)) => Ok(EventOwner::Session(SessionId(session))),
        (Some(_), Some(_)) => Err(AppError::BadRequest(
            "exactly one of playerId and sessionId must be set".into(),
        )),
        (None, None) => Err(AppError::BadRequest(
            "one of playerId or sessionId is required".into(),
        )),
    }
}

fn payload_score(payload: Option<&serde_json::Value>) -> Option<i64> {
    payload.and_then(|p| p.get("score")).and_then(|v| v.as_i64())
}
