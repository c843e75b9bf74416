use serde::Deserialize;
use tracing::error;

use warden_domain::{PlayerId, TelemetryEvent};

use crate::{AppError, AppState};

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;

#[derive(Debug, Clone, Deserialize)]
pub struct EventQuery {
    pub player: String,
    pub limit: Option<usize>,
}

pub async fn list_player_events(
    state: &AppState,
    query: EventQuery,
) -> Result<Vec<TelemetryEvent>, AppError> {
    state
        .event_repo
        .fetch_player_events(
            &PlayerId(query.player),
            query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT),
        )
        .await
        .map_err(|err| {
            error!("failed to fetch events: {}", err);
            AppError::Internal(err)
        })
}
