use serde::Deserialize;
use tracing::error;

use warden_domain::{ActivityKind, PlayerActivity, PlayerId};

use crate::{AppError, AppState};

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityQuery {
    pub player: String,
    pub kind: Option<ActivityKind>,
    pub limit: Option<usize>,
}

pub async fn list_activities(
    state: &AppState,
    query: ActivityQuery,
) -> Result<Vec<PlayerActivity>, AppError> {
    state
        .activity_repo
        .fetch_for_player(
            &PlayerId(query.player),
            query.kind,
            query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT),
        )
        .await
        .map_err(|err| {
            error!("failed to fetch activities: {}", err);
            AppError::Internal(err)
        })
}
