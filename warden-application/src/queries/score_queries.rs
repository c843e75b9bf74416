use serde::Deserialize;
use tracing::error;

use warden_domain::{PlayerScore, ScoreLookup, ScoreScope};

use crate::{AppError, AppState};

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreQuery {
    pub game_id: Option<String>,
    pub scope: Option<ScoreScope>,
    pub local_id: Option<String>,
    pub limit: Option<usize>,
}

pub async fn list_scores(state: &AppState, query: ScoreQuery) -> Result<Vec<PlayerScore>, AppError> {
    let lookup = ScoreLookup {
        game_id: query.game_id,
        scope: query.scope,
        local_id: query.local_id,
        limit: query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT),
    };
    state.score_repo.fetch_scores(&lookup).await.map_err(|err| {
        error!("failed to fetch scores: {}", err);
        AppError::Internal(err)
    })
}
