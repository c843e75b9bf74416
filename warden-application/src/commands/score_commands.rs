// Score submission flow.
//
// The ledger write is one atomic max-merge upsert; the activity emission is
// gated first by "this submission genuinely raised the stored score" and then
// by the per-player dedup guard claim. Losing either gate is a normal, silent
// outcome.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use warden_domain::{PlayerActivity, PlayerId, ScoreKey, ScoreScope};

use crate::{AppError, AppState};

pub const DEFAULT_GAME_ID: &str = "default";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitScoreRequest {
    pub game_id: Option<String>,
    pub score: i64,
    pub scope: Option<ScoreScope>,
    pub local_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmitOutcome {
    pub updated: bool,
    pub previous_score: Option<i64>,
}

pub async fn submit_score(
    state: &AppState,
    player: PlayerId,
    request: SubmitScoreRequest,
) -> Result<ScoreSubmitOutcome, AppError> {
    let key = ScoreKey {
        player,
        game_id: request
            .game_id
            .unwrap_or_else(|| DEFAULT_GAME_ID.to_string()),
        scope: request.scope.unwrap_or_default(),
        local_id: request.local_id,
    };

    let now = Utc::now();
    let update = state
        .score_repo
        .apply_max_score(&key, request.score, now)
        .await
        .map_err(|err| {
            error!("score ledger update failed: {}", err);
            AppError::Internal(err)
        })?;

    // An equal resubmission of the stored value is not an increase; both
    // conditions must hold before any activity is considered.
    let increased = update
        .previous
        .map_or(true, |previous| request.score > previous);
    let updated = update.stored.score == request.score && increased;
    state.metrics.record_score_submission(updated);

    if updated {
        let threshold = now - Duration::milliseconds(state.config.activity_dedupe_ms as i64);
        let guard = state
            .guard_repo
            .claim_activity(&key.player, now, threshold)
            .await
            .map_err(AppError::Internal)?;

        if guard.won(threshold) {
            let activity = PlayerActivity::high_score(
                key.player.clone(),
                update.previous,
                request.score,
                &key.game_id,
            );
            state
                .activity_repo
                .append_activity(&activity)
                .await
                .map_err(AppError::Internal)?;
            state.metrics.record_activity();
        }
    }

    Ok(ScoreSubmitOutcome {
        updated,
        previous_score: update.previous,
    })
}
