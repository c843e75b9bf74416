use serde::Deserialize;
use tracing::error;

use warden_domain::{PlayerId, Violation};

use crate::{AppError, AppState};

const DEFAULT_LIMIT: usize = 100;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViolationQuery {
    pub player: Option<String>,
    pub limit: Option<usize>,
}

pub async fn list_violations(
    state: &AppState,
    query: ViolationQuery,
) -> Result<Vec<Violation>, AppError> {
    let result = match query.player {
        Some(player) => {
            state
                .violation_repo
                .fetch_for_player(&PlayerId(player))
                .await
        }
        None => {
            state
                .violation_repo
                .list_violations(query.limit.unwrap_or(DEFAULT_LIMIT))
                .await
        }
    };
    result.map_err(|err| {
        error!("failed to fetch violations: {}", err);
        AppError::Internal(err)
    })
}
