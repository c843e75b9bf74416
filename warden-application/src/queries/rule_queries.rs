use tracing::error;

use warden_domain::Rule;

use crate::{AppError, AppState};

pub async fn list_rules(state: &AppState) -> Result<Vec<Rule>, AppError> {
    state.rule_repo.list_rules().await.map_err(|err| {
        error!("failed to list rules: {}", err);
        AppError::Internal(err)
    })
}
