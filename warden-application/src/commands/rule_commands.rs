// Administrator rule mutations. Rules are never touched by evaluation.

use chrono::Utc;
use tracing::error;

use warden_domain::{Rule, RuleDraft, RuleId};

use crate::{AppError, AppState};

pub async fn create_rule(state: &AppState, draft: RuleDraft) -> Result<Rule, AppError> {
    if draft.name.trim().is_empty() {
        return Err(AppError::BadRequest("rule name must not be empty".into()));
    }
    if draft.action.trim().is_empty() {
        return Err(AppError::BadRequest("rule action must not be empty".into()));
    }
    let rule = draft.into_rule();
    state
        .rule_repo
        .insert_rule(&rule)
        .await
        .map_err(|err| {
            error!("rule insert failed: {}", err);
            AppError::Internal(err)
        })?;
    Ok(rule)
}

pub async fn update_rule(
    state: &AppState,
    id: RuleId,
    draft: RuleDraft,
) -> Result<Rule, AppError> {
    let Some(existing) = state
        .rule_repo
        .fetch_rule(&id)
        .await
        .map_err(AppError::Internal)?
    else {
        return Err(AppError::NotFound);
    };

    let mut rule = draft.into_rule();
    rule.id = existing.id;
    rule.created_at = existing.created_at;
    rule.updated_at = Utc::now();

    let replaced = state
        .rule_repo
        .update_rule(&rule)
        .await
        .map_err(AppError::Internal)?;
    if !replaced {
        return Err(AppError::NotFound);
    }
    Ok(rule)
}
