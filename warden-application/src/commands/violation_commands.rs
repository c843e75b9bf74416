use warden_domain::ViolationId;

use crate::{AppError, AppState};

pub async fn resolve_violation(state: &AppState, id: ViolationId) -> Result<(), AppError> {
    let resolved = state
        .violation_repo
        .resolve(&id)
        .await
        .map_err(AppError::Internal)?;
    if !resolved {
        return Err(AppError::NotFound);
    }
    Ok(())
}
