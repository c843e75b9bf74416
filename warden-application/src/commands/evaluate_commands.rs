// Rule evaluation.
//
// `evaluate_event` turns one stored event into violation and activity
// records. The entry guard on `evaluated` makes re-invocation a no-op, so a
// crash anywhere before the final `mark_evaluated` is retried safely by the
// next poller cycle. Two evaluator instances can still race past the guard
// together and double-increment a violation: delivery is at-least-once.

use chrono::{Duration, Utc};
use serde_json::json;
use tracing::warn;

use warden_domain::{
    check_payload_range, ActivityKind, EventId, PlayerActivity, PlayerId, RangeCheck, Rule, RuleId,
    Severity, TelemetryEvent, Violation, SNAPSHOT_EVENT_TYPE,
};

use crate::{AppError, AppState};

#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationOutcome {
    /// No such event in the store.
    Missing,
    /// Idempotency guard hit: the event was already evaluated.
    AlreadyEvaluated,
    Evaluated { matched: Vec<RuleId> },
}

pub async fn evaluate_event(
    state: &AppState,
    event_id: &EventId,
) -> Result<EvaluationOutcome, AppError> {
    let Some(event) = state
        .event_repo
        .fetch_event(event_id)
        .await
        .map_err(AppError::Internal)?
    else {
        return Ok(EvaluationOutcome::Missing);
    };
    if event.evaluated {
        return Ok(EvaluationOutcome::AlreadyEvaluated);
    }

    let mut matched = Vec::new();
    let mut cheats = Vec::new();

    // Rules only apply to player-owned events; session events are marked
    // evaluated without any matching.
    if let Some(player) = event.player_id().cloned() {
        matched.extend(run_count_checks(state, &event, &player).await?);

        if event.event_type == SNAPSHOT_EVENT_TYPE {
            if let Some(game_id) = event.game_id.as_deref() {
                let rules = state
                    .rule_repo
                    .fetch_active_for_game(game_id)
                    .await
                    .map_err(AppError::Internal)?;
                let range = run_range_checks(state, &event, &player, &rules).await?;
                matched.extend(range.matched);
                cheats.extend(range.cheats);
            }
        }
    }

    let result = json!({ "matched": &matched });
    state
        .event_repo
        .mark_evaluated(&event.id, &matched, &result)
        .await
        .map_err(AppError::Internal)?;
    state.metrics.record_evaluation(matched.len());

    if !cheats.is_empty() {
        state
            .alert_service
            .spawn_alerts(state.config.clone(), cheats);
    }

    Ok(EvaluationOutcome::Evaluated { matched })
}

/// Count-mode: rules named after the event type match when the number of
/// same-type events for the player inside the rule's window reaches the
/// threshold.
async fn run_count_checks(
    state: &AppState,
    event: &TelemetryEvent,
    player: &PlayerId,
) -> Result<Vec<RuleId>, AppError> {
    let now = Utc::now();
    let rules = state
        .rule_repo
        .fetch_active_by_name(&event.event_type)
        .await
        .map_err(AppError::Internal)?;

    let mut matched = Vec::new();
    for rule in rules {
        let window_start = now - Duration::seconds(i64::from(rule.window_seconds));
        let count = state
            .event_repo
            .count_in_window(player, &event.event_type, window_start, now)
            .await
            .map_err(AppError::Internal)?;
        if count < u64::from(rule.threshold) {
            continue;
        }

        matched.push(rule.id);
        state
            .violation_repo
            .record_violation(
                &rule.id,
                player,
                rule.severity,
                Some(json!({
                    "count": count,
                    "threshold": rule.threshold,
                    "windowSeconds": rule.window_seconds,
                })),
                now,
            )
            .await
            .map_err(AppError::Internal)?;
        state.metrics.record_violation();

        state
            .activity_repo
            .append_activity(&PlayerActivity::new(
                player.clone(),
                Some(event.id),
                ActivityKind::Violation,
                json!({ "rule": rule.name, "count": count }),
            ))
            .await
            .map_err(AppError::Internal)?;
        state.metrics.record_activity();
    }
    Ok(matched)
}

pub(crate) struct RangeCheckResult {
    pub matched: Vec<RuleId>,
    pub cheats: Vec<Violation>,
}

/// Range-mode: shared by the async evaluator and the synchronous snapshot
/// fast path at ingest. One event yields at most one activity per rule by
/// construction, so no dedup guard is involved here.
pub(crate) async fn run_range_checks(
    state: &AppState,
    event: &TelemetryEvent,
    player: &PlayerId,
    rules: &[Rule],
) -> Result<RangeCheckResult, AppError> {
    let now = Utc::now();
    let mut matched = Vec::new();
    let mut cheats = Vec::new();

    for rule in rules {
        match check_payload_range(rule, event.payload.as_ref()) {
            RangeCheck::NoMatch => {}
            RangeCheck::Alert { value, max } => {
                state
                    .activity_repo
                    .append_activity(&PlayerActivity::new(
                        player.clone(),
                        Some(event.id),
                        ActivityKind::Alert,
                        json!({
                            "rule": &rule.name,
                            "attr": value,
                            "max": max,
                            "note": "above normal but within threshold",
                        }),
                    ))
                    .await
                    .map_err(AppError::Internal)?;
                state.metrics.record_activity();
            }
            RangeCheck::Violation {
                value,
                max,
                threshold,
            } => {
                matched.push(rule.id);
                let violation = state
                    .violation_repo
                    .record_violation(
                        &rule.id,
                        player,
                        Severity::Cheat,
                        Some(json!({ "attr": value, "max": max, "threshold": threshold })),
                        now,
                    )
                    .await
                    .map_err(AppError::Internal)?;
                state.metrics.record_violation();

                state
                    .activity_repo
                    .append_activity(&PlayerActivity::new(
                        player.clone(),
                        Some(event.id),
                        ActivityKind::Violation,
                        json!({ "rule": &rule.name, "attr": value }),
                    ))
                    .await
                    .map_err(AppError::Internal)?;
                state.metrics.record_activity();
                cheats.push(violation);
            }
        }
    }
    Ok(RangeCheckResult { matched, cheats })
}

/// One poller drain cycle: select up to `batch` unevaluated events oldest
/// first and evaluate them sequentially. A failure on one event is logged and
/// does not abort the rest of the batch. Returns the number selected.
pub async fn drain_pending(state: &AppState, batch: usize) -> Result<usize, AppError> {
    let pending = state
        .event_repo
        .fetch_unevaluated(batch)
        .await
        .map_err(AppError::Internal)?;

    for event in &pending {
        if let Err(err) = evaluate_event(state, &event.id).await {
            warn!("evaluation of event {} failed: {}", event.id, err);
        }
    }
    state.metrics.record_poll_cycle();
    Ok(pending.len())
}
