// End-to-end flows over the in-process store: score submission with activity
// dedup, count-mode and range-mode evaluation, and poller drain semantics.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use warden_application::commands::{evaluate_commands, ingest_commands, score_commands};
use warden_application::commands::evaluate_commands::EvaluationOutcome;
use warden_application::commands::ingest_commands::IngestEventRequest;
use warden_application::commands::score_commands::SubmitScoreRequest;
use warden_application::{AppError, AppState, Metrics};
use warden_domain::{
    ActivityKind, EventOwner, NormalRange, PlayerId, Rule, RuleId, RuntimeConfig, Severity,
    TelemetryEvent,
};

use crate::repositories::MemoryStore;
use crate::services::DefaultAlertService;

pub(crate) fn test_config() -> RuntimeConfig {
    RuntimeConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        api_token: None,
        rules_path: "./rules.yaml".to_string(),
        poller_enabled: false,
        poll_interval_seconds: 30,
        poll_batch_size: 100,
        activity_dedupe_ms: 5000,
        alert_webhook_url: None,
        alert_webhook_template: None,
        alert_webhook_token: None,
        max_body_bytes: 1024 * 1024,
        request_timeout_seconds: 15,
    }
}

pub(crate) fn test_state() -> AppState {
    let store = Arc::new(MemoryStore::new());
    AppState {
        config: test_config(),
        event_repo: store.clone(),
        rule_repo: store.clone(),
        violation_repo: store.clone(),
        score_repo: store.clone(),
        guard_repo: store.clone(),
        activity_repo: store,
        alert_service: Arc::new(DefaultAlertService::new()),
        metrics: Arc::new(Metrics::default()),
    }
}

pub(crate) fn count_rule(name: &str, threshold: u32, window_seconds: u32) -> Rule {
    let now = Utc::now();
    Rule {
        id: RuleId::new(),
        name: name.to_string(),
        game_id: None,
        description: None,
        action: "count".to_string(),
        threshold,
        window_seconds,
        normals: HashMap::new(),
        severity: Severity::Medium,
        active: true,
        created_at: now,
        updated_at: now,
    }
}

fn range_rule(game_id: &str, action: &str, max: f64, threshold: f64) -> Rule {
    let now = Utc::now();
    let mut normals = HashMap::new();
    normals.insert(
        action.to_string(),
        NormalRange {
            min: Some(0.0),
            max: Some(max),
            threshold: Some(threshold),
        },
    );
    Rule {
        id: RuleId::new(),
        name: format!("{}-range", action),
        game_id: Some(game_id.to_string()),
        description: None,
        action: action.to_string(),
        threshold: 1,
        window_seconds: 60,
        normals,
        severity: Severity::High,
        active: true,
        created_at: now,
        updated_at: now,
    }
}

fn submit(score: i64) -> SubmitScoreRequest {
    SubmitScoreRequest {
        game_id: Some("arcade".to_string()),
        score,
        scope: None,
        local_id: None,
    }
}

async fn high_score_activities(state: &AppState, player: &PlayerId) -> usize {
    state
        .activity_repo
        .fetch_for_player(player, Some(ActivityKind::HighScore), 100)
        .await
        .unwrap()
        .len()
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_identical_scores_emit_one_activity() {
    let state = test_state();
    let player = PlayerId("fresh-player".to_string());

    let mut handles = Vec::new();
    for _ in 0..30 {
        let state = state.clone();
        let player = player.clone();
        handles.push(tokio::spawn(async move {
            score_commands::submit_score(&state, player, submit(424_242)).await
        }));
    }
    let mut updated_count = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().updated {
            updated_count += 1;
        }
    }

    assert!(updated_count >= 1);
    assert_eq!(high_score_activities(&state, &player).await, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_mixed_scores_keep_max_and_emit_one_activity() {
    let state = test_state();
    let player = PlayerId("p1".to_string());

    let mut handles = Vec::new();
    for score in [100, 250, 75, 999, 500] {
        let state = state.clone();
        let player = player.clone();
        handles.push(tokio::spawn(async move {
            score_commands::submit_score(&state, player, submit(score)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let scores = state
        .score_repo
        .fetch_scores(&warden_domain::ScoreLookup {
            game_id: Some("arcade".to_string()),
            limit: 10,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(scores[0].score, 999);
    assert_eq!(high_score_activities(&state, &player).await, 1);
}

#[tokio::test]
async fn equal_resubmission_is_not_an_increase() {
    let state = test_state();
    let player = PlayerId("p1".to_string());

    let first = score_commands::submit_score(&state, player.clone(), submit(500))
        .await
        .unwrap();
    assert!(first.updated);
    assert_eq!(first.previous_score, None);

    let second = score_commands::submit_score(&state, player.clone(), submit(500))
        .await
        .unwrap();
    assert!(!second.updated);
    assert_eq!(second.previous_score, Some(500));

    let lower = score_commands::submit_score(&state, player.clone(), submit(10))
        .await
        .unwrap();
    assert!(!lower.updated);

    assert_eq!(high_score_activities(&state, &player).await, 1);
}

#[tokio::test]
async fn repeated_increases_within_window_are_deduplicated() {
    let state = test_state();
    let player = PlayerId("p1".to_string());

    for score in [100, 200, 300] {
        let outcome = score_commands::submit_score(&state, player.clone(), submit(score))
            .await
            .unwrap();
        assert!(outcome.updated);
    }

    // All three were genuine increases, but only the first claimed the guard.
    assert_eq!(high_score_activities(&state, &player).await, 1);
}

#[tokio::test]
async fn count_rule_matches_at_threshold_only() {
    let state = test_state();
    let player = PlayerId("p1".to_string());
    let rule = count_rule("rapid-fire", 3, 60);
    state.rule_repo.insert_rule(&rule).await.unwrap();

    for _ in 0..2 {
        let event =
            TelemetryEvent::new(EventOwner::Player(player.clone()), "rapid-fire", None, None);
        state.event_repo.insert_event(&event).await.unwrap();
    }
    evaluate_commands::drain_pending(&state, 100).await.unwrap();
    assert!(state
        .violation_repo
        .fetch_for_player(&player)
        .await
        .unwrap()
        .is_empty());

    let third = TelemetryEvent::new(EventOwner::Player(player.clone()), "rapid-fire", None, None);
    state.event_repo.insert_event(&third).await.unwrap();
    evaluate_commands::drain_pending(&state, 100).await.unwrap();

    let violations = state
        .violation_repo
        .fetch_for_player(&player)
        .await
        .unwrap();
    assert_eq!(violations.len(), 1);
    assert!(violations[0].count >= 1);
    assert_eq!(violations[0].rule_id, rule.id);
}

#[tokio::test]
async fn evaluation_is_idempotent() {
    let state = test_state();
    let player = PlayerId("p1".to_string());
    let rule = count_rule("spam", 1, 60);
    state.rule_repo.insert_rule(&rule).await.unwrap();

    let event = TelemetryEvent::new(EventOwner::Player(player.clone()), "spam", None, None);
    state.event_repo.insert_event(&event).await.unwrap();

    let first = evaluate_commands::evaluate_event(&state, &event.id)
        .await
        .unwrap();
    assert!(matches!(first, EvaluationOutcome::Evaluated { .. }));

    let second = evaluate_commands::evaluate_event(&state, &event.id)
        .await
        .unwrap();
    assert_eq!(second, EvaluationOutcome::AlreadyEvaluated);

    let violations = state
        .violation_repo
        .fetch_for_player(&player)
        .await
        .unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].count, 1);
}

#[tokio::test]
async fn partial_drain_does_not_double_count_on_redrain() {
    let state = test_state();
    let player = PlayerId("p1".to_string());
    let rule = count_rule("spam", 1, 60);
    state.rule_repo.insert_rule(&rule).await.unwrap();

    for _ in 0..3 {
        let event = TelemetryEvent::new(EventOwner::Player(player.clone()), "spam", None, None);
        state.event_repo.insert_event(&event).await.unwrap();
    }

    // First cycle stops after two events, as if the process restarted.
    let drained = evaluate_commands::drain_pending(&state, 2).await.unwrap();
    assert_eq!(drained, 2);
    let violations = state
        .violation_repo
        .fetch_for_player(&player)
        .await
        .unwrap();
    assert_eq!(violations[0].count, 2);

    // Re-draining picks up only the remaining event.
    let drained = evaluate_commands::drain_pending(&state, 100).await.unwrap();
    assert_eq!(drained, 1);
    let violations = state
        .violation_repo
        .fetch_for_player(&player)
        .await
        .unwrap();
    assert_eq!(violations[0].count, 3);

    // A further cycle finds nothing and changes nothing.
    let drained = evaluate_commands::drain_pending(&state, 100).await.unwrap();
    assert_eq!(drained, 0);
    let violations = state
        .violation_repo
        .fetch_for_player(&player)
        .await
        .unwrap();
    assert_eq!(violations[0].count, 3);
}

#[tokio::test]
async fn snapshot_above_normal_raises_alert_without_violation() {
    let state = test_state();
    let player = PlayerId("p1".to_string());
    let rule = range_rule("racer", "speed", 100.0, 150.0);
    state.rule_repo.insert_rule(&rule).await.unwrap();

    let event_id = ingest_commands::ingest_event(
        &state,
        IngestEventRequest {
            player_id: Some("p1".to_string()),
            session_id: None,
            event_type: "snapshot".to_string(),
            game_id: Some("racer".to_string()),
            payload: Some(json!({"speed": 120.0})),
        },
    )
    .await
    .unwrap();

    assert!(state
        .violation_repo
        .fetch_for_player(&player)
        .await
        .unwrap()
        .is_empty());
    let alerts = state
        .activity_repo
        .fetch_for_player(&player, Some(ActivityKind::Alert), 10)
        .await
        .unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].event_ref, Some(event_id));

    // The fast path marked the snapshot evaluated; the poller finds nothing.
    let drained = evaluate_commands::drain_pending(&state, 100).await.unwrap();
    assert_eq!(drained, 0);
    let alerts = state
        .activity_repo
        .fetch_for_player(&player, Some(ActivityKind::Alert), 10)
        .await
        .unwrap();
    assert_eq!(alerts.len(), 1);
}

#[tokio::test]
async fn snapshot_past_threshold_escalates_to_cheat_violation() {
    let state = test_state();
    let player = PlayerId("p1".to_string());
    let rule = range_rule("racer", "speed", 100.0, 150.0);
    state.rule_repo.insert_rule(&rule).await.unwrap();

    ingest_commands::ingest_event(
        &state,
        IngestEventRequest {
            player_id: Some("p1".to_string()),
            session_id: None,
            event_type: "snapshot".to_string(),
            game_id: Some("racer".to_string()),
            payload: Some(json!({"speed": 200.0})),
        },
    )
    .await
    .unwrap();

    let violations = state
        .violation_repo
        .fetch_for_player(&player)
        .await
        .unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].severity, Severity::Cheat);

    let activities = state
        .activity_repo
        .fetch_for_player(&player, Some(ActivityKind::Violation), 10)
        .await
        .unwrap();
    assert_eq!(activities.len(), 1);
}

#[tokio::test]
async fn non_numeric_snapshot_attribute_matches_nothing() {
    let state = test_state();
    let player = PlayerId("p1".to_string());
    let rule = range_rule("racer", "speed", 100.0, 150.0);
    state.rule_repo.insert_rule(&rule).await.unwrap();

    ingest_commands::ingest_event(
        &state,
        IngestEventRequest {
            player_id: Some("p1".to_string()),
            session_id: None,
            event_type: "snapshot".to_string(),
            game_id: Some("racer".to_string()),
            payload: Some(json!({"speed": "plaid"})),
        },
    )
    .await
    .unwrap();

    assert!(state
        .violation_repo
        .fetch_for_player(&player)
        .await
        .unwrap()
        .is_empty());
    let activities = state
        .activity_repo
        .fetch_for_player(&player, None, 10)
        .await
        .unwrap();
    assert!(activities.is_empty());
}

#[tokio::test]
async fn ingest_requires_exactly_one_owner() {
    let state = test_state();

    let both = ingest_commands::ingest_event(
        &state,
        IngestEventRequest {
            player_id: Some("p1".to_string()),
            session_id: Some("s1".to_string()),
            event_type: "jump".to_string(),
            game_id: None,
            payload: None,
        },
    )
    .await;
    assert!(matches!(both, Err(AppError::BadRequest(_))));

    let neither = ingest_commands::ingest_event(
        &state,
        IngestEventRequest {
            player_id: None,
            session_id: None,
            event_type: "jump".to_string(),
            game_id: None,
            payload: None,
        },
    )
    .await;
    assert!(matches!(neither, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn session_events_are_marked_evaluated_without_matching() {
    let state = test_state();
    let rule = count_rule("jump", 1, 60);
    state.rule_repo.insert_rule(&rule).await.unwrap();

    ingest_commands::ingest_event(
        &state,
        IngestEventRequest {
            player_id: None,
            session_id: Some("guest-7".to_string()),
            event_type: "jump".to_string(),
            game_id: None,
            payload: None,
        },
    )
    .await
    .unwrap();

    let drained = evaluate_commands::drain_pending(&state, 100).await.unwrap();
    assert_eq!(drained, 1);
    let drained = evaluate_commands::drain_pending(&state, 100).await.unwrap();
    assert_eq!(drained, 0);
}

#[tokio::test]
async fn payload_score_submits_to_the_ledger() {
    let state = test_state();
    let player = PlayerId("p1".to_string());

    ingest_commands::ingest_event(
        &state,
        IngestEventRequest {
            player_id: Some("p1".to_string()),
            session_id: None,
            event_type: "match-result".to_string(),
            game_id: Some("arcade".to_string()),
            payload: Some(json!({"score": 424242})),
        },
    )
    .await
    .unwrap();

    let scores = state
        .score_repo
        .fetch_scores(&warden_domain::ScoreLookup {
            game_id: Some("arcade".to_string()),
            limit: 10,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].score, 424_242);
    assert_eq!(high_score_activities(&state, &player).await, 1);
}
