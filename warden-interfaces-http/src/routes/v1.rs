use axum::Router;

use warden_application::AppState;

use crate::handlers::{
    activity_handlers, event_handlers, ops_handlers, rule_handlers, score_handlers,
    violation_handlers,
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/events",
            axum::routing::post(event_handlers::ingest_event)
                .get(event_handlers::list_player_events),
        )
        .route(
            "/v1/player-scores",
            axum::routing::post(score_handlers::submit_score).get(score_handlers::list_scores),
        )
        .route(
            "/v1/rules",
            axum::routing::get(rule_handlers::list_rules).post(rule_handlers::create_rule),
        )
        .route("/v1/rules/:id", axum::routing::put(rule_handlers::update_rule))
        .route(
            "/v1/violations",
            axum::routing::get(violation_handlers::list_violations),
        )
        .route(
            "/v1/violations/:id/resolve",
            axum::routing::post(violation_handlers::resolve_violation),
        )
        .route(
            "/v1/activities",
            axum::routing::get(activity_handlers::list_activities),
        )
        .route(
            "/v1/ops/poller/drain",
            axum::routing::post(ops_handlers::drain_now),
        )
        .route(
            "/v1/ops/health/live",
            axum::routing::get(ops_handlers::health_live),
        )
        .route(
            "/v1/ops/health/ready",
            axum::routing::get(ops_handlers::health_ready),
        )
        .route(
            "/v1/ops/metrics/prometheus",
            axum::routing::get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
