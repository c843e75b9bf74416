// Repository ports over the document store.
//
// The store guarantees atomicity of a single-document conditional update and
// nothing more. Every mutation below is one such update: no port exposes a
// separate read and write that a caller could compose into an unsafe
// read-modify-write against shared records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    ActivityKind, GuardPrevious, PlayerActivity, PlayerScore, Rule, ScoreKey, ScoreUpdate,
    TelemetryEvent, Violation,
};
use crate::value_objects::{EventId, PlayerId, RuleId, Severity, ViolationId};

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn insert_event(&self, event: &TelemetryEvent) -> anyhow::Result<()>;
    async fn fetch_event(&self, id: &EventId) -> anyhow::Result<Option<TelemetryEvent>>;
    /// Up to `limit` events with `evaluated == false`, oldest first.
    async fn fetch_unevaluated(&self, limit: usize) -> anyhow::Result<Vec<TelemetryEvent>>;
    /// Count of same-type events for one player inside [from, to].
    async fn count_in_window(
        &self,
        player: &PlayerId,
        event_type: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> anyhow::Result<u64>;
    /// One-way transition: set `evaluated = true` and attach the evaluation
    /// outcome. Returns false when the event was already evaluated, in which
    /// case nothing changes.
    async fn mark_evaluated(
        &self,
        id: &EventId,
        matched: &[RuleId],
        result: &serde_json::Value,
    ) -> anyhow::Result<bool>;
    async fn fetch_player_events(
        &self,
        player: &PlayerId,
        limit: usize,
    ) -> anyhow::Result<Vec<TelemetryEvent>>;
    async fn ping(&self) -> anyhow::Result<()>;
}

#[async_trait]
pub trait RuleRepository: Send + Sync {
    async fn insert_rule(&self, rule: &Rule) -> anyhow::Result<()>;
    /// Full replace of an existing rule document. Returns false when absent.
    async fn update_rule(&self, rule: &Rule) -> anyhow::Result<bool>;
    async fn fetch_rule(&self, id: &RuleId) -> anyhow::Result<Option<Rule>>;
    /// Active rules whose name equals the event type (count-mode lookup).
    async fn fetch_active_by_name(&self, name: &str) -> anyhow::Result<Vec<Rule>>;
    /// Active rules configured for a game (range-mode lookup).
    async fn fetch_active_for_game(&self, game_id: &str) -> anyhow::Result<Vec<Rule>>;
    async fn list_rules(&self) -> anyhow::Result<Vec<Rule>>;
}

#[async_trait]
pub trait ViolationRepository: Send + Sync {
    /// Atomic increment-or-create for the (rule, player) violation: bumps
    /// `count`, advances `last_violation_at` (never backward) and clears
    /// `resolved`, or creates the record with `count = 1`. Returns the
    /// post-image.
    async fn record_violation(
        &self,
        rule_id: &RuleId,
        player: &PlayerId,
        severity: Severity,
        evidence: Option<serde_json::Value>,
        at: DateTime<Utc>,
    ) -> anyhow::Result<Violation>;
    async fn fetch_for_player(&self, player: &PlayerId) -> anyhow::Result<Vec<Violation>>;
    async fn list_violations(&self, limit: usize) -> anyhow::Result<Vec<Violation>>;
    /// Manual resolution. Returns false when the violation does not exist.
    async fn resolve(&self, id: &ViolationId) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait ScoreRepository: Send + Sync {
    /// One atomic conditional upsert: `score := max(stored, new_score)`,
    /// `updated_at` advances only on a strict increase. Returns the
    /// post-image together with the pre-image score.
    async fn apply_max_score(
        &self,
        key: &ScoreKey,
        new_score: i64,
        now: DateTime<Utc>,
    ) -> anyhow::Result<ScoreUpdate>;
    async fn fetch_scores(&self, query: &ScoreLookup) -> anyhow::Result<Vec<PlayerScore>>;
}

/// Leaderboard read filter. Results come back score-descending.
#[derive(Debug, Clone, Default)]
pub struct ScoreLookup {
    pub game_id: Option<String>,
    pub scope: Option<crate::value_objects::ScoreScope>,
    pub local_id: Option<String>,
    pub limit: usize,
}

#[async_trait]
pub trait ActivityGuardRepository: Send + Sync {
    /// Atomic conditional set of the per-player guard: `last_activity_at`
    /// becomes `now` only when the stored value is missing, unset, or older
    /// than `threshold`. Returns the pre-image so the caller can decide
    /// whether it won the claim.
    async fn claim_activity(
        &self,
        player: &PlayerId,
        now: DateTime<Utc>,
        threshold: DateTime<Utc>,
    ) -> anyhow::Result<GuardPrevious>;
}

#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn append_activity(&self, activity: &PlayerActivity) -> anyhow::Result<()>;
    async fn fetch_for_player(
        &self,
        player: &PlayerId,
        kind: Option<ActivityKind>,
        limit: usize,
    ) -> anyhow::Result<Vec<PlayerActivity>>;
}
