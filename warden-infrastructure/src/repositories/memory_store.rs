// In-process document store adapter.
//
// Provides exactly the baseline guarantee the ports assume: atomicity of one
// conditional update against one document, and nothing across documents.
// Every mutation happens inside a single critical section over its
// collection; the pre-image a caller needs for its decision is captured in
// that same section.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use warden_domain::{
    ActivityGuard, ActivityKind, EventId, GuardPrevious, PlayerActivity, PlayerId, PlayerScore,
    Rule, RuleId, ScoreKey, ScoreLookup, ScoreUpdate, Severity, TelemetryEvent, Violation,
    ViolationId,
};
use warden_domain::{
    ActivityGuardRepository, ActivityRepository, EventRepository, RuleRepository, ScoreRepository,
    ViolationRepository,
};

#[derive(Default)]
pub struct MemoryStore {
    // Append order doubles as created_at order for FIFO batch selection.
    events: RwLock<Vec<TelemetryEvent>>,
    rules: RwLock<HashMap<RuleId, Rule>>,
    violations: RwLock<HashMap<(RuleId, PlayerId), Violation>>,
    scores: RwLock<HashMap<ScoreKey, PlayerScore>>,
    guards: RwLock<HashMap<PlayerId, ActivityGuard>>,
    activities: RwLock<Vec<PlayerActivity>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn insert_event(&self, event: &TelemetryEvent) -> anyhow::Result<()> {
        self.events.write().await.push(event.clone());
        Ok(())
    }

    async fn fetch_event(&self, id: &EventId) -> anyhow::Result<Option<TelemetryEvent>> {
        let events = self.events.read().await;
        Ok(events.iter().find(|event| event.id == *id).cloned())
    }

    async fn fetch_unevaluated(&self, limit: usize) -> anyhow::Result<Vec<TelemetryEvent>> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|event| !event.evaluated)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_in_window(
        &self,
        player: &PlayerId,
        event_type: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> anyhow::Result<u64> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|event| {
                event.player_id() == Some(player)
                    && event.event_type == event_type
                    && event.created_at >= from
                    && event.created_at <= to
            })
            .count() as u64)
    }

    async fn mark_evaluated(
        &self,
        id: &EventId,
        matched: &[RuleId],
        result: &serde_json::Value,
    ) -> anyhow::Result<bool> {
        let mut events = self.events.write().await;
        let Some(event) = events.iter_mut().find(|event| event.id == *id) else {
            anyhow::bail!("event {} not found", id);
        };
        if event.evaluated {
            return Ok(false);
        }
        event.evaluated = true;
        event.matched_rule_ids = matched.to_vec();
        event.evaluation_result = Some(result.clone());
        Ok(true)
    }

    async fn fetch_player_events(
        &self,
        player: &PlayerId,
        limit: usize,
    ) -> anyhow::Result<Vec<TelemetryEvent>> {
        let events = self.events.read().await;
        // Newest first for log reads.
        Ok(events
            .iter()
            .rev()
            .filter(|event| event.player_id() == Some(player))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl RuleRepository for MemoryStore {
    async fn insert_rule(&self, rule: &Rule) -> anyhow::Result<()> {
        self.rules.write().await.insert(rule.id, rule.clone());
        Ok(())
    }

    async fn update_rule(&self, rule: &Rule) -> anyhow::Result<bool> {
        let mut rules = self.rules.write().await;
        if !rules.contains_key(&rule.id) {
            return Ok(false);
        }
        rules.insert(rule.id, rule.clone());
        Ok(true)
    }

    async fn fetch_rule(&self, id: &RuleId) -> anyhow::Result<Option<Rule>> {
        Ok(self.rules.read().await.get(id).cloned())
    }

    async fn fetch_active_by_name(&self, name: &str) -> anyhow::Result<Vec<Rule>> {
        let rules = self.rules.read().await;
        Ok(rules
            .values()
            .filter(|rule| rule.active && rule.name == name)
            .cloned()
            .collect())
    }

    async fn fetch_active_for_game(&self, game_id: &str) -> anyhow::Result<Vec<Rule>> {
        let rules = self.rules.read().await;
        Ok(rules
            .values()
            .filter(|rule| rule.active && rule.game_id.as_deref() == Some(game_id))
            .cloned()
            .collect())
    }

    async fn list_rules(&self) -> anyhow::Result<Vec<Rule>> {
        let rules = self.rules.read().await;
        let mut list: Vec<Rule> = rules.values().cloned().collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(list)
    }
}

#[async_trait]
impl ViolationRepository for MemoryStore {
    async fn record_violation(
        &self,
        rule_id: &RuleId,
        player: &PlayerId,
        severity: Severity,
        evidence: Option<serde_json::Value>,
        at: DateTime<Utc>,
    ) -> anyhow::Result<Violation> {
        let mut violations = self.violations.write().await;
        let entry = violations
            .entry((*rule_id, player.clone()))
            .and_modify(|violation| {
                violation.count += 1;
                // last_violation_at never moves backward.
                if at > violation.last_violation_at {
                    violation.last_violation_at = at;
                }
                violation.resolved = false;
                violation.severity = severity;
            })
            .or_insert_with(|| {
                Violation::new(*rule_id, player.clone(), severity, evidence.clone(), at)
            });
        if entry.count > 1 {
            if let Some(evidence) = evidence {
                entry.evidence = Some(evidence);
            }
        }
        Ok(entry.clone())
    }

    async fn fetch_for_player(&self, player: &PlayerId) -> anyhow::Result<Vec<Violation>> {
        let violations = self.violations.read().await;
        let mut list: Vec<Violation> = violations
            .values()
            .filter(|violation| violation.player_id == *player)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.last_violation_at.cmp(&a.last_violation_at));
        Ok(list)
    }

    async fn list_violations(&self, limit: usize) -> anyhow::Result<Vec<Violation>> {
        let violations = self.violations.read().await;
        let mut list: Vec<Violation> = violations.values().cloned().collect();
        list.sort_by(|a, b| b.last_violation_at.cmp(&a.last_violation_at));
        list.truncate(limit);
        Ok(list)
    }

    async fn resolve(&self, id: &ViolationId) -> anyhow::Result<bool> {
        let mut violations = self.violations.write().await;
        for violation in violations.values_mut() {
            if violation.id == *id {
                violation.resolved = true;
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[async_trait]
impl ScoreRepository for MemoryStore {
    async fn apply_max_score(
        &self,
        key: &ScoreKey,
        new_score: i64,
        now: DateTime<Utc>,
    ) -> anyhow::Result<ScoreUpdate> {
        let mut scores = self.scores.write().await;
        match scores.get_mut(key) {
            Some(stored) => {
                let previous = stored.score;
                if new_score > previous {
                    stored.score = new_score;
                    stored.updated_at = now;
                }
                Ok(ScoreUpdate {
                    stored: stored.clone(),
                    previous: Some(previous),
                })
            }
            None => {
                let created = PlayerScore {
                    player: key.player.clone(),
                    game_id: key.game_id.clone(),
                    scope: key.scope,
                    local_id: key.local_id.clone(),
                    score: new_score,
                    created_at: now,
                    updated_at: now,
                };
                scores.insert(key.clone(), created.clone());
                Ok(ScoreUpdate {
                    stored: created,
                    previous: None,
                })
            }
        }
    }

    async fn fetch_scores(&self, query: &ScoreLookup) -> anyhow::Result<Vec<PlayerScore>> {
        let scores = self.scores.read().await;
        let mut list: Vec<PlayerScore> = scores
            .values()
            .filter(|score| {
                query
                    .game_id
                    .as_deref()
                    .map_or(true, |game_id| score.game_id == game_id)
                    && query.scope.map_or(true, |scope| score.scope == scope)
                    && query
                        .local_id
                        .as_deref()
                        .map_or(true, |local_id| score.local_id.as_deref() == Some(local_id))
            })
            .cloned()
            .collect();
        list.sort_by(|a, b| b.score.cmp(&a.score));
        list.truncate(query.limit);
        Ok(list)
    }
}

#[async_trait]
impl ActivityGuardRepository for MemoryStore {
    async fn claim_activity(
        &self,
        player: &PlayerId,
        now: DateTime<Utc>,
        threshold: DateTime<Utc>,
    ) -> anyhow::Result<GuardPrevious> {
        let mut guards = self.guards.write().await;
        match guards.get_mut(player) {
            Some(guard) => {
                let previous = match guard.last_activity_at {
                    Some(t) => GuardPrevious::At(t),
                    None => GuardPrevious::Unset,
                };
                let stale = match guard.last_activity_at {
                    Some(t) => t < threshold,
                    None => true,
                };
                if stale {
                    guard.last_activity_at = Some(now);
                }
                Ok(previous)
            }
            None => {
                guards.insert(
                    player.clone(),
                    ActivityGuard {
                        player: player.clone(),
                        last_activity_at: Some(now),
                    },
                );
                Ok(GuardPrevious::Missing)
            }
        }
    }
}

#[async_trait]
impl ActivityRepository for MemoryStore {
    async fn append_activity(&self, activity: &PlayerActivity) -> anyhow::Result<()> {
        self.activities.write().await.push(activity.clone());
        Ok(())
    }

    async fn fetch_for_player(
        &self,
        player: &PlayerId,
        kind: Option<ActivityKind>,
        limit: usize,
    ) -> anyhow::Result<Vec<PlayerActivity>> {
        let activities = self.activities.read().await;
        Ok(activities
            .iter()
            .rev()
            .filter(|activity| {
                activity.player == *player && kind.map_or(true, |kind| activity.kind == kind)
            })
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use serde_json::json;

    use super::*;
    use warden_domain::{EventOwner, ScoreScope};

    fn score_key(player: &str) -> ScoreKey {
        ScoreKey {
            player: PlayerId(player.to_string()),
            game_id: "arcade".to_string(),
            scope: ScoreScope::Global,
            local_id: None,
        }
    }

    #[tokio::test]
    async fn max_score_keeps_only_the_maximum() {
        let store = MemoryStore::new();
        let key = score_key("p1");
        for score in [100, 250, 75, 999, 500] {
            store.apply_max_score(&key, score, Utc::now()).await.unwrap();
        }
        let update = store.apply_max_score(&key, 1, Utc::now()).await.unwrap();
        assert_eq!(update.stored.score, 999);
        assert_eq!(update.previous, Some(999));
    }

    #[tokio::test]
    async fn updated_at_advances_only_on_strict_increase() {
        let store = MemoryStore::new();
        let key = score_key("p1");
        let t1 = Utc::now();
        store.apply_max_score(&key, 100, t1).await.unwrap();
        let t2 = t1 + Duration::seconds(5);
        let update = store.apply_max_score(&key, 100, t2).await.unwrap();
        assert_eq!(update.stored.updated_at, t1);
        let t3 = t1 + Duration::seconds(10);
        let update = store.apply_max_score(&key, 101, t3).await.unwrap();
        assert_eq!(update.stored.updated_at, t3);
    }

    #[tokio::test]
    async fn concurrent_submissions_converge_on_the_maximum() {
        let store = Arc::new(MemoryStore::new());
        let key = score_key("p1");
        let mut handles = Vec::new();
        for score in [100, 250, 75, 999, 500] {
            let store = store.clone();
            let key = key.clone();
            handles.push(tokio::spawn(async move {
                store.apply_max_score(&key, score, Utc::now()).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        let scores = store
            .fetch_scores(&ScoreLookup {
                game_id: Some("arcade".to_string()),
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].score, 999);
    }

    #[tokio::test]
    async fn guard_claim_is_won_exactly_once_per_window() {
        let store = Arc::new(MemoryStore::new());
        let player = PlayerId("p1".to_string());
        let now = Utc::now();
        let threshold = now - Duration::milliseconds(5000);

        let mut handles = Vec::new();
        for _ in 0..30 {
            let store = store.clone();
            let player = player.clone();
            handles.push(tokio::spawn(async move {
                store.claim_activity(&player, now, threshold).await.unwrap()
            }));
        }
        let mut won = 0;
        for handle in handles {
            if handle.await.unwrap().won(threshold) {
                won += 1;
            }
        }
        assert_eq!(won, 1);
    }

    #[tokio::test]
    async fn stale_guard_can_be_claimed_again() {
        let store = MemoryStore::new();
        let player = PlayerId("p1".to_string());
        let first = Utc::now();
        let previous = store
            .claim_activity(&player, first, first - Duration::milliseconds(5000))
            .await
            .unwrap();
        assert_eq!(previous, GuardPrevious::Missing);

        // Inside the window the claim is lost.
        let second = first + Duration::milliseconds(100);
        let previous = store
            .claim_activity(&player, second, second - Duration::milliseconds(5000))
            .await
            .unwrap();
        assert!(!previous.won(second - Duration::milliseconds(5000)));

        // Past the window it is won again.
        let third = first + Duration::milliseconds(6000);
        let previous = store
            .claim_activity(&player, third, third - Duration::milliseconds(5000))
            .await
            .unwrap();
        assert!(previous.won(third - Duration::milliseconds(5000)));
    }

    #[tokio::test]
    async fn record_violation_increments_one_document_per_rule_and_player() {
        let store = MemoryStore::new();
        let rule_id = RuleId::new();
        let player = PlayerId("p1".to_string());

        let first = store
            .record_violation(&rule_id, &player, Severity::Medium, None, Utc::now())
            .await
            .unwrap();
        assert_eq!(first.count, 1);

        let second = store
            .record_violation(&rule_id, &player, Severity::Medium, None, Utc::now())
            .await
            .unwrap();
        assert_eq!(second.count, 2);
        assert_eq!(second.id, first.id);

        let listed = ViolationRepository::fetch_for_player(&store, &player).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn resolve_clears_until_the_next_trigger() {
        let store = MemoryStore::new();
        let rule_id = RuleId::new();
        let player = PlayerId("p1".to_string());
        let violation = store
            .record_violation(&rule_id, &player, Severity::High, None, Utc::now())
            .await
            .unwrap();

        assert!(store.resolve(&violation.id).await.unwrap());
        let listed = ViolationRepository::fetch_for_player(&store, &player).await.unwrap();
        assert!(listed[0].resolved);

        let again = store
            .record_violation(&rule_id, &player, Severity::High, None, Utc::now())
            .await
            .unwrap();
        assert!(!again.resolved);
        assert_eq!(again.count, 2);
    }

    #[tokio::test]
    async fn mark_evaluated_is_a_one_way_transition() {
        let store = MemoryStore::new();
        let event = TelemetryEvent::new(
            EventOwner::Player(PlayerId("p1".to_string())),
            "jump",
            None,
            Some(json!({"height": 3})),
        );
        store.insert_event(&event).await.unwrap();

        let flipped = store
            .mark_evaluated(&event.id, &[], &json!({"matched": []}))
            .await
            .unwrap();
        assert!(flipped);
        let flipped = store
            .mark_evaluated(&event.id, &[], &json!({"matched": []}))
            .await
            .unwrap();
        assert!(!flipped);

        let pending = store.fetch_unevaluated(10).await.unwrap();
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn unevaluated_batch_is_oldest_first() {
        let store = MemoryStore::new();
        let player = PlayerId("p1".to_string());
        let mut ids = Vec::new();
        for _ in 0..3 {
            let event =
                TelemetryEvent::new(EventOwner::Player(player.clone()), "jump", None, None);
            ids.push(event.id);
            store.insert_event(&event).await.unwrap();
        }
        let batch = store.fetch_unevaluated(2).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].id, ids[0]);
        assert_eq!(batch[1].id, ids[1]);
    }
}
