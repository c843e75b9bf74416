// Telemetry event entity
// One recorded gameplay telemetry record awaiting or having undergone rule
// evaluation. `evaluated` is a one-way transition flipped only by the
// evaluator; it is never reverted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{EventId, PlayerId, RuleId, SessionId};

/// Who an event belongs to. Exactly one of the two identities exists,
/// enforced structurally instead of by a pair of optional fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOwner {
    Player(PlayerId),
    Session(SessionId),
}

impl EventOwner {
    pub fn player(&self) -> Option<&PlayerId> {
        match self {
            EventOwner::Player(player) => Some(player),
            EventOwner::Session(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
    pub id: EventId,
    pub owner: EventOwner,
    pub event_type: String,
    pub game_id: Option<String>,
    pub payload: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub evaluated: bool,
    pub matched_rule_ids: Vec<RuleId>,
    pub evaluation_result: Option<serde_json::Value>,
}

impl TelemetryEvent {
    pub fn new(
        owner: EventOwner,
        event_type: impl Into<String>,
        game_id: Option<String>,
        payload: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: EventId::new(),
            owner,
            event_type: event_type.into(),
            game_id,
            payload,
            created_at: Utc::now(),
            evaluated: false,
            matched_rule_ids: Vec::new(),
            evaluation_result: None,
        }
    }

    pub fn player_id(&self) -> Option<&PlayerId> {
        self.owner.player()
    }
}

/// Event type that triggers the synchronous range-mode fast path at ingest.
pub const SNAPSHOT_EVENT_TYPE: &str = "snapshot";
