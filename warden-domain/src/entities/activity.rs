// Player activity entities
// PlayerActivity is an append-only notification log. ActivityGuard is a pure
// concurrency-control record: a single per-player timestamp that racing
// writers compare-and-set to decide who may emit a notification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value_objects::{EventId, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Alert,
    Info,
    Violation,
    HighScore,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Alert => "alert",
            ActivityKind::Info => "info",
            ActivityKind::Violation => "violation",
            ActivityKind::HighScore => "high_score",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerActivity {
    pub id: Uuid,
    pub player: PlayerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_ref: Option<EventId>,
    pub kind: ActivityKind,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl PlayerActivity {
    pub fn new(
        player: PlayerId,
        event_ref: Option<EventId>,
        kind: ActivityKind,
        details: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            player,
            event_ref,
            kind,
            details,
            created_at: Utc::now(),
        }
    }

    pub fn high_score(
        player: PlayerId,
        previous: Option<i64>,
        new_score: i64,
        game_id: &str,
    ) -> Self {
        Self::new(
            player,
            None,
            ActivityKind::HighScore,
            serde_json::json!({
                "prev": previous,
                "newScore": new_score,
                "gameId": game_id,
            }),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityGuard {
    pub player: PlayerId,
    pub last_activity_at: Option<DateTime<Utc>>,
}

/// Pre-image of the guard document as seen by the atomic conditional set.
/// The caller decides whether it won the claim from this value alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardPrevious {
    /// No guard document existed; the claim created one.
    Missing,
    /// A document existed with no recorded activity time.
    Unset,
    /// A document existed with this activity time.
    At(DateTime<Utc>),
}

impl GuardPrevious {
    /// A claim is won iff there was no usable prior timestamp, or the prior
    /// timestamp fell outside the dedupe window.
    pub fn won(&self, threshold: DateTime<Utc>) -> bool {
        match self {
            GuardPrevious::Missing | GuardPrevious::Unset => true,
            GuardPrevious::At(t) => *t < threshold,
        }
    }
}
