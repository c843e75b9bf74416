// Player score entity
// Per-(player, game, scope, localId) maximum-score record. `score` only ever
// increases; `updated_at` advances only when the score actually increased.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{PlayerId, ScoreScope};

/// Ledger key. One score document exists per distinct key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreKey {
    pub player: PlayerId,
    pub game_id: String,
    pub scope: ScoreScope,
    pub local_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerScore {
    pub player: PlayerId,
    pub game_id: String,
    pub scope: ScoreScope,
    pub local_id: Option<String>,
    pub score: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlayerScore {
    pub fn key(&self) -> ScoreKey {
        ScoreKey {
            player: self.player.clone(),
            game_id: self.game_id.clone(),
            scope: self.scope,
            local_id: self.local_id.clone(),
        }
    }
}

/// Result of the atomic max-merge upsert: the post-image plus the pre-image
/// score (None when the document was created by this call).
#[derive(Debug, Clone)]
pub struct ScoreUpdate {
    pub stored: PlayerScore,
    pub previous: Option<i64>,
}
