// Violation entity
// Accumulating record that a player has triggered a rule. One record per
// (rule, player); `count` only grows and `last_violation_at` never moves
// backward. Lifecycle ends when an operator resolves it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{PlayerId, RuleId, Severity, ViolationId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub id: ViolationId,
    pub rule_id: RuleId,
    pub player_id: PlayerId,
    pub severity: Severity,
    pub count: u64,
    pub first_violation_at: DateTime<Utc>,
    pub last_violation_at: DateTime<Utc>,
    pub resolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<serde_json::Value>,
}

impl Violation {
    pub fn new(
        rule_id: RuleId,
        player_id: PlayerId,
        severity: Severity,
        evidence: Option<serde_json::Value>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ViolationId::new(),
            rule_id,
            player_id,
            severity,
            count: 1,
            first_violation_at: at,
            last_violation_at: at,
            resolved: false,
            evidence,
        }
    }
}
