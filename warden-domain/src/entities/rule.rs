// Detection rule entity
// Two evaluation modes coexist: count-mode (same-type event frequency within
// a window) and range-mode (a named numeric payload attribute out of bounds).
// Rules are immutable during evaluation; only administrators mutate them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{RuleId, Severity};

/// Expected bounds for one payload attribute. `max` marks the top of the
/// normal range; `threshold` is the hard limit past which the finding
/// escalates from an alert to a cheat violation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: RuleId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Payload attribute key inspected by range-mode checks.
    pub action: String,
    pub threshold: u32,
    pub window_seconds: u32,
    #[serde(default)]
    pub normals: HashMap<String, NormalRange>,
    #[serde(default)]
    pub severity: Severity,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rule {
    pub fn normal_for_action(&self) -> Option<&NormalRange> {
        self.normals.get(&self.action)
    }
}

/// Admin-facing shape for creating or replacing a rule.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDraft {
    pub name: String,
    #[serde(default)]
    pub game_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub action: String,
    #[serde(default = "default_threshold")]
    pub threshold: u32,
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u32,
    #[serde(default)]
    pub normals: HashMap<String, NormalRange>,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_threshold() -> u32 {
    1
}

fn default_window_seconds() -> u32 {
    60
}

fn default_active() -> bool {
    true
}

impl RuleDraft {
    pub fn into_rule(self) -> Rule {
        let now = Utc::now();
        Rule {
            id: RuleId::new(),
            name: self.name,
            game_id: self.game_id,
            description: self.description,
            action: self.action,
            threshold: self.threshold,
            window_seconds: self.window_seconds,
            normals: self.normals,
            severity: self.severity,
            active: self.active,
            created_at: now,
            updated_at: now,
        }
    }
}
