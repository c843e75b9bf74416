// Severity value object

use serde::{Deserialize, Serialize};

/// Severity of a recorded violation. `Cheat` is reserved for range-mode
/// escalations where an attribute exceeds the hard threshold, not just the
/// normal range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Cheat,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Cheat => "cheat",
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Medium
    }
}

impl From<&str> for Severity {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "low" => Severity::Low,
            "high" => Severity::High,
            "cheat" => Severity::Cheat,
            _ => Severity::Medium,
        }
    }
}
