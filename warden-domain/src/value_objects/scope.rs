// Leaderboard scope value object

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreScope {
    Local,
    Global,
    Friends,
}

impl ScoreScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreScope::Local => "local",
            ScoreScope::Global => "global",
            ScoreScope::Friends => "friends",
        }
    }
}

impl Default for ScoreScope {
    fn default() -> Self {
        ScoreScope::Global
    }
}
