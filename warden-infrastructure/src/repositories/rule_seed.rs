// Rule seed file.
//
// Detection rules live in the store and are mutated over the admin API, but a
// deployment usually ships a baseline set. The seed file is YAML, read once
// at startup; a missing file is not an error.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use serde::Deserialize;
use tokio::fs;
use tracing::{info, warn};

use warden_domain::{NormalRange, Rule, RuleId, RuleRepository, Severity};

#[derive(Debug, Deserialize)]
pub struct RuleSeed {
    pub name: String,
    #[serde(default)]
    pub game_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub action: String,
    #[serde(default)]
    pub threshold: Option<u32>,
    #[serde(default)]
    pub window_seconds: Option<u32>,
    #[serde(default)]
    pub normals: HashMap<String, NormalRange>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl RuleSeed {
    fn into_rule(self) -> Rule {
        let now = chrono::Utc::now();
        Rule {
            id: RuleId::new(),
            name: self.name,
            game_id: self.game_id,
            description: self.description,
            action: self.action,
            threshold: self.threshold.unwrap_or(1),
            window_seconds: self.window_seconds.unwrap_or(60),
            normals: self.normals,
            severity: self.severity.unwrap_or_default(),
            active: self.active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }
}

pub async fn load_rule_seeds(path: &str) -> Result<Vec<Rule>> {
    if !Path::new(path).exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path).await?;
    let seeds: Vec<RuleSeed> = serde_yaml::from_str(&content)?;
    Ok(seeds.into_iter().map(RuleSeed::into_rule).collect())
}

pub async fn seed_rules(repo: &Arc<dyn RuleRepository>, path: &str) -> Result<usize> {
    let rules = match load_rule_seeds(path).await {
        Ok(rules) => rules,
        Err(err) => {
            warn!("failed to load rule seed file {}: {}", path, err);
            return Ok(0);
        }
    };
    for rule in &rules {
        repo.insert_rule(rule).await?;
    }
    if !rules.is_empty() {
        info!("seeded {} rules from {}", rules.len(), path);
    }
    Ok(rules.len())
}
