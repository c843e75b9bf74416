use std::sync::Arc;

use anyhow::Result;

use warden_application::{AppState, Metrics};
use warden_domain::RuleRepository;
use warden_infrastructure::{seed_rules, AppConfig, DefaultAlertService, MemoryStore};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        let runtime_config = config.to_runtime_config();

        let store = Arc::new(MemoryStore::new());
        let rule_repo: Arc<dyn RuleRepository> = store.clone();
        seed_rules(&rule_repo, &runtime_config.rules_path).await?;

        let state = AppState {
            config: runtime_config,
            event_repo: store.clone(),
            rule_repo,
            violation_repo: store.clone(),
            score_repo: store.clone(),
            guard_repo: store.clone(),
            activity_repo: store,
            alert_service: Arc::new(DefaultAlertService::new()),
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}
