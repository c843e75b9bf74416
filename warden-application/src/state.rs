use std::sync::Arc;

use warden_domain::ports::{
    ActivityGuardRepository, ActivityRepository, AlertService, EventRepository, RuleRepository,
    ScoreRepository, ViolationRepository,
};
use warden_domain::RuntimeConfig;

use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub event_repo: Arc<dyn EventRepository>,
    pub rule_repo: Arc<dyn RuleRepository>,
    pub violation_repo: Arc<dyn ViolationRepository>,
    pub score_repo: Arc<dyn ScoreRepository>,
    pub guard_repo: Arc<dyn ActivityGuardRepository>,
    pub activity_repo: Arc<dyn ActivityRepository>,
    pub alert_service: Arc<dyn AlertService>,
    pub metrics: Arc<Metrics>,
}
