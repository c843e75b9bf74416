use crate::entities::{RuntimeConfig, Violation};

/// Outbound alerting for cheat-grade violations. Implementations deliver in
/// the background; evaluation never waits on a webhook.
pub trait AlertService: Send + Sync {
    fn spawn_alerts(&self, config: RuntimeConfig, violations: Vec<Violation>);
}
