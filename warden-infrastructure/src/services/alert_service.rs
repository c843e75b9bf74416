// Webhook alerting for cheat-grade violations.
//
// Delivery happens on a spawned task; evaluation never waits on the webhook
// and a failed delivery only produces a warning.

use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use tracing::warn;

use warden_domain::ports::AlertService;
use warden_domain::{RuntimeConfig, Severity, Violation};

#[derive(Default)]
pub struct DefaultAlertService;

impl DefaultAlertService {
    pub fn new() -> Self {
        Self
    }
}

impl AlertService for DefaultAlertService {
    fn spawn_alerts(&self, config: RuntimeConfig, violations: Vec<Violation>) {
        let alerts = violations
            .into_iter()
            .filter(|violation| violation.severity == Severity::Cheat)
            .collect::<Vec<_>>();
        if alerts.is_empty() || config.alert_webhook_url.is_none() {
            return;
        }
        tokio::spawn(async move {
            if let Err(err) = send_alerts(&config, &alerts).await {
                warn!("alert webhook failed: {}", err);
            }
        });
    }
}

async fn send_alerts(config: &RuntimeConfig, alerts: &[Violation]) -> Result<()> {
    let url = config
        .alert_webhook_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("alert_webhook_url not configured"))?;
    let template = config
        .alert_webhook_template
        .as_deref()
        .unwrap_or(r#"{"message":"cheat violations: {total}\n{lines}"}"#);

    let payload = build_payload(alerts, template);
    let client = Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_seconds.max(3)))
        .build()?;

    let mut request = client
        .post(url)
        .header("Content-Type", "application/json")
        .body(payload);
    if let Some(token) = &config.alert_webhook_token {
        request = request.bearer_auth(token);
    }
    request.send().await?.error_for_status()?;
    Ok(())
}

fn build_payload(alerts: &[Violation], template: &str) -> String {
    let lines = alerts
        .iter()
        .map(|violation| {
            format!(
                "{} rule={} count={}",
                violation.player_id, violation.rule_id, violation.count
            )
        })
        .collect::<Vec<_>>()
        .join("\\n");
    template
        .replace("{total}", &alerts.len().to_string())
        .replace("{lines}", &lines)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use warden_domain::{PlayerId, RuleId};

    #[test]
    fn payload_template_substitution() {
        let violation = Violation::new(
            RuleId::new(),
            PlayerId("p1".to_string()),
            Severity::Cheat,
            None,
            Utc::now(),
        );
        let payload = build_payload(
            std::slice::from_ref(&violation),
            r#"{"total":"{total}","lines":"{lines}"}"#,
        );
        assert!(payload.contains(r#""total":"1""#));
        assert!(payload.contains("p1 rule="));
    }
}
