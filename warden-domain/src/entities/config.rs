// Runtime configuration passed into the application layer.
// Built by the infrastructure config loader; the domain only defines the shape.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub rules_path: String,
    pub poller_enabled: bool,
    pub poll_interval_seconds: u64,
    pub poll_batch_size: usize,
    pub activity_dedupe_ms: u64,
    pub alert_webhook_url: Option<String>,
    pub alert_webhook_template: Option<String>,
    pub alert_webhook_token: Option<String>,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}
