use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use warden_domain::RuntimeConfig;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
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

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3210".to_string(),
            api_token: None,
            rules_path: "./rules.yaml".to_string(),
            poller_enabled: true,
            poll_interval_seconds: 30,
            poll_batch_size: 100,
            activity_dedupe_ms: 5000,
            alert_webhook_url: None,
            alert_webhook_template: None,
            alert_webhook_token: None,
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 15,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("WARDEN_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        let file_path = Path::new(&path);
        let base_dir = file_path.parent();
        if !file_path.exists() {
            warn!("config.toml not found, using defaults");
            let mut config = AppConfig::default();
            config.apply_env_overrides();
            config.resolve_paths(base_dir);
            config.normalize();
            config.validate()?;
            return Ok(config);
        }
        let content = fs::read_to_string(file_path).await?;
        let mut config: AppConfig = toml::from_str(&content)?;
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        if let Some(api_token) = &self.api_token {
            if api_token.trim().is_empty() {
                self.api_token = None;
            }
        }
        if let Some(url) = &self.alert_webhook_url {
            if url.trim().is_empty() {
                self.alert_webhook_url = None;
            }
        }
        if let Some(template) = &self.alert_webhook_template {
            if template.trim().is_empty() {
                self.alert_webhook_template = None;
            }
        }
        if let Some(token) = &self.alert_webhook_token {
            if token.trim().is_empty() {
                self.alert_webhook_token = None;
            }
        }
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.rules_path = resolve_path(base, &self.rules_path);
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.poll_interval_seconds == 0 {
            return Err(anyhow!("poll_interval_seconds must be greater than 0"));
        }
        if self.poll_batch_size == 0 {
            return Err(anyhow!("poll_batch_size must be greater than 0"));
        }
        if self.activity_dedupe_ms == 0 {
            return Err(anyhow!("activity_dedupe_ms must be greater than 0"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            api_token: self.api_token.clone(),
            rules_path: self.rules_path.clone(),
            poller_enabled: self.poller_enabled,
            poll_interval_seconds: self.poll_interval_seconds,
            poll_batch_size: self.poll_batch_size,
            activity_dedupe_ms: self.activity_dedupe_ms,
            alert_webhook_url: self.alert_webhook_url.clone(),
            alert_webhook_template: self.alert_webhook_template.clone(),
            alert_webhook_token: self.alert_webhook_token.clone(),
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("WARDEN_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("WARDEN_API_TOKEN") {
            self.api_token = Some(value);
        }
        if let Ok(value) = env::var("WARDEN_RULES_PATH") {
            self.rules_path = value;
        }
        if let Ok(value) = env::var("WARDEN_POLLER_ENABLED") {
            self.poller_enabled = value.parse().unwrap_or(self.poller_enabled);
        }
        if let Ok(value) = env::var("WARDEN_POLL_INTERVAL_SECONDS") {
            self.poll_interval_seconds = value.parse().unwrap_or(self.poll_interval_seconds);
        }
        if let Ok(value) = env::var("WARDEN_POLL_BATCH_SIZE") {
            self.poll_batch_size = value.parse().unwrap_or(self.poll_batch_size);
        }
        if let Ok(value) = env::var("WARDEN_ACTIVITY_DEDUPE_MS") {
            self.activity_dedupe_ms = value.parse().unwrap_or(self.activity_dedupe_ms);
        }
        if let Ok(value) = env::var("WARDEN_ALERT_WEBHOOK_URL") {
            self.alert_webhook_url = Some(value);
        }
        if let Ok(value) = env::var("WARDEN_ALERT_WEBHOOK_TEMPLATE") {
            self.alert_webhook_template = Some(value);
        }
        if let Ok(value) = env::var("WARDEN_ALERT_WEBHOOK_TOKEN") {
            self.alert_webhook_token = Some(value);
        }
        if let Ok(value) = env::var("WARDEN_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("WARDEN_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
    }
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}
