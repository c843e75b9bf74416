use std::io::Read;

use anyhow::Result;
use axum::http::HeaderMap;
use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;

use warden_domain::RuntimeConfig;

/// With an api_token configured every call must carry it as a bearer token;
/// without one the service is open (development mode).
pub fn authorize(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    if let Some(api_token) = &config.api_token {
        return extract_bearer(headers)
            .map(|v| v == *api_token)
            .unwrap_or(false);
    }
    true
}

/// Parse a JSON request body, transparently inflating gzip payloads.
pub fn parse_json_body<T: DeserializeOwned>(headers: &HeaderMap, body: &[u8]) -> Result<T> {
    let content = maybe_gunzip(headers, body)?;
    Ok(serde_json::from_str(&content)?)
}

fn maybe_gunzip(headers: &HeaderMap, body: &[u8]) -> Result<String> {
    if let Some(encoding) = headers.get("Content-Encoding") {
        if encoding.to_str().unwrap_or("") == "gzip" {
            let mut decoder = GzDecoder::new(body);
            let mut out = String::new();
            decoder.read_to_string(&mut out)?;
            return Ok(out);
        }
    }
    Ok(String::from_utf8(body.to_vec())?)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?.trim();
    let prefix = "Bearer ";
    if !value.starts_with(prefix) {
        return None;
    }
    let token = value[prefix.len()..].trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn config_with_token(token: Option<&str>) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            api_token: token.map(str::to_string),
            rules_path: "./rules.yaml".to_string(),
            poller_enabled: false,
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

    #[test]
    fn open_without_configured_token() {
        let headers = HeaderMap::new();
        assert!(authorize(&config_with_token(None), &headers));
    }

    #[test]
    fn bearer_token_must_match() {
        let config = config_with_token(Some("secret"));
        let mut headers = HeaderMap::new();
        assert!(!authorize(&config, &headers));

        headers.insert("Authorization", HeaderValue::from_static("Bearer wrong"));
        assert!(!authorize(&config, &headers));

        headers.insert("Authorization", HeaderValue::from_static("Bearer secret"));
        assert!(authorize(&config, &headers));
    }
}
