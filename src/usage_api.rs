use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

use crate::models::UsageQuota;

pub const USAGE_ENDPOINT: &str = "https://api.anthropic.com/api/oauth/usage";
const ANTHROPIC_BETA: &str = "oauth-2025-04-20";
const DEFAULT_USER_AGENT: &str = "claude-code/2.0.32";
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

static USER_AGENT: Lazy<String> = Lazy::new(resolve_user_agent);

fn resolve_user_agent() -> String {
    env::var("CLAUDE_STATUSLINE_USER_AGENT")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
}

pub trait UsageFetcher {
    /// One attempt; `None` on any transport or parse failure.
    fn fetch(&self, token: &str) -> Option<UsageQuota>;
}

/// GET against the OAuth usage endpoint.
#[derive(Debug, Clone)]
pub struct HttpUsageFetcher {
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for HttpUsageFetcher {
    fn default() -> Self {
        Self {
            endpoint: USAGE_ENDPOINT.to_string(),
            timeout: FETCH_TIMEOUT,
        }
    }
}

impl UsageFetcher for HttpUsageFetcher {
    fn fetch(&self, token: &str) -> Option<UsageQuota> {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .http_status_as_error(false)
            .build()
            .into();

        let mut response = match agent
            .get(self.endpoint.as_str())
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header("User-Agent", USER_AGENT.as_str())
            .header("Authorization", format!("Bearer {token}"))
            .header("anthropic-beta", ANTHROPIC_BETA)
            .call()
        {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(error = %err, "usage request failed");
                return None;
            }
        };

        let status = response.status();
        let body = match response.body_mut().read_to_string() {
            Ok(body) => body,
            Err(err) => {
                tracing::debug!(%status, error = %err, "usage response body unreadable");
                return None;
            }
        };
        tracing::debug!(%status, bytes = body.len(), "usage response received");
        parse_usage_body(&body)
    }
}

/// Any JSON object counts as a usage payload, whatever the HTTP status.
/// Arrays and scalars are rejected before field mapping.
pub fn parse_usage_body(body: &str) -> Option<UsageQuota> {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(error = %err, "usage response is not JSON");
            return None;
        }
    };
    if !value.is_object() {
        tracing::debug!("usage response is not a JSON object");
        return None;
    }
    match serde_json::from_value::<UsageQuota>(value) {
        Ok(quota) => Some(quota),
        Err(err) => {
            tracing::debug!(error = %err, "usage response is not a usage object");
            None
        }
    }
}
