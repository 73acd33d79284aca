// ============================================================================
// Upstream Summarization Configuration
// ============================================================================

use anyhow::{Context, Result};
use std::time::Duration;

use crate::aggregator::Provider;

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_SYSTEM_PROMPT: &str = "You are an excellent teacher.";
const DEFAULT_TASK_PROMPT: &str = "Please summarize the following text.";

/// Where summary requests go and how they are framed
#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    /// Full URL of the summarization endpoint (e.g. "http://backend:8080/api/summary")
    pub summary_url: String,
    /// Per-request timeout; a request exceeding it counts as failed
    pub timeout: Duration,
    /// System-role persona message sent first in every request
    pub system_prompt: String,
    /// User-role task framing sent before the content
    pub task_prompt: String,
    /// Providers and models offered for selection
    pub providers: Vec<Provider>,
}

impl UpstreamConfig {
    pub(crate) fn from_env() -> Result<Self> {
        let summary_url =
            std::env::var("SUMMARY_API_URL").context("SUMMARY_API_URL must be set")?;

        let providers = match std::env::var("PROVIDERS") {
            Ok(raw) if !raw.trim().is_empty() => parse_providers(&raw)?,
            _ => Vec::new(),
        };

        Ok(Self {
            summary_url,
            timeout: Duration::from_secs(
                std::env::var("SUMMARY_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|secs: &u64| *secs > 0)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            system_prompt: std::env::var("SUMMARY_SYSTEM_PROMPT")
                .unwrap_or_else(|_| DEFAULT_SYSTEM_PROMPT.to_string()),
            task_prompt: std::env::var("SUMMARY_TASK_PROMPT")
                .unwrap_or_else(|_| DEFAULT_TASK_PROMPT.to_string()),
            providers,
        })
    }

    /// Config pointing at `summary_url` with default prompts and no catalog
    pub fn new(summary_url: impl Into<String>) -> Self {
        Self {
            summary_url: summary_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            task_prompt: DEFAULT_TASK_PROMPT.to_string(),
            providers: Vec::new(),
        }
    }
}

/// Parses the `PROVIDERS` catalog: `[{"name": "openai", "models": ["gpt-4"]}, ...]`
fn parse_providers(raw: &str) -> Result<Vec<Provider>> {
    serde_json::from_str(raw).context("PROVIDERS must be a JSON array of {name, models}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_providers() {
        let providers = parse_providers(
            r#"[{"name":"openai","models":["gpt-4","gpt-4o"]},{"name":"claude","models":["claude-3"]}]"#,
        )
        .unwrap();

        assert_eq!(providers.len(), 2);
        assert_eq!(providers[0].name, "openai");
        assert_eq!(providers[0].models, vec!["gpt-4", "gpt-4o"]);
        assert_eq!(providers[1].models, vec!["claude-3"]);
    }

    #[test]
    fn test_parse_providers_rejects_garbage() {
        assert!(parse_providers("{not json").is_err());
        assert!(parse_providers(r#"{"name":"openai"}"#).is_err());
    }

    #[test]
    fn test_new_uses_defaults() {
        let config = UpstreamConfig::new("http://localhost:1/api/summary");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(config.task_prompt, DEFAULT_TASK_PROMPT);
    }
}
