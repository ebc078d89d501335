//! LLM transport collaborator and process-wide usage accounting.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("empty or malformed response")]
    EmptyResponse,
}

/// Synchronous (from the caller's perspective) request/response to an
/// external LLM transport, bounded by a configured timeout. An
/// empty/malformed response fails loud — callers degrade to deterministic
/// fallbacks, never retry silently.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Append-only, process-wide counters of LLM usage, reset between problems
/// by the dataset runner.
#[derive(Debug, Default)]
pub struct UsageStats {
    prompt_tokens: AtomicU64,
    completion_tokens: AtomicU64,
    api_calls: AtomicU64,
    total_time_millis: AtomicU64,
}

/// A stable snapshot of [`UsageStats`] at a point in time.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct UsageSnapshot {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub api_calls: u64,
    pub total_time_s: f64,
}

impl UsageStats {
    pub fn record(&self, prompt_tokens: u64, completion_tokens: u64, elapsed: Duration) {
        self.prompt_tokens.fetch_add(prompt_tokens, Ordering::Relaxed);
        self.completion_tokens.fetch_add(completion_tokens, Ordering::Relaxed);
        self.api_calls.fetch_add(1, Ordering::Relaxed);
        self.total_time_millis.fetch_add(elapsed.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            prompt_tokens: self.prompt_tokens.load(Ordering::Relaxed),
            completion_tokens: self.completion_tokens.load(Ordering::Relaxed),
            api_calls: self.api_calls.load(Ordering::Relaxed),
            total_time_s: self.total_time_millis.load(Ordering::Relaxed) as f64 / 1000.0,
        }
    }

    pub fn reset(&self) {
        self.prompt_tokens.store(0, Ordering::Relaxed);
        self.completion_tokens.store(0, Ordering::Relaxed);
        self.api_calls.store(0, Ordering::Relaxed);
        self.total_time_millis.store(0, Ordering::Relaxed);
    }
}

/// Rough token estimate (whitespace-split word count) used when the
/// transport doesn't report usage directly.
fn estimate_tokens(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

/// Production client: a JSON completion endpoint reached over `reqwest`,
/// bounded by an ~100s request timeout per spec.
pub struct HttpLlmClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    usage: std::sync::Arc<UsageStats>,
}

impl HttpLlmClient {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        usage: std::sync::Arc<UsageStats>,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(100))
            .build()
            .expect("reqwest client builds with static config");
        Self {
            http,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
            usage,
        }
    }

    /// Builds a client from `API_KEY`/`BASE_URL`/`MODEL`/`TIMEOUT` environment
    /// variables. `API_KEY` is mandatory — its absence is a fatal
    /// configuration error, not a degrade-to-fallback condition, since no
    /// agent can make progress without a transport.
    pub fn from_env(usage: std::sync::Arc<UsageStats>) -> anyhow::Result<Self> {
        let api_key = std::env::var("API_KEY").map_err(|_| anyhow::anyhow!("API_KEY environment variable is required"))?;
        let endpoint = std::env::var("BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string());
        let model = std::env::var("MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let timeout_secs: u64 = std::env::var("TIMEOUT").ok().and_then(|v| v.parse().ok()).unwrap_or(100);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(LlmError::Transport)?;

        Ok(Self {
            http,
            endpoint,
            model,
            api_key,
            usage,
        })
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let start = std::time::Instant::now();
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(LlmError::Transport)?;

        let payload: serde_json::Value = response.json().await.map_err(LlmError::Transport)?;
        let text = payload
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or(LlmError::EmptyResponse)?;

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        self.usage.record(estimate_tokens(prompt), estimate_tokens(text), start.elapsed());
        Ok(text.to_string())
    }
}

#[cfg(test)]
/// A deterministic stub for agent tests: returns a fixed response, or
/// simulates an empty/malformed response.
pub struct StubLlmClient {
    pub response: Option<String>,
}

#[cfg(test)]
impl StubLlmClient {
    pub fn responding(text: impl Into<String>) -> Self {
        Self {
            response: Some(text.into()),
        }
    }

    pub fn empty() -> Self {
        Self { response: None }
    }
}

#[cfg(test)]
#[async_trait]
impl LlmClient for StubLlmClient {
    async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        match &self.response {
            Some(text) => Ok(text.clone()),
            None => Err(LlmError::EmptyResponse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_stats_accumulate_and_reset() {
        let stats = UsageStats::default();
        stats.record(10, 20, Duration::from_millis(500));
        stats.record(5, 5, Duration::from_millis(500));
        let snap = stats.snapshot();
        assert_eq!(snap.prompt_tokens, 15);
        assert_eq!(snap.completion_tokens, 25);
        assert_eq!(snap.api_calls, 2);
        assert!((snap.total_time_s - 1.0).abs() < 1e-9);

        stats.reset();
        assert_eq!(stats.snapshot().api_calls, 0);
    }
}
