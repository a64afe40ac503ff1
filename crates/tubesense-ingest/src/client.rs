//! Remote API client: the only place that issues network requests.
//!
//! Each call is retried with exponential backoff on connection failures,
//! timeouts, and 429/500/502/503/504. Everything else is returned at once.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{RemoteError, RemoteErrorKind};
use crate::transport::{Transport, TransportError};

pub const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Bounded retry with doubling backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Sleep before the first retry; doubled for each later one.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Sleep before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_backoff.saturating_mul(factor)
    }
}

/// Client for the video platform's JSON API.
pub struct RemoteClient<T> {
    transport: T,
    base_url: String,
    retry: RetryPolicy,
}

impl<T: Transport> RemoteClient<T> {
    /// Create a client for the public API with the default retry policy.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            base_url: YOUTUBE_API_BASE.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Point the client at another base URL (no trailing slash needed).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// GET `{base_url}/{endpoint}` and return the parsed JSON object.
    ///
    /// `params` must already contain the API key; it is never logged.
    pub async fn fetch(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value, RemoteError> {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        let max_attempts = self.retry.max_attempts.max(1);

        let mut attempt = 1;
        loop {
            match self.attempt(&url, params).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retriable() && attempt < max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        endpoint,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying remote call"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn attempt(&self, url: &str, params: &[(&str, String)]) -> Result<Value, RemoteError> {
        let resp = self.transport.get(url, params).await.map_err(|e| match e {
            TransportError::Timeout => RemoteError::new(RemoteErrorKind::Timeout, e.to_string()),
            TransportError::Connect(msg) => RemoteError::new(RemoteErrorKind::Connection, msg),
            TransportError::Other(msg) => RemoteError::new(RemoteErrorKind::Transport, msg),
        })?;

        if !(200..300).contains(&resp.status) {
            return Err(error_from_body(resp.status, &resp.body));
        }

        debug!(url, status = resp.status, bytes = resp.body.len(), "remote call succeeded");
        let value: Value = serde_json::from_str(&resp.body)
            .map_err(|e| RemoteError::new(RemoteErrorKind::Malformed, format!("invalid JSON: {e}")))?;
        if !value.is_object() {
            return Err(RemoteError::new(
                RemoteErrorKind::Malformed,
                "response is not a JSON object",
            ));
        }
        Ok(value)
    }
}

/// Build a status error from the API's `{"error": {...}}` envelope when present.
fn error_from_body(status: u16, body: &str) -> RemoteError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().and_then(|v| v.get("error"));

    let message = error
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.chars().take(200).collect());
    let reason = error
        .and_then(|e| e.get("errors"))
        .and_then(Value::as_array)
        .and_then(|errs| errs.first())
        .and_then(|e| e.get("reason"))
        .and_then(Value::as_str)
        .map(str::to_string);

    RemoteError::http_status(status, reason, message)
}
