//! Shared HTTP client for collectors
//!
//! 1. User-Agent header and gzip
//! 2. Per-request timeout
//! 3. Exponential backoff with jitter on retryable failures (timeouts,
//!    HTTP 429, 5xx). Other 4xx responses fail immediately.
//!
//! Query strings are never logged since they may carry API keys.

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{
    BASE_RETRY_MS, MAX_RETRY_MS, RETRY_JITTER_PERCENT, USER_AGENT as USER_AGENT_CONST,
};

#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_retries: u32,
    /// Collector name for logging
    source: &'static str,
}

impl HttpFetcher {
    pub fn new(source: &'static str, timeout: Duration, max_retries: u32) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_retries: max_retries.max(1),
            source,
        })
    }

    /// GET `url` with query parameters and optional bearer token, decoding JSON
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        bearer: Option<&str>,
    ) -> AppResult<T> {
        let mut last_error = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                debug!(
                    source = self.source,
                    "⏳ Retry {}/{} after {}ms",
                    attempt + 1,
                    self.max_retries,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            match self.execute::<T>(url, query, bearer).await {
                Ok(value) => return Ok(value),
                Err(e) if e.code.is_retryable() => {
                    warn!(
                        source = self.source,
                        url = %url,
                        error = %e,
                        "⚠️ Collector request failed (attempt {}/{})",
                        attempt + 1,
                        self.max_retries
                    );
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            AppError::internal(format!("{}: no attempts made", self.source))
        }))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        bearer: Option<&str>,
    ) -> AppResult<T> {
        let mut request = self.client.get(url).query(query);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.as_u16() == 429 || status.is_server_error() {
            return Err(AppError::collector_http(status.as_u16(), url));
        }
        if !status.is_success() {
            return Err(AppError::collector_rejected(status.as_u16(), url));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice::<T>(&body)?)
    }
}

/// `BASE * 2^(attempt-1)` capped, with +/- jitter
fn backoff_delay(attempt: u32) -> Duration {
    let base = BASE_RETRY_MS.saturating_mul(2_u64.saturating_pow(attempt.saturating_sub(1)));
    let capped = base.min(MAX_RETRY_MS);
    let jitter_range = (capped * RETRY_JITTER_PERCENT / 100) as i64;
    let jitter: i64 = rand::thread_rng().gen_range(-jitter_range..=jitter_range);
    Duration::from_millis((capped as i64 + jitter).max(50) as u64)
}
