use super::circuit_breaker::{Admission, CircuitBreaker, CircuitBreakerConfig};
use super::retry::{RetryPolicy, with_retry};
use crate::core::RateError;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

/// JSON-over-HTTP client for a single upstream base URL.
///
/// Each `fetch` retries transport and status failures with backoff, and the
/// whole retried call counts as one success or failure for the breaker.
pub struct UpstreamClient {
    base_url: String,
    client: reqwest::Client,
    retry: RetryPolicy,
    breaker: CircuitBreaker,
}

impl UpstreamClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        retry: RetryPolicy,
        breaker: CircuitBreakerConfig,
    ) -> Result<Self, RateError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("xrates/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retry,
            breaker: CircuitBreaker::new(breaker),
        })
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// GETs `{base_url}/{path}` and decodes the JSON body into `T`.
    #[instrument(name = "UpstreamFetch", skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, RateError> {
        let admission = self.breaker.admit();
        if admission.is_rejected() {
            return Err(RateError::Upstream {
                status: None,
                message: format!("Circuit open for {}", self.base_url),
            });
        }
        let mut probe = ProbeGuard {
            breaker: &self.breaker,
            armed: admission == Admission::Probe,
        };

        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let body = match with_retry(|| self.attempt(&url), &self.retry).await {
            Ok(body) => {
                probe.armed = false;
                self.breaker.record_success();
                body
            }
            Err(err) => {
                if err.is_retryable() {
                    probe.armed = false;
                    self.breaker.record_failure();
                }
                return Err(err);
            }
        };

        if body.trim().is_empty() {
            return Err(RateError::decode(format!("Received empty response from {url}")));
        }
        serde_json::from_str(&body)
            .map_err(|e| RateError::decode(format!("Failed to parse response from {url}: {e}")))
    }

    async fn attempt(&self, url: &str) -> Result<String, RateError> {
        debug!("Requesting {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RateError::Transport(format!("Request error: {e} for URL: {url}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RateError::Upstream {
                status: Some(status.as_u16()),
                message: format!("HTTP error: {status} for URL: {url}"),
            });
        }

        response
            .text()
            .await
            .map_err(|e| RateError::Transport(format!("Failed to read response from {url}: {e}")))
    }
}

/// Returns an unreported half-open probe slot, e.g. when `fetch` is dropped
/// mid-flight.
struct ProbeGuard<'a> {
    breaker: &'a CircuitBreaker,
    armed: bool,
}

impl Drop for ProbeGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.breaker.release_probe();
        }
    }
}
