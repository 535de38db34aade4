//! Rate-limit-aware metadata fetch client.
//!
//! One client instance serializes all upstream access for a sync run. It
//! tracks remaining quota from response headers, waits out hard rate-limit
//! windows, retries transient failures with exponential backoff, and paces
//! itself adaptively as the quota drains so it slows down *before* hitting
//! the hard wall.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use chrono::Utc;

use crate::http::{HttpRequest, HttpResponse, HttpTransport};

use super::error::{FetchError, Result};
use super::types::{ContentsEnvelope, LanguageHistogram, RateLimitInfo, RawRepo};

/// Default inter-request delay.
pub const DEFAULT_BASE_DELAY_MS: u64 = 200;

/// Remaining-quota level below which pacing scales up.
pub const DEFAULT_LOW_WATER: u32 = 100;

/// Attempts for transient failures (initial call plus retries).
pub const MAX_FETCH_ATTEMPTS: usize = 3;

/// Explicit client configuration. No ambient/global state: the token and
/// delay constants are passed in by the caller.
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// Personal access token. Unauthenticated requests work but get a far
    /// smaller quota.
    pub token: Option<String>,
    /// API base URL, e.g. `https://api.github.com`.
    pub api_base: String,
    /// Base inter-request delay applied after each successful response.
    pub base_delay: Duration,
    /// Remaining-quota threshold below which the delay scales up
    /// proportionally to `low_water / remaining`.
    pub low_water: u32,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: "https://api.github.com".to_string(),
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            low_water: DEFAULT_LOW_WATER,
        }
    }
}

/// Metadata fetch client.
pub struct GithubClient {
    transport: Arc<dyn HttpTransport>,
    config: GithubConfig,
    quota: Mutex<Option<RateLimitInfo>>,
}

impl GithubClient {
    pub fn new(transport: Arc<dyn HttpTransport>, config: GithubConfig) -> Self {
        Self {
            transport,
            config,
            quota: Mutex::new(None),
        }
    }

    /// Last quota state observed from response headers, if any.
    #[must_use]
    pub fn quota(&self) -> Option<RateLimitInfo> {
        *self.quota.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Fetch a JSON resource by path (e.g. `/repos/{owner}/{repo}`).
    ///
    /// - 200: parsed payload, followed by the adaptive pacing delay.
    /// - 404: [`FetchError::NotFound`]. Not charged against quota and not
    ///   retried; callers decide whether absence is an error.
    /// - 403 with zero remaining quota: sleeps until one second past the
    ///   reset epoch, then retries the same request. This does not consume
    ///   the transient-retry budget.
    /// - other statuses / transport errors: retried up to
    ///   [`MAX_FETCH_ATTEMPTS`] with a 1s/2s backoff ladder, then surfaced.
    pub async fn fetch(&self, path: &str) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.config.api_base, path);

        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_secs(1))
            .with_factor(2.0)
            .with_max_times(MAX_FETCH_ATTEMPTS - 1);

        (|| self.fetch_once(&url))
            .retry(backoff)
            .when(FetchError::is_transient)
            .notify(|err, dur| {
                tracing::debug!(error = %err, delay_ms = dur.as_millis() as u64, "transient fetch failure, backing off");
            })
            .await
    }

    /// One request/response exchange, including the hard rate-limit wait.
    async fn fetch_once(&self, url: &str) -> Result<serde_json::Value> {
        loop {
            let request = HttpRequest {
                url: url.to_string(),
                headers: self.request_headers(),
            };

            let response = self
                .transport
                .get(request)
                .await
                .map_err(|e| FetchError::transport(e.to_string()))?;

            self.record_quota(&response);

            match response.status {
                200 => {
                    self.pace().await;
                    return serde_json::from_slice(&response.body)
                        .map_err(|e| FetchError::decode(e.to_string()));
                }
                // Absence of optional data; the provider does not charge
                // quota for these, so no pacing either.
                404 => return Err(FetchError::NotFound),
                403 if self.quota_exhausted() => {
                    if let Some(wait) = self.seconds_until_reset() {
                        tracing::warn!(
                            wait_secs = wait,
                            "rate limit exhausted, waiting for reset window"
                        );
                        tokio::time::sleep(Duration::from_secs(wait + 1)).await;
                        continue;
                    }
                    // Reset already in the past yet still 403: treat as
                    // transient and let the bounded retry handle it.
                    return Err(FetchError::Api { status: 403 });
                }
                status => return Err(FetchError::Api { status }),
            }
        }
    }

    fn request_headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![(
            "accept".to_string(),
            "application/vnd.github.v3+json".to_string(),
        )];
        if let Some(token) = &self.config.token {
            headers.push(("authorization".to_string(), format!("token {token}")));
        }
        headers
    }

    fn record_quota(&self, response: &HttpResponse) {
        let remaining = response
            .header("x-ratelimit-remaining")
            .and_then(|v| v.parse::<u32>().ok());
        let reset_epoch = response
            .header("x-ratelimit-reset")
            .and_then(|v| v.parse::<i64>().ok());

        if let Some(remaining) = remaining {
            let mut quota = self.quota.lock().unwrap_or_else(|e| e.into_inner());
            *quota = Some(RateLimitInfo {
                remaining,
                reset_epoch: reset_epoch
                    .or_else(|| quota.map(|q| q.reset_epoch))
                    .unwrap_or(0),
            });
        }
    }

    fn quota_exhausted(&self) -> bool {
        self.quota().is_some_and(|q| q.remaining == 0)
    }

    /// Positive seconds until the quota window resets, if in the future.
    fn seconds_until_reset(&self) -> Option<u64> {
        let reset = self.quota()?.reset_epoch;
        let wait = reset - Utc::now().timestamp();
        (wait > 0).then_some(wait as u64)
    }

    /// Adaptive inter-request pacing, applied after each successful response.
    async fn pace(&self) {
        if self.config.base_delay.is_zero() {
            return;
        }

        let delay = match self.quota() {
            Some(q) if q.remaining < self.config.low_water => {
                let multiplier = f64::from(self.config.low_water) / f64::from(q.remaining.max(1));
                self.config.base_delay.mul_f64(multiplier)
            }
            _ => self.config.base_delay,
        };

        tokio::time::sleep(delay).await;
    }

    // ─── Typed fetchers ──────────────────────────────────────────────────────

    /// Repository attributes. `NotFound` here means the repository itself is
    /// gone or inaccessible; callers skip the entity.
    pub async fn get_repo(&self, owner: &str, name: &str) -> Result<RawRepo> {
        let value = self.fetch(&format!("/repos/{owner}/{name}")).await?;
        serde_json::from_value(value).map_err(|e| FetchError::decode(e.to_string()))
    }

    /// README contents envelope, or `None` when the repository has none.
    pub async fn get_readme(&self, owner: &str, name: &str) -> Result<Option<ContentsEnvelope>> {
        match self.fetch(&format!("/repos/{owner}/{name}/readme")).await {
            Ok(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| FetchError::decode(e.to_string())),
            Err(FetchError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Language byte-histogram, empty when the provider has none.
    pub async fn get_languages(&self, owner: &str, name: &str) -> Result<LanguageHistogram> {
        match self.fetch(&format!("/repos/{owner}/{name}/languages")).await {
            Ok(value) => Ok(LanguageHistogram::from_value(&value)),
            Err(FetchError::NotFound) => Ok(LanguageHistogram::default()),
            Err(e) => Err(e),
        }
    }

    /// Current quota, asking the provider directly. The `/rate_limit`
    /// endpoint itself is not charged.
    pub async fn get_rate_limit(&self) -> Result<RateLimitInfo> {
        let value = self.fetch("/rate_limit").await?;
        let core = value
            .pointer("/resources/core")
            .ok_or_else(|| FetchError::decode("missing resources.core"))?;

        Ok(RateLimitInfo {
            remaining: core
                .get("remaining")
                .and_then(serde_json::Value::as_u64)
                .unwrap_or(0) as u32,
            reset_epoch: core
                .get("reset")
                .and_then(serde_json::Value::as_i64)
                .unwrap_or(0),
        })
    }
}
