//! Feed HTTP Client - Retrying GET Client for the Games Feed
//!
//! Wraps reqwest with timeouts, bounded retries, and exponential
//! backoff for upstream feed requests. Transient failures (429, 5xx,
//! network errors, timeouts) are retried in-call; what surfaces to the
//! caller is final for the fetch.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::UpstreamConfig;
use crate::ports::game_source::FetchError;

/// Retrying HTTP client for the upstream games feed.
pub struct FeedClient {
    /// Underlying HTTP client.
    http: Client,
    /// Feed base URL.
    base_url: String,
    /// Maximum retries on transient errors.
    max_retries: u32,
    /// Base delay between retries (exponential backoff).
    retry_base_delay: Duration,
}

impl FeedClient {
    /// Create a new feed client from config.
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .pool_max_idle_per_host(2)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
        })
    }

    /// Execute a GET request, retrying transient failures with backoff.
    ///
    /// Returns the response body on 2xx. Non-retryable statuses (4xx
    /// other than 429) surface immediately as [`FetchError::Http`].
    pub async fn get(&self, path: &str) -> Result<String, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        let mut last_error = FetchError::Network("no attempt made".to_string());

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.retry_base_delay * 2u32.pow(attempt - 1);
                debug!(attempt, delay_ms = delay.as_millis(), "Retrying feed request");
                sleep(delay).await;
            }

            match self.http.get(&url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .text()
                            .await
                            .map_err(|e| FetchError::Network(e.to_string()));
                    }

                    let body = response.text().await.unwrap_or_default();
                    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                        warn!(status = %status, attempt, "Feed returned retryable status");
                        last_error = FetchError::Http {
                            status: status.as_u16(),
                            body,
                        };
                        continue;
                    }

                    return Err(FetchError::Http {
                        status: status.as_u16(),
                        body,
                    });
                }
                Err(e) if e.is_timeout() => {
                    warn!(attempt, "Feed request timed out");
                    last_error = FetchError::Timeout;
                }
                Err(e) => {
                    warn!(error = %e, attempt, "Feed request failed");
                    last_error = FetchError::Network(e.to_string());
                }
            }
        }

        Err(last_error)
    }
}
