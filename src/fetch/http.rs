//! HTTP page fetcher with bounded retries, plus a rate-limited wrapper.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::fetch::encoding::decode_with_fallbacks;
use crate::traits::fetcher::{FetchedPage, PageFetcher};
use crate::types::config::FetchConfig;

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Fetches pages with reqwest, retrying transient failures with a fixed
/// backoff. Bodies are decoded through the charset detector so mislabeled
/// pages still come out readable.
pub struct HttpFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Build a fetcher from config.
    pub fn new(config: FetchConfig) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Http(Box::new(e)))?;
        Ok(Self { client, config })
    }

    async fn fetch_once(&self, url: &str) -> FetchResult<FetchedPage> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout { url: url.to_string() }
            } else {
                FetchError::Http(Box::new(e))
            }
        })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))?
            .to_vec();

        let (html, detected) = decode_with_fallbacks(&bytes, content_type.as_deref());
        debug!(
            url,
            status,
            encoding = detected.encoding.name(),
            bytes = bytes.len(),
            "fetched page"
        );

        Ok(FetchedPage {
            url: url.to_string(),
            final_url,
            status,
            html,
            bytes,
            content_type,
            fetched_at: chrono::Utc::now(),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        Url::parse(url).map_err(|_| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;

        let attempts = self.config.retries.max(1);
        for attempt in 1..=attempts {
            match self.fetch_once(url).await {
                Ok(page) => return Ok(page),
                Err(e) if e.is_transient() && attempt < attempts => {
                    warn!(url, attempt, error = %e, "transient fetch failure, retrying");
                    tokio::time::sleep(self.config.backoff).await;
                }
                Err(e) => return Err(e),
            }
        }

        Err(FetchError::RetriesExhausted {
            url: url.to_string(),
            attempts,
        })
    }
}

/// A fetcher wrapper that enforces a sustained request rate.
///
/// Uses the governor crate for precise rate limiting with burst support.
pub struct RateLimitedFetcher<F: PageFetcher> {
    inner: F,
    limiter: Arc<DefaultRateLimiter>,
}

impl<F: PageFetcher> RateLimitedFetcher<F> {
    /// Wrap a fetcher with a requests-per-second ceiling. A zero rate is
    /// clamped to one request per second.
    pub fn new(fetcher: F, requests_per_second: u32) -> Self {
        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            inner: fetcher,
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(rate))),
        }
    }

    /// Wrap using the configured `requests_per_second`.
    pub fn from_config(fetcher: F, config: &FetchConfig) -> Self {
        Self::new(fetcher, config.requests_per_second)
    }

    /// Wrap with a custom quota.
    pub fn with_quota(fetcher: F, quota: Quota) -> Self {
        Self {
            inner: fetcher,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for RateLimitedFetcher<F> {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        self.limiter.until_ready().await;
        self.inner.fetch(url).await
    }
}
