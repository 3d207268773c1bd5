//! Authenticated Web API client.
//!
//! Failure policy:
//! - 401 stops immediately with [`ApiError::Unauthorized`]; the caller must
//!   refresh credentials.
//! - 429 waits for the server's `Retry-After` hint and retries, at most
//!   `rate_limit_retries` times.
//! - Anything else non-2xx is returned as [`ApiError::Status`] without retry.

use std::time::Duration;

use reqwest::{header::RETRY_AFTER, Client, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ApiConfig, FetchConfig};
use crate::model::TimeRange;
use crate::raw::Endpoint;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("access token rejected (401); refresh credentials with `wrapped auth refresh`")]
    Unauthorized,
    #[error("still rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },
    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("{url} returned a body that is not JSON: {source}")]
    InvalidJson {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub struct ApiClient {
    http: Client,
    base_url: String,
    access_token: String,
    rate_limit_retries: u32,
    default_retry_after: Duration,
}

impl ApiClient {
    pub fn new(api: &ApiConfig, fetch: &FetchConfig, access_token: &str) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(concat!("wrapped/", env!("CARGO_PKG_VERSION")))
            .timeout(api.timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            rate_limit_retries: fetch.rate_limit_retries,
            default_retry_after: fetch.default_retry_after(),
        })
    }

    pub async fn top_items(
        &self,
        endpoint: Endpoint,
        range: TimeRange,
        limit: u32,
    ) -> Result<String, ApiError> {
        let query = [
            ("limit", limit.to_string()),
            ("time_range", range.as_str().to_string()),
        ];
        self.get(endpoint.path(), &query).await
    }

    pub async fn recently_played(&self, limit: u32) -> Result<String, ApiError> {
        self.get(Endpoint::RecentlyPlayed.path(), &[("limit", limit.to_string())])
            .await
    }

    /// GET `path` and return the body exactly as received, once it is known
    /// to be JSON.
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            debug!("GET {} {:?} (attempt {})", url, query, attempt);
            let response = self
                .http
                .get(&url)
                .bearer_auth(&self.access_token)
                .query(query)
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED {
                return Err(ApiError::Unauthorized);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt > self.rate_limit_retries {
                    return Err(ApiError::RateLimited { attempts: attempt });
                }
                let wait = retry_after(response.headers().get(RETRY_AFTER))
                    .unwrap_or(self.default_retry_after);
                warn!("Rate limited on {}, waiting {:?}", url, wait);
                tokio::time::sleep(wait).await;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ApiError::Status { url, status, body });
            }

            let body = response.text().await?;
            if let Err(source) = serde_json::from_str::<serde_json::Value>(&body) {
                return Err(ApiError::InvalidJson { url, source });
            }
            return Ok(body);
        }
    }
}

/// `Retry-After` in whole seconds. HTTP-date values are not used by the API
/// and fall back to the configured default.
fn retry_after(value: Option<&reqwest::header::HeaderValue>) -> Option<Duration> {
    value?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
