//! HTTP story source for the StoryShelf content service.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::keys::ProfileId;
use crate::models::RemoteStory;
use crate::sync::StorySource;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default base URL of the content service
pub const DEFAULT_API_BASE_URL: &str = "https://api.storyshelf.app";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// The service returns either a bare array or `{"stories": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoriesResponse {
    List(Vec<RemoteStory>),
    Wrapped { stories: Vec<RemoteStory> },
}

impl StoriesResponse {
    fn into_stories(self) -> Vec<RemoteStory> {
        match self {
            StoriesResponse::List(stories) => stories,
            StoriesResponse::Wrapped { stories } => stories,
        }
    }
}

/// Story source backed by the remote REST API.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpStorySource {
    client: Client,
    base_url: String,
    token: Option<Arc<str>>,
}

impl HttpStorySource {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Build from configuration, falling back to the default URL and timeout.
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = config
            .api_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let timeout = Duration::from_secs(config.request_timeout_secs.unwrap_or(REQUEST_TIMEOUT_SECS));
        Self::with_timeout(base_url, timeout)
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: impl Into<Arc<str>>) {
        self.token = Some(token.into());
    }

    /// Create a new source with the given token, sharing the connection pool.
    pub fn with_token(&self, token: impl Into<Arc<str>>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token.into()),
        }
    }

    fn stories_url(&self, profile: ProfileId) -> String {
        format!("{}/children/{}/stories", self.base_url, profile)
    }

    fn auth_headers(&self) -> std::result::Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        if let Some(ref token) = self.token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::InvalidResponse(format!("Invalid token header: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> std::result::Result<Option<reqwest::Response>, ApiError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> std::result::Result<T, ApiError> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(url)
                .headers(self.auth_headers()?)
                .send()
                .await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    let text = response.text().await?;
                    return serde_json::from_str(&text).map_err(|e| {
                        ApiError::InvalidResponse(format!("Failed to parse JSON from {}: {}", url, e))
                    });
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited);
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }
}

#[async_trait]
impl StorySource for HttpStorySource {
    async fn fetch_user_stories(&self, profile: ProfileId) -> std::result::Result<Vec<RemoteStory>, ApiError> {
        let url = self.stories_url(profile);
        let response: StoriesResponse = self.get(&url).await?;
        let stories = response.into_stories();
        debug!(profile = %profile, count = stories.len(), "Stories fetched");
        Ok(stories)
    }
}
