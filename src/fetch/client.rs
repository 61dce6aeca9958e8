//! Hydra API Client
//!
//! HTTP client for the JSON-LD/Hydra API. One call to [`ApiClient::request`]
//! is one network round trip; caching lives in the resource operations.

use super::cache::QueryCache;
use super::hub::extract_hub_url;
use super::{FetchError, FetchResponse, RequestOptions};
use crate::config::ApiConfig;
use crate::resource::normalize;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Media type of every request and response body
pub const MIME_TYPE: &str = "application/ld+json";

/// Hydra API client
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
    pub(crate) cache: QueryCache,
}

impl ApiClient {
    /// Create a new client with the given configuration
    pub fn new(config: ApiConfig) -> Result<Self, FetchError> {
        // No client-wide timeout: live-update streams share this client and
        // stay open indefinitely. Regular requests get a per-request timeout.
        let client = Client::builder()
            .user_agent(concat!("hydra-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            cache: QueryCache::with_capacity(config.cache_capacity),
            config,
        })
    }

    /// Get the current configuration
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn entrypoint(&self) -> &Url {
        &self.config.entrypoint
    }

    /// Underlying HTTP client, shared with live-update subscriptions
    pub fn http(&self) -> &Client {
        &self.client
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Resolve an absolute URL or root-relative path against the entrypoint
    pub fn resolve(&self, path: &str) -> Result<Url, FetchError> {
        self.config
            .entrypoint
            .join(path)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Path and query of a resolved URL, used as the cache key
    pub(crate) fn cache_path(&self, path: &str) -> Result<String, FetchError> {
        let url = self.resolve(path)?;
        Ok(match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        })
    }

    /// Perform a request and decode the body as `T`
    ///
    /// Non-2xx answers always fail with [`FetchError::Http`]. A `204 No
    /// Content` decodes as JSON `null`, so `T = ()` suits deletes.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<FetchResponse<T>, FetchError> {
        let url = self.resolve(path)?;
        let RequestOptions {
            method,
            body,
            mut headers,
        } = options;

        if !headers.contains_key(ACCEPT) {
            headers.insert(ACCEPT, HeaderValue::from_static(MIME_TYPE));
        }

        let mut builder = self
            .client
            .request(method.clone(), url.clone())
            .timeout(Duration::from_millis(self.config.request_timeout_ms));

        if let Some(body) = body {
            if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(MIME_TYPE));
            }
            builder = builder.body(serde_json::to_vec(&body)?);
        }

        tracing::debug!(method = %method, url = %url, "Sending API request");

        let response = builder.headers(headers).send().await?;
        let status = response.status();
        let hub_url = extract_hub_url(response.headers(), &self.config.entrypoint);
        let text = response.text().await?;

        tracing::debug!(
            method = %method,
            url = %url,
            status = status.as_u16(),
            "API response received"
        );

        if !status.is_success() {
            return Err(FetchError::from_problem(status, &text));
        }

        let raw = if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };
        let data = serde_json::from_value(normalize(raw))?;

        Ok(FetchResponse {
            data,
            status: status.as_u16(),
            hub_url,
            text,
        })
    }
}
