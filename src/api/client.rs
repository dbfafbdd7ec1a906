//! HTTP client for the scrape/crawl service
//!
//! Wraps the three service operations:
//! - `POST /v1/scrape` - synchronous single-page scrape
//! - `POST /v1/crawl` - create an asynchronous crawl job
//! - `GET /v1/crawl/{id}` - query a crawl job

use crate::api::types::{
    CrawlJobCreated, CrawlRequest, CrawlStatusResponse, ScrapeRequest, ScrapeResponse,
};
use crate::api::ApiError;
use crate::config::ApiConfig;
use crate::options::{CrawlOptions, PageOptions};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Builds an HTTP client for the service
///
/// Only the connect phase is bounded: scrapes can legitimately take a long
/// time on the service side and the crawl poller has its own ceiling.
pub fn build_http_client(config: &ApiConfig) -> Result<Client, reqwest::Error> {
    let user_agent = format!("firestash/{}", env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Client for the scrape/crawl service
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

/// Error body shapes the service uses on non-2xx responses
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ApiClient {
    /// Creates a client from configuration
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = build_http_client(config)?;
        Ok(Self::with_client(http, &config.base_url, config.api_key.clone()))
    }

    /// Creates a client around an existing `reqwest::Client`
    pub fn with_client(http: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Scrapes a single page
    pub async fn scrape(&self, url: &str, options: &PageOptions) -> Result<ScrapeResponse, ApiError> {
        let body = ScrapeRequest::new(url, options);
        tracing::debug!("Scraping {}", url);

        let response = self
            .authorize(self.http.post(self.endpoint("scrape")))
            .json(&body)
            .send()
            .await?;

        decode(check_status(response).await?).await
    }

    /// Creates a crawl job and returns its identifier
    ///
    /// The service must answer with `success: true` and an id; anything
    /// else is reported as [`ApiError::Rejected`].
    pub async fn create_crawl(
        &self,
        url: &str,
        crawl: &CrawlOptions,
        page: &PageOptions,
    ) -> Result<String, ApiError> {
        let body = CrawlRequest::new(url, crawl, page);
        tracing::debug!("Creating crawl job for {} (limit {})", url, body.limit);

        let response = self
            .authorize(self.http.post(self.endpoint("crawl")))
            .json(&body)
            .send()
            .await?;

        let created: CrawlJobCreated = decode(check_status(response).await?).await?;

        match created.id.filter(|id| !id.is_empty()) {
            Some(id) if created.success => {
                tracing::info!("Crawl job {} created for {}", id, url);
                Ok(id)
            }
            _ => Err(ApiError::Rejected(
                created
                    .error
                    .unwrap_or_else(|| "crawl job was not created".to_string()),
            )),
        }
    }

    /// Queries the status of a crawl job once
    pub async fn crawl_status(&self, job_id: &str) -> Result<CrawlStatusResponse, ApiError> {
        let response = self
            .authorize(self.http.get(self.endpoint(&format!("crawl/{}", job_id))))
            .send()
            .await?;

        decode(check_status(response).await?).await
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

/// Turns a non-2xx response into [`ApiError::Http`]
///
/// The message is taken from the body's `error` field, then `message`,
/// falling back to a line carrying the status code.
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    let message = body
        .error
        .or(body.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));

    tracing::debug!("Service returned {}: {}", status, message);

    Err(ApiError::Http {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
