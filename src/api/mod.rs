//! Client for the remote scrape/crawl service
//!
//! This module contains:
//! - Wire types for scrape, crawl-job creation and crawl-job status
//! - The HTTP client wrapping the three service operations
//! - The crawl job poller (a fixed-cadence state machine)

mod client;
mod poller;
mod types;

pub use client::{build_http_client, ApiClient};
pub use poller::{JobPoller, JobState, JobStatusSource};
pub use types::{
    CrawlJobCreated, CrawlRequest, CrawlStatusResponse, Document, DocumentMetadata, JobStatus,
    ScrapeOptionsBody, ScrapeRequest, ScrapeResponse,
};

use thiserror::Error;

/// Errors returned by the scrape/crawl service client
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response; `message` is the server-supplied text or a
    /// generic line carrying the status
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The crawl job reported status `failed`
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// The polling budget ran out before the job finished
    #[error("Timeout while waiting for crawl results after {attempts} attempts")]
    Timeout { attempts: u32 },

    /// The service answered 2xx but did not accept the request
    #[error("Request rejected by service: {0}")]
    Rejected(String),

    #[error("HTTP client error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode service response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
