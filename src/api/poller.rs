//! Crawl job polling
//!
//! A crawl job is queried at a fixed interval until it reaches a terminal
//! state or the attempt budget runs out:
//!
//! ```text
//! Pending --completed+data--> Completed
//!    |  \--failed------------> Failed
//!    \----budget exhausted---> TimedOut
//! ```
//!
//! Any other status consumes one attempt and waits one interval. There is
//! no backoff and no jitter; callers rely on the fixed cadence.

use crate::api::client::ApiClient;
use crate::api::types::{CrawlStatusResponse, Document, JobStatus};
use crate::api::ApiError;
use crate::config::PollingConfig;
use async_trait::async_trait;
use std::time::Duration;

/// Something that can report the status of a crawl job
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    async fn job_status(&self, job_id: &str) -> Result<CrawlStatusResponse, ApiError>;
}

#[async_trait]
impl JobStatusSource for ApiClient {
    async fn job_status(&self, job_id: &str) -> Result<CrawlStatusResponse, ApiError> {
        self.crawl_status(job_id).await
    }
}

/// State of a crawl job as seen by the poller
#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    /// Not finished yet; `attempts` status queries have been made
    Pending { attempts: u32 },
    Completed(Vec<Document>),
    Failed(String),
    TimedOut { attempts: u32 },
}

impl JobState {
    pub fn start() -> Self {
        Self::Pending { attempts: 0 }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending { .. })
    }

    /// Folds one status response into the state, consuming an attempt
    ///
    /// `completed` only terminates when the response carries a result
    /// list; otherwise the job is still treated as pending.
    pub fn on_response(self, response: CrawlStatusResponse) -> Self {
        let attempts = match self {
            Self::Pending { attempts } => attempts + 1,
            terminal => return terminal,
        };

        match (response.job_status(), response.data) {
            (JobStatus::Completed, Some(documents)) => Self::Completed(documents),
            (JobStatus::Failed, _) => Self::Failed(
                response
                    .error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| "Unknown error".to_string()),
            ),
            _ => Self::Pending { attempts },
        }
    }

    /// Moves a pending job to `TimedOut` once the budget is spent
    pub fn check_budget(self, max_attempts: u32) -> Self {
        match self {
            Self::Pending { attempts } if attempts >= max_attempts => Self::TimedOut { attempts },
            other => other,
        }
    }
}

/// Drives a [`JobState`] against a status source
pub struct JobPoller<'a, S: JobStatusSource + ?Sized> {
    source: &'a S,
    interval: Duration,
    max_attempts: u32,
}

impl<'a, S: JobStatusSource + ?Sized> JobPoller<'a, S> {
    pub fn new(source: &'a S, config: &PollingConfig) -> Self {
        Self {
            source,
            interval: config.interval(),
            max_attempts: config.max_attempts,
        }
    }

    /// Waits for the job to finish and returns its documents in crawl order
    ///
    /// Suspends the task between attempts. A non-2xx status query fails
    /// immediately; it is not retried.
    pub async fn wait(&self, job_id: &str) -> Result<Vec<Document>, ApiError> {
        let mut state = JobState::start();

        loop {
            state = match state.check_budget(self.max_attempts) {
                JobState::Completed(documents) => {
                    tracing::info!("Crawl job {} completed with {} documents", job_id, documents.len());
                    return Ok(documents);
                }
                JobState::Failed(message) => {
                    tracing::info!("Crawl job {} failed: {}", job_id, message);
                    return Err(ApiError::JobFailed(message));
                }
                JobState::TimedOut { attempts } => {
                    tracing::warn!("Crawl job {} timed out after {} attempts", job_id, attempts);
                    return Err(ApiError::Timeout { attempts });
                }
                pending => {
                    let response = self.source.job_status(job_id).await?;
                    tracing::debug!("Crawl job {} status: {}", job_id, response.status);

                    let next = pending.on_response(response);
                    if !next.is_terminal() {
                        tokio::time::sleep(self.interval).await;
                    }
                    next
                }
            };
        }
    }
}
