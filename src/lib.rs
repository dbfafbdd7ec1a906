//! Firestash: a client for a remote scrape/crawl service
//!
//! This crate drives a Firecrawl-style API (single-page scrape, multi-page
//! crawl jobs), polls crawl jobs to completion, and persists the returned
//! documents into a normalized relational schema or exports them as JSON.

pub mod api;
pub mod config;
pub mod flow;
pub mod options;
pub mod output;
pub mod store;

use thiserror::Error;

/// Main error type of the scrape and crawl flows
#[derive(Debug, Error)]
pub enum FirestashError {
    #[error("{0}")]
    Api(#[from] api::ApiError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Export failed: {0}")]
    Output(#[from] output::OutputError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Firestash operations
pub type Result<T> = std::result::Result<T, FirestashError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use api::{ApiClient, Document, DocumentMetadata, JobState};
pub use config::Config;
pub use flow::{CrawlFlow, ScrapeFlow};
pub use options::{CrawlOptions, PageOptions};
pub use store::{persist_documents, DocumentStore, PersistOutcome, PersistReport};
