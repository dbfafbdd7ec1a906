//! Output of scrape and crawl results
//!
//! This module handles:
//! - JSON export of results to a file named after the source URL
//! - Plain-text rendering of results and persistence reports

mod export;
mod render;

pub use export::{export_filename, export_json, filename_base, FALLBACK_FILENAME, MAX_BASE_LEN};
pub use render::{render_crawl, render_document, render_persist_report, render_scrape};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
