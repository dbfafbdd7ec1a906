//! User-facing flows
//!
//! A flow owns the option state of its panels, runs the submission against
//! the service and holds the latest results until the next submission.
//! Every failure is captured as a single message and leaves the flow idle
//! and ready for another attempt.

mod crawl;
mod scrape;

pub use crawl::CrawlFlow;
pub use scrape::ScrapeFlow;

use crate::{FirestashError, Result};
use url::Url;

/// Validates and completes a URL typed by the user
///
/// Surrounding whitespace is dropped and a missing scheme defaults to
/// `https://`. The text is otherwise forwarded as typed.
pub fn normalize_target(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(FirestashError::InvalidUrl("URL is required".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let parsed = Url::parse(&candidate)
        .map_err(|e| FirestashError::InvalidUrl(format!("{}: {}", trimmed, e)))?;

    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(candidate),
        _ => Err(FirestashError::InvalidUrl(format!(
            "{}: only http and https URLs can be scraped",
            trimmed
        ))),
    }
}
