//! Plain-text rendering of results

use crate::api::{Document, ScrapeResponse};
use crate::store::{PersistOutcome, PersistReport};
use std::io::{self, Write};

/// Renders a single-page scrape result
pub fn render_scrape<W: Write>(out: &mut W, result: &ScrapeResponse) -> io::Result<()> {
    let metadata = &result.data.metadata;

    writeln!(out, "# {}", metadata.title().unwrap_or("(untitled)"))?;
    if let Some(description) = metadata.description() {
        writeln!(out, "{}", description)?;
    }
    writeln!(out)?;
    writeln!(out, "Language: {}", metadata.language().unwrap_or("-"))?;
    match metadata.http_status() {
        Some(status) => writeln!(out, "Status: {}", status)?,
        None => writeln!(out, "Status: -")?,
    }
    writeln!(out, "Source: {}", metadata.source_url.as_deref().unwrap_or("-"))?;
    if let Some(error) = metadata.page_error() {
        writeln!(out, "Page error: {}", error)?;
    }
    writeln!(out)?;

    if let Some(markdown) = &result.data.markdown {
        writeln!(out, "{}", markdown)?;
    }

    Ok(())
}

/// Renders one crawled document: title, description, markdown
pub fn render_document<W: Write>(out: &mut W, document: &Document) -> io::Result<()> {
    let metadata = &document.metadata;
    writeln!(out, "## {}", metadata.title().unwrap_or("(untitled)"))?;
    if let Some(description) = metadata.description() {
        writeln!(out, "{}", description)?;
    }
    if let Some(markdown) = &document.markdown {
        writeln!(out)?;
        writeln!(out, "{}", markdown)?;
    }
    Ok(())
}

/// Renders a crawl result list in crawl order
pub fn render_crawl<W: Write>(out: &mut W, job_id: &str, documents: &[Document]) -> io::Result<()> {
    writeln!(out, "Job ID: {}", job_id)?;
    writeln!(out, "Results: {}", documents.len())?;

    for document in documents {
        writeln!(out)?;
        render_document(out, document)?;
    }

    Ok(())
}

/// Renders the outcome of a persistence batch
pub fn render_persist_report<W: Write>(out: &mut W, report: &PersistReport) -> io::Result<()> {
    writeln!(
        out,
        "Saved {} of {} documents ({} failed)",
        report.stored(),
        report.len(),
        report.failed()
    )?;

    for outcome in report.failures() {
        if let PersistOutcome::Failed { url, error } = outcome {
            writeln!(out, "  ✗ {}: {}", url.as_deref().unwrap_or("<no url>"), error)?;
        }
    }

    Ok(())
}
