use crate::api::{ApiClient, ScrapeResponse};
use crate::flow::normalize_target;
use crate::options::{PageField, PageOptions};
use crate::output::export_json;
use crate::store::{persist_documents, DocumentStore, PersistReport};
use crate::{FirestashError, Result};
use std::path::{Path, PathBuf};

/// Single-URL scrape flow
pub struct ScrapeFlow {
    client: ApiClient,
    page_options: PageOptions,
    result: Option<ScrapeResponse>,
    error: Option<String>,
}

impl ScrapeFlow {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            page_options: PageOptions::scrape_defaults(),
            result: None,
            error: None,
        }
    }

    pub fn page_options(&self) -> &PageOptions {
        &self.page_options
    }

    /// Merges a partial update from the page options panel
    pub fn update_page_options<I>(&mut self, update: I)
    where
        I: IntoIterator<Item = PageField>,
    {
        self.page_options.merge(update);
    }

    /// Scrapes `url` with the current options
    ///
    /// The previous result is discarded first. On failure the message is
    /// kept in [`ScrapeFlow::error`] and also returned.
    pub async fn submit(&mut self, url: &str) -> Result<&ScrapeResponse> {
        self.result = None;
        self.error = None;

        let outcome = match normalize_target(url) {
            Ok(target) => self
                .client
                .scrape(&target, &self.page_options)
                .await
                .map_err(FirestashError::from),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(result) => Ok(self.result.insert(result)),
            Err(e) => {
                tracing::error!("Error during scrape: {}", e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn result(&self) -> Option<&ScrapeResponse> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Writes the held result as JSON; `None` when there is nothing to export
    pub fn download(&self, directory: &Path) -> Result<Option<PathBuf>> {
        match &self.result {
            Some(result) => {
                let source = result.data.metadata.source_url.as_deref();
                Ok(Some(export_json(result, source, directory)?))
            }
            None => Ok(None),
        }
    }

    /// Persists the held document; `None` when there is nothing to save
    pub async fn save<S>(&self, store: &S) -> Option<PersistReport>
    where
        S: DocumentStore + ?Sized,
    {
        let result = self.result.as_ref()?;
        Some(persist_documents(store, std::slice::from_ref(&result.data)).await)
    }
}
