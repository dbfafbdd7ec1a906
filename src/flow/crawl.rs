use crate::api::{ApiClient, Document, JobPoller};
use crate::config::PollingConfig;
use crate::flow::normalize_target;
use crate::options::{CrawlField, CrawlOptions, PageField, PageOptions};
use crate::output::export_json;
use crate::store::{persist_documents, DocumentStore, PersistReport};
use crate::{FirestashError, Result};
use std::path::{Path, PathBuf};

/// Multi-page crawl flow: create job, poll, hold results
pub struct CrawlFlow {
    client: ApiClient,
    polling: PollingConfig,
    crawl_options: CrawlOptions,
    page_options: PageOptions,
    job_id: Option<String>,
    results: Vec<Document>,
    error: Option<String>,
}

impl CrawlFlow {
    pub fn new(client: ApiClient, polling: PollingConfig) -> Self {
        Self {
            client,
            polling,
            crawl_options: CrawlOptions::panel_defaults(),
            page_options: PageOptions::crawl_defaults(),
            job_id: None,
            results: Vec::new(),
            error: None,
        }
    }

    pub fn crawl_options(&self) -> &CrawlOptions {
        &self.crawl_options
    }

    pub fn page_options(&self) -> &PageOptions {
        &self.page_options
    }

    /// Merges a partial update from the crawler options panel
    pub fn update_crawl_options<I>(&mut self, update: I)
    where
        I: IntoIterator<Item = CrawlField>,
    {
        self.crawl_options.merge(update);
    }

    /// Merges a partial update from the page options panel
    pub fn update_page_options<I>(&mut self, update: I)
    where
        I: IntoIterator<Item = PageField>,
    {
        self.page_options.merge(update);
    }

    /// Creates a crawl job for `url` and waits for its results
    ///
    /// Returns only once the job completed, failed, or the polling budget
    /// ran out. On failure the message is kept in [`CrawlFlow::error`].
    pub async fn submit(&mut self, url: &str) -> Result<&[Document]> {
        self.error = None;
        self.job_id = None;
        self.results.clear();

        match self.run(url).await {
            Ok(documents) => {
                self.results = documents;
                Ok(self.results.as_slice())
            }
            Err(e) => {
                tracing::error!("Error during crawl: {}", e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn run(&mut self, url: &str) -> Result<Vec<Document>> {
        let target = normalize_target(url)?;
        let job_id = self
            .client
            .create_crawl(&target, &self.crawl_options, &self.page_options)
            .await?;
        let job_id = self.job_id.insert(job_id);

        let documents = JobPoller::new(&self.client, &self.polling)
            .wait(job_id)
            .await?;

        Ok(documents)
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    pub fn results(&self) -> &[Document] {
        &self.results
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Writes all results as one JSON array, named after the first result
    pub fn download(&self, directory: &Path) -> Result<Option<PathBuf>> {
        let Some(first) = self.results.first() else {
            return Ok(None);
        };
        let source = first.metadata.source_url.as_deref();
        Ok(Some(export_json(&self.results, source, directory)?))
    }

    /// Persists all results; `None` when there is nothing to save
    pub async fn save<S>(&self, store: &S) -> Option<PersistReport>
    where
        S: DocumentStore + ?Sized,
    {
        if self.results.is_empty() {
            return None;
        }
        Some(persist_documents(store, &self.results).await)
    }
}
