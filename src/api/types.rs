//! Request and response bodies of the scrape/crawl service

use crate::options::{CrawlOptions, PageOptions};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Formats requested by a crawl when the panel does not choose any
const DEFAULT_CRAWL_FORMATS: &[&str] = &["markdown"];

/// Metadata block attached to every returned document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Meta-tag derived; a repeated tag arrives as an array
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Value>,

    #[serde(rename = "sourceURL", default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,

    #[serde(rename = "statusCode", default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    #[serde(rename = "pageStatusCode", default, skip_serializing_if = "Option::is_none")]
    pub page_status_code: Option<u16>,

    #[serde(rename = "pageError", default, skip_serializing_if = "Option::is_none")]
    pub page_error: Option<Value>,

    /// Every other key the service sent (og tags, robots, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocumentMetadata {
    /// HTTP status of the fetched page, whichever field the service used
    pub fn http_status(&self) -> Option<u16> {
        self.status_code.or(self.page_status_code)
    }

    /// Page title, when the service sent it as a single string
    pub fn title(&self) -> Option<&str> {
        as_text(&self.title)
    }

    pub fn description(&self) -> Option<&str> {
        as_text(&self.description)
    }

    pub fn language(&self) -> Option<&str> {
        as_text(&self.language)
    }

    pub fn page_error(&self) -> Option<&str> {
        as_text(&self.page_error)
    }
}

fn as_text(value: &Option<Value>) -> Option<&str> {
    value.as_ref().and_then(Value::as_str)
}

/// One scraped or crawled page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    #[serde(rename = "rawHtml", default, skip_serializing_if = "Option::is_none")]
    pub raw_html: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<String>>,

    #[serde(default)]
    pub metadata: DocumentMetadata,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of `POST /v1/scrape`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapeResponse {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub data: Document,
}

/// Response of `POST /v1/crawl`
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlJobCreated {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub error: Option<String>,
}

/// Status reported by `GET /v1/crawl/{id}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Completed,
    Failed,
    /// `pending`, `scraping` or anything else that is not terminal
    InProgress(String),
}

impl JobStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            other => Self::InProgress(other.to_string()),
        }
    }
}

/// Response of `GET /v1/crawl/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrawlStatusResponse {
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub data: Option<Vec<Document>>,

    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub total: Option<u64>,

    #[serde(default)]
    pub completed: Option<u64>,
}

impl CrawlStatusResponse {
    pub fn job_status(&self) -> JobStatus {
        JobStatus::parse(&self.status)
    }
}

/// Body of `POST /v1/scrape`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest<'a> {
    pub url: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_main_content: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_tags: Option<&'a [String]>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_tags: Option<&'a [String]>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for: Option<u64>,
}

impl<'a> ScrapeRequest<'a> {
    /// Forwards exactly the page options that are set
    pub fn new(url: &'a str, options: &'a PageOptions) -> Self {
        let wants_formats = options.formats.is_some()
            || options.include_html == Some(true)
            || options.include_links == Some(true);

        Self {
            url,
            only_main_content: options.only_main_content,
            exclude_tags: options.exclude_tags.as_deref(),
            include_tags: options.include_tags.as_deref(),
            formats: wants_formats.then(|| options.effective_formats(DEFAULT_CRAWL_FORMATS)),
            wait_for: options.wait_for,
        }
    }
}

/// `scrapeOptions` block of a crawl request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeOptionsBody {
    pub formats: Vec<String>,
    pub only_main_content: bool,
    pub exclude_tags: Vec<String>,
    pub include_tags: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for: Option<u64>,
}

/// Body of `POST /v1/crawl`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlRequest<'a> {
    pub url: &'a str,
    pub limit: u32,
    pub ignore_sitemap: bool,
    pub allow_backward_links: bool,
    pub origin: &'static str,
    pub scrape_options: ScrapeOptionsBody,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_paths: Option<&'a [String]>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_paths: Option<&'a [String]>,
}

impl<'a> CrawlRequest<'a> {
    /// Builds the crawl body, filling defaults only for absent options
    ///
    /// An explicit `false` for `allowBackwardLinks` or `onlyMainContent`
    /// is sent as `false`.
    pub fn new(url: &'a str, crawl: &'a CrawlOptions, page: &'a PageOptions) -> Self {
        Self {
            url,
            limit: crawl.limit.unwrap_or(10),
            ignore_sitemap: crawl.ignore_sitemap.unwrap_or(false),
            allow_backward_links: crawl.allow_backward_links.unwrap_or(true),
            origin: "website",
            scrape_options: ScrapeOptionsBody {
                formats: page.effective_formats(DEFAULT_CRAWL_FORMATS),
                only_main_content: page.only_main_content.unwrap_or(true),
                exclude_tags: page.exclude_tags.clone().unwrap_or_default(),
                include_tags: page.include_tags.clone().unwrap_or_default(),
                wait_for: page.wait_for,
            },
            max_depth: crawl.max_depth,
            exclude_paths: crawl.exclude_paths.as_deref(),
            include_paths: crawl.include_paths.as_deref(),
        }
    }
}
