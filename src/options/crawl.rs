use super::{parse_bool, parse_list, parse_number, split_assignment, OptionError};
use std::str::FromStr;

/// Crawl-level options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Maximum number of pages to crawl
    pub limit: Option<u32>,
    pub max_depth: Option<u32>,
    /// Path patterns to skip (e.g. `blog/*`)
    pub exclude_paths: Option<Vec<String>>,
    /// Path patterns to restrict the crawl to
    pub include_paths: Option<Vec<String>>,
    pub ignore_sitemap: Option<bool>,
    pub allow_backward_links: Option<bool>,
}

/// A single field of a crawl options update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlField {
    Limit(Option<u32>),
    MaxDepth(Option<u32>),
    ExcludePaths(Vec<String>),
    IncludePaths(Vec<String>),
    IgnoreSitemap(bool),
    AllowBackwardLinks(bool),
}

impl CrawlOptions {
    /// Initial state of the crawler panel
    pub fn panel_defaults() -> Self {
        Self {
            limit: Some(10),
            ignore_sitemap: Some(false),
            allow_backward_links: Some(true),
            ..Self::default()
        }
    }

    /// Sets one field, leaving every other field unchanged
    pub fn apply(&mut self, field: CrawlField) {
        match field {
            CrawlField::Limit(limit) => self.limit = limit,
            CrawlField::MaxDepth(depth) => self.max_depth = depth,
            CrawlField::ExcludePaths(paths) => self.exclude_paths = Some(paths),
            CrawlField::IncludePaths(paths) => self.include_paths = Some(paths),
            CrawlField::IgnoreSitemap(on) => self.ignore_sitemap = Some(on),
            CrawlField::AllowBackwardLinks(on) => self.allow_backward_links = Some(on),
        }
    }

    /// Applies a partial update in order
    pub fn merge<I>(&mut self, update: I)
    where
        I: IntoIterator<Item = CrawlField>,
    {
        for field in update {
            self.apply(field);
        }
    }
}

impl FromStr for CrawlField {
    type Err = OptionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (key, value) = split_assignment(input)?;

        let field = match key.as_str() {
            "limit" => CrawlField::Limit(parse_number(&key, value)?),
            "maxdepth" => CrawlField::MaxDepth(parse_number(&key, value)?),
            "exclude" | "excludepaths" => CrawlField::ExcludePaths(parse_list(value)),
            "includes" | "includepaths" => CrawlField::IncludePaths(parse_list(value)),
            "ignoresitemap" => CrawlField::IgnoreSitemap(parse_bool(&key, value)?),
            "allowbackwardlinks" => CrawlField::AllowBackwardLinks(parse_bool(&key, value)?),
            other => return Err(OptionError::UnknownKey(other.to_string())),
        };

        Ok(field)
    }
}
