use super::{parse_bool, parse_list, parse_number, split_assignment, OptionError};
use std::str::FromStr;

/// Page-level options shared by scrape and crawl requests
///
/// Every field is optional; an absent field falls back to the request
/// default when the request body is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOptions {
    pub exclude_tags: Option<Vec<String>>,
    pub include_tags: Option<Vec<String>>,
    /// Delay before the service captures the page (milliseconds)
    pub wait_for: Option<u64>,
    pub only_main_content: Option<bool>,
    pub include_html: Option<bool>,
    pub include_links: Option<bool>,
    pub formats: Option<Vec<String>>,
}

/// A single field of a page options update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageField {
    ExcludeTags(Vec<String>),
    IncludeTags(Vec<String>),
    WaitFor(Option<u64>),
    OnlyMainContent(bool),
    IncludeHtml(bool),
    IncludeLinks(bool),
    Formats(Vec<String>),
}

impl PageOptions {
    /// Initial state of the crawl page panel
    pub fn crawl_defaults() -> Self {
        Self {
            only_main_content: Some(true),
            ..Self::default()
        }
    }

    /// Initial state of the single-URL scrape page panel
    pub fn scrape_defaults() -> Self {
        Self {
            only_main_content: Some(true),
            formats: Some(vec![
                "markdown".to_string(),
                "html".to_string(),
                "rawHtml".to_string(),
            ]),
            ..Self::default()
        }
    }

    /// Sets one field, leaving every other field unchanged
    pub fn apply(&mut self, field: PageField) {
        match field {
            PageField::ExcludeTags(tags) => self.exclude_tags = Some(tags),
            PageField::IncludeTags(tags) => self.include_tags = Some(tags),
            PageField::WaitFor(ms) => self.wait_for = ms,
            PageField::OnlyMainContent(on) => self.only_main_content = Some(on),
            PageField::IncludeHtml(on) => self.include_html = Some(on),
            PageField::IncludeLinks(on) => self.include_links = Some(on),
            PageField::Formats(formats) => self.formats = Some(formats),
        }
    }

    /// Applies a partial update in order
    pub fn merge<I>(&mut self, update: I)
    where
        I: IntoIterator<Item = PageField>,
    {
        for field in update {
            self.apply(field);
        }
    }

    /// Output formats to request, honoring the html/links checkboxes
    pub fn effective_formats(&self, default: &[&str]) -> Vec<String> {
        let mut formats = self
            .formats
            .clone()
            .unwrap_or_else(|| default.iter().map(|f| f.to_string()).collect());

        if self.include_html == Some(true) && !formats.iter().any(|f| f == "html") {
            formats.push("html".to_string());
        }
        if self.include_links == Some(true) && !formats.iter().any(|f| f == "links") {
            formats.push("links".to_string());
        }

        formats
    }
}

impl FromStr for PageField {
    type Err = OptionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (key, value) = split_assignment(input)?;

        let field = match key.as_str() {
            "excludetags" => PageField::ExcludeTags(parse_list(value)),
            "includetags" => PageField::IncludeTags(parse_list(value)),
            "waitfor" => PageField::WaitFor(parse_number(&key, value)?),
            "onlymaincontent" => PageField::OnlyMainContent(parse_bool(&key, value)?),
            "includehtml" => PageField::IncludeHtml(parse_bool(&key, value)?),
            "includelinks" => PageField::IncludeLinks(parse_bool(&key, value)?),
            "formats" => PageField::Formats(parse_list(value)),
            other => return Err(OptionError::UnknownKey(other.to_string())),
        };

        Ok(field)
    }
}
