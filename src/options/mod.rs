//! Option panels for scrape and crawl requests
//!
//! Each panel owns a subset of request options. A panel change is reported
//! as a partial update (a list of fields the user touched) and the owner
//! applies it field by field, last write wins per key. Fields can be parsed
//! from `key=value` text so command-line flags map directly onto updates.

mod crawl;
mod page;

pub use crawl::{CrawlField, CrawlOptions};
pub use page::{PageField, PageOptions};

use thiserror::Error;

/// Errors produced while parsing an option assignment
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionError {
    #[error("expected key=value, got '{0}'")]
    MissingSeparator(String),

    #[error("unknown option '{0}'")]
    UnknownKey(String),

    #[error("invalid value '{value}' for option '{key}'")]
    InvalidValue { key: String, value: String },
}

/// Splits a `key=value` assignment and canonicalizes the key
///
/// Keys are matched case-insensitively with `-` and `_` ignored, so
/// `onlyMainContent`, `only-main-content` and `only_main_content` are the
/// same field.
pub(crate) fn split_assignment(input: &str) -> Result<(String, &str), OptionError> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| OptionError::MissingSeparator(input.to_string()))?;

    let canonical: String = key
        .trim()
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect();

    Ok((canonical, value.trim()))
}

/// Parses a numeric input; an empty value clears the field
pub(crate) fn parse_number<T: std::str::FromStr>(
    key: &str,
    value: &str,
) -> Result<Option<T>, OptionError> {
    if value.is_empty() {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|_| OptionError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Parses a checkbox-style input
pub(crate) fn parse_bool(key: &str, value: &str) -> Result<bool, OptionError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(OptionError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Splits a comma-separated list such as `script, .ad, #footer`
pub(crate) fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
