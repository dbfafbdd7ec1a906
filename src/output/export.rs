//! JSON export of results

use crate::output::OutputResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use url::Url;

/// Base name used when no usable source URL is available
pub const FALLBACK_FILENAME: &str = "firecrawl-result";

/// Longest base name kept, leaving room for the timestamp within the
/// usual 255-byte file name limit
pub const MAX_BASE_LEN: usize = 200;

/// Derives a file base name from a source URL
///
/// Hostname without a leading `www.`, followed by the path without one
/// trailing `/`. Characters other than ASCII letters, digits and `.` become
/// `-`. `https://www.example.com/blog/` yields `example.com-blog`. The
/// result is cut to [`MAX_BASE_LEN`] characters.
pub fn filename_base(url: Option<&str>) -> String {
    let Some(parsed) = url.and_then(|u| Url::parse(u).ok()) else {
        return FALLBACK_FILENAME.to_string();
    };

    let host = parsed.host_str().unwrap_or("");
    let host = host.strip_prefix("www.").unwrap_or(host);
    let path = parsed.path();
    let path = path.strip_suffix('/').unwrap_or(path);

    let mut sanitized: String = format!("{}{}", host, path)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' {
                c
            } else {
                '-'
            }
        })
        .collect();
    // Only ASCII is left, so any byte index is a char boundary
    sanitized.truncate(MAX_BASE_LEN);

    if sanitized.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        sanitized
    }
}

/// Full export file name: `<base>-<timestamp>.json`
pub fn export_filename(url: Option<&str>, at: DateTime<Utc>) -> String {
    let timestamp = at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();
    let timestamp = if cfg!(windows) {
        timestamp.replace(':', "-")
    } else {
        timestamp
    };

    format!("{}-{}.json", filename_base(url), timestamp)
}

/// Writes `data` as pretty-printed JSON into `directory`
///
/// # Returns
///
/// The path of the written file
pub fn export_json<T>(data: &T, source_url: Option<&str>, directory: &Path) -> OutputResult<PathBuf>
where
    T: Serialize + ?Sized,
{
    let path = directory.join(export_filename(source_url, Utc::now()));
    let json = serde_json::to_string_pretty(data)?;

    std::fs::create_dir_all(directory)?;
    let mut file = File::create(&path)?;
    file.write_all(json.as_bytes())?;

    tracing::info!("Exported results to {}", path.display());
    Ok(path)
}
