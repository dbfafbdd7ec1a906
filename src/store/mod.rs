//! Persistence of scraped documents into a relational store
//!
//! This module handles:
//! - The row types of the `documents`, `document_contents` and
//!   `document_metadata` tables
//! - A REST (PostgREST/Supabase) backend and a local SQLite backend
//! - The per-document replace routine and its batch report

mod persist;
mod rest;
mod schema;
mod sqlite;
mod traits;

pub use persist::{content_rows, metadata_rows, persist_document, persist_documents};
pub use rest::RestStore;
pub use sqlite::{SqliteStore, StoredDocument};
pub use traits::{DocumentStore, StoreError, StoreResult};

use crate::api::DocumentMetadata;
use crate::config::{StoreBackend, StoreConfig};
use serde::Serialize;
use std::path::Path;

/// Opens the backend selected in the configuration
pub fn open_store(config: &StoreConfig) -> StoreResult<Box<dyn DocumentStore>> {
    match config.backend {
        StoreBackend::Rest => {
            let url = config.rest_url.as_deref().unwrap_or_default();
            let key = config.rest_key.as_deref().unwrap_or_default();
            Ok(Box::new(RestStore::new(url, key)?))
        }
        StoreBackend::Sqlite => Ok(Box::new(SqliteStore::open(Path::new(&config.sqlite_path))?)),
    }
}

/// A `documents` row to upsert
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDocument {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl NewDocument {
    /// Promotes the first-class metadata fields to document columns
    pub fn from_metadata(metadata: &DocumentMetadata) -> StoreResult<Self> {
        let url = metadata
            .source_url
            .clone()
            .filter(|u| !u.is_empty())
            .ok_or(StoreError::MissingUrl)?;

        Ok(Self {
            source_url: Some(url.clone()),
            url,
            title: metadata.title().map(str::to_string),
            description: metadata.description().map(str::to_string),
            language: metadata.language().map(str::to_string),
            status_code: metadata.http_status(),
        })
    }
}

/// Format tag of a content row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    Markdown,
    Html,
}

impl ContentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "markdown" => Some(Self::Markdown),
            "html" => Some(Self::Html),
            _ => None,
        }
    }
}

/// A `document_contents` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentRow {
    pub document_id: i64,
    pub format: ContentFormat,
    pub content: String,
}

/// A `document_metadata` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataRow {
    pub document_id: i64,
    pub key: String,
    pub value: String,
}

/// Result of persisting one document
#[derive(Debug)]
pub enum PersistOutcome {
    Stored {
        document_id: i64,
        url: String,
    },
    Failed {
        url: Option<String>,
        error: StoreError,
    },
}

impl PersistOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Stored { .. })
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Stored { url, .. } => Some(url),
            Self::Failed { url, .. } => url.as_deref(),
        }
    }
}

/// Per-document outcomes of a batch, in input order
#[derive(Debug, Default)]
pub struct PersistReport {
    pub outcomes: Vec<PersistOutcome>,
}

impl PersistReport {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn stored(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.stored()
    }

    pub fn failures(&self) -> impl Iterator<Item = &PersistOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}
