//! Store trait and error types

use crate::store::{ContentRow, MetadataRow, NewDocument};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The remote backend answered with a non-2xx status
    #[error("{message} (status {status})")]
    Remote { status: u16, message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP client error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The document has no source URL to key it by
    #[error("Document has no source URL")]
    MissingUrl,

    #[error("Upsert of {0} returned no document id")]
    MissingId(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for relational backends that receive persisted documents
///
/// Implementations must tolerate concurrent calls: the persistence routine
/// issues the two deletes together and then the two inserts together.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts or updates the document row keyed by its URL
    ///
    /// # Returns
    ///
    /// The document id, whether the row was created or updated
    async fn upsert_document(&self, document: &NewDocument) -> StoreResult<i64>;

    /// Removes every content row of a document
    async fn delete_contents(&self, document_id: i64) -> StoreResult<()>;

    /// Removes every metadata row of a document
    async fn delete_metadata(&self, document_id: i64) -> StoreResult<()>;

    async fn insert_contents(&self, rows: &[ContentRow]) -> StoreResult<()>;

    async fn insert_metadata(&self, rows: &[MetadataRow]) -> StoreResult<()>;
}
