//! PostgREST document store (Supabase REST endpoint)
//!
//! Tables are addressed as `{project}/rest/v1/{table}`. The upsert relies on
//! the unique constraint on `documents.url` via `on_conflict=url`.

use crate::store::traits::{DocumentStore, StoreError, StoreResult};
use crate::store::{ContentRow, MetadataRow, NewDocument};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use std::time::Duration;

/// REST storage backend
#[derive(Debug, Clone)]
pub struct RestStore {
    http: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct UpsertedRow {
    id: i64,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl RestStore {
    /// Creates a store for the given project URL and key
    pub fn new(project_url: &str, api_key: &str) -> StoreResult<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self::with_client(http, project_url, api_key))
    }

    pub fn with_client(http: Client, project_url: &str, api_key: &str) -> Self {
        Self {
            http,
            base_url: format!("{}/rest/v1", project_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        }
    }

    fn table(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn delete_by_document(&self, table: &str, document_id: i64) -> StoreResult<()> {
        let response = self
            .authorize(self.http.delete(self.table(table)))
            .query(&[("document_id", format!("eq.{}", document_id))])
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn insert_rows<T: serde::Serialize + Sync>(&self, table: &str, rows: &[T]) -> StoreResult<()> {
        let response = self
            .authorize(self.http.post(self.table(table)))
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for RestStore {
    async fn upsert_document(&self, document: &NewDocument) -> StoreResult<i64> {
        let response = self
            .authorize(self.http.post(self.table("documents")))
            .query(&[("on_conflict", "url")])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(document)
            .send()
            .await?;

        let bytes = check_status(response).await?.bytes().await?;
        let rows: Vec<UpsertedRow> = serde_json::from_slice(&bytes)?;

        rows.first()
            .map(|row| row.id)
            .ok_or_else(|| StoreError::MissingId(document.url.clone()))
    }

    async fn delete_contents(&self, document_id: i64) -> StoreResult<()> {
        self.delete_by_document("document_contents", document_id).await
    }

    async fn delete_metadata(&self, document_id: i64) -> StoreResult<()> {
        self.delete_by_document("document_metadata", document_id).await
    }

    async fn insert_contents(&self, rows: &[ContentRow]) -> StoreResult<()> {
        self.insert_rows("document_contents", rows).await
    }

    async fn insert_metadata(&self, rows: &[MetadataRow]) -> StoreResult<()> {
        self.insert_rows("document_metadata", rows).await
    }
}

async fn check_status(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    let message = body
        .message
        .or(body.error)
        .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));

    Err(StoreError::Remote {
        status: status.as_u16(),
        message,
    })
}
