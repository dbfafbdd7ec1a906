//! SQLite document store
//!
//! A local stand-in for the hosted schema. The connection sits behind a
//! mutex; every operation is a short synchronous statement.

use crate::store::schema::initialize_schema;
use crate::store::traits::{DocumentStore, StoreError, StoreResult};
use crate::store::{ContentFormat, ContentRow, MetadataRow, NewDocument};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite storage backend
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

/// A `documents` row as read back from SQLite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub id: i64,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub source_url: Option<String>,
    pub status_code: Option<u16>,
}

impl SqliteStore {
    /// Opens or creates the database file and initializes the schema
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;
        tracing::debug!("Opened SQLite store at {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("connection mutex poisoned".to_string()))
    }

    /// Looks a document up by its URL
    pub fn find_document(&self, url: &str) -> StoreResult<Option<StoredDocument>> {
        let conn = self.conn()?;
        let document = conn
            .query_row(
                "SELECT id, url, title, description, language, source_url, status_code
                 FROM documents WHERE url = ?1",
                params![url],
                |row| {
                    Ok(StoredDocument {
                        id: row.get(0)?,
                        url: row.get(1)?,
                        title: row.get(2)?,
                        description: row.get(3)?,
                        language: row.get(4)?,
                        source_url: row.get(5)?,
                        status_code: row.get(6)?,
                    })
                },
            )
            .optional()?;
        Ok(document)
    }

    /// Gets all content rows of a document, in insertion order
    pub fn get_contents(&self, document_id: i64) -> StoreResult<Vec<ContentRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT format, content FROM document_contents WHERE document_id = ?1 ORDER BY id",
        )?;

        let rows = stmt
            .query_map(params![document_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(format, content)| {
                let format = ContentFormat::from_db_string(&format)
                    .ok_or_else(|| StoreError::Database(format!("unknown content format '{}'", format)))?;
                Ok(ContentRow {
                    document_id,
                    format,
                    content,
                })
            })
            .collect()
    }

    /// Gets all metadata rows of a document, in insertion order
    pub fn get_metadata(&self, document_id: i64) -> StoreResult<Vec<MetadataRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT key, value FROM document_metadata WHERE document_id = ?1 ORDER BY id",
        )?;

        let rows = stmt
            .query_map(params![document_id], |row| {
                Ok(MetadataRow {
                    document_id,
                    key: row.get(0)?,
                    value: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Counts stored documents
    pub fn count_documents(&self) -> StoreResult<u64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn upsert_document(&self, document: &NewDocument) -> StoreResult<i64> {
        let now = Utc::now().to_rfc3339();
        let conn = self.conn()?;

        // Absent fields keep the stored value, matching a REST merge upsert
        let id = conn.query_row(
            "INSERT INTO documents
                (url, title, description, language, source_url, status_code, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
             ON CONFLICT(url) DO UPDATE SET
                title = COALESCE(excluded.title, title),
                description = COALESCE(excluded.description, description),
                language = COALESCE(excluded.language, language),
                source_url = COALESCE(excluded.source_url, source_url),
                status_code = COALESCE(excluded.status_code, status_code),
                updated_at = excluded.updated_at
             RETURNING id",
            params![
                document.url,
                document.title,
                document.description,
                document.language,
                document.source_url,
                document.status_code,
                now
            ],
            |row| row.get(0),
        )?;

        Ok(id)
    }

    async fn delete_contents(&self, document_id: i64) -> StoreResult<()> {
        self.conn()?.execute(
            "DELETE FROM document_contents WHERE document_id = ?1",
            params![document_id],
        )?;
        Ok(())
    }

    async fn delete_metadata(&self, document_id: i64) -> StoreResult<()> {
        self.conn()?.execute(
            "DELETE FROM document_metadata WHERE document_id = ?1",
            params![document_id],
        )?;
        Ok(())
    }

    async fn insert_contents(&self, rows: &[ContentRow]) -> StoreResult<()> {
        let now = Utc::now().to_rfc3339();
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO document_contents (document_id, format, content, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for row in rows {
                stmt.execute(params![row.document_id, row.format.as_str(), row.content, now])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    async fn insert_metadata(&self, rows: &[MetadataRow]) -> StoreResult<()> {
        let now = Utc::now().to_rfc3339();
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO document_metadata (document_id, key, value, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for row in rows {
                stmt.execute(params![row.document_id, row.key, row.value, now])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Document;
    use crate::store::{persist_documents, PersistOutcome};
    use serde_json::json;

    fn document(value: serde_json::Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_returns_same_id_for_same_url() {
        let store = SqliteStore::open_in_memory().unwrap();
        let row = NewDocument {
            url: "https://a.test".to_string(),
            title: Some("First".to_string()),
            description: None,
            language: None,
            source_url: Some("https://a.test".to_string()),
            status_code: Some(200),
        };

        let first = store.upsert_document(&row).await.unwrap();
        let second = store
            .upsert_document(&NewDocument {
                title: Some("Second".to_string()),
                ..row.clone()
            })
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(store.count_documents().unwrap(), 1);
        let stored = store.find_document("https://a.test").unwrap().unwrap();
        assert_eq!(stored.title.as_deref(), Some("Second"));
        assert_eq!(stored.status_code, Some(200));
    }

    #[tokio::test]
    async fn test_persist_replaces_contents() {
        let store = SqliteStore::open_in_memory().unwrap();

        let first = document(json!({
            "markdown": "# v1",
            "html": "<h1>v1</h1>",
            "metadata": {"sourceURL": "https://a.test/page", "ogTitle": "one", "robots": "index"}
        }));
        let second = document(json!({
            "markdown": "# v2",
            "metadata": {"sourceURL": "https://a.test/page", "ogTitle": "two"}
        }));

        let report = persist_documents(&store, &[first]).await;
        assert_eq!(report.stored(), 1);
        let report = persist_documents(&store, &[second]).await;
        assert_eq!(report.stored(), 1);

        let id = match &report.outcomes[0] {
            PersistOutcome::Stored { document_id, .. } => *document_id,
            other => panic!("unexpected outcome {:?}", other),
        };

        let contents = store.get_contents(id).unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].format, ContentFormat::Markdown);
        assert_eq!(contents[0].content, "# v2");

        let metadata = store.get_metadata(id).unwrap();
        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata[0].key, "ogTitle");
        assert_eq!(metadata[0].value, "two");
    }

    #[tokio::test]
    async fn test_persist_same_content_converges() {
        let store = SqliteStore::open_in_memory().unwrap();
        let doc = document(json!({
            "markdown": "# same",
            "metadata": {"sourceURL": "https://a.test", "title": "Same"}
        }));

        persist_documents(&store, &[doc.clone()]).await;
        persist_documents(&store, &[doc]).await;

        let stored = store.find_document("https://a.test").unwrap().unwrap();
        assert_eq!(store.count_documents().unwrap(), 1);
        assert_eq!(store.get_contents(stored.id).unwrap().len(), 1);
        assert!(store.get_metadata(stored.id).unwrap().is_empty());
    }

    #[test]
    fn test_open_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.count_documents().unwrap(), 0);
        assert!(path.exists());
    }
}
