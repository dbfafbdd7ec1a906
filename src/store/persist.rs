//! Replace-on-write persistence of documents
//!
//! Each document is stored independently: upsert the document row by URL,
//! drop its existing contents and metadata, then insert fresh rows. A
//! failure affects only that document's entry in the report.

use crate::api::{Document, DocumentMetadata};
use crate::store::traits::{DocumentStore, StoreResult};
use crate::store::{ContentFormat, ContentRow, MetadataRow, NewDocument, PersistOutcome, PersistReport};
use serde_json::Value;

/// Metadata keys stored as `documents` columns rather than metadata rows
const PROMOTED_KEYS: &[&str] = &["title", "description", "language", "sourceURL", "statusCode"];

/// Persists a batch of documents, one after another
///
/// Never fails as a whole; every input gets exactly one outcome, in input
/// order.
pub async fn persist_documents<S>(store: &S, documents: &[Document]) -> PersistReport
where
    S: DocumentStore + ?Sized,
{
    let mut report = PersistReport::default();

    for document in documents {
        let url = document.metadata.source_url.clone();

        let outcome = match persist_document(store, document).await {
            Ok(document_id) => PersistOutcome::Stored {
                document_id,
                url: url.unwrap_or_default(),
            },
            Err(error) => {
                tracing::warn!(
                    "Failed to persist {}: {}",
                    url.as_deref().unwrap_or("<no url>"),
                    error
                );
                PersistOutcome::Failed { url, error }
            }
        };

        report.outcomes.push(outcome);
    }

    tracing::info!(
        "Persisted {} of {} documents",
        report.stored(),
        report.len()
    );

    report
}

/// Replaces the stored rows of one document and returns its id
pub async fn persist_document<S>(store: &S, document: &Document) -> StoreResult<i64>
where
    S: DocumentStore + ?Sized,
{
    let row = NewDocument::from_metadata(&document.metadata)?;
    let document_id = store.upsert_document(&row).await?;
    tracing::debug!("Upserted {} as document {}", row.url, document_id);

    futures::try_join!(
        store.delete_contents(document_id),
        store.delete_metadata(document_id)
    )?;

    let contents = content_rows(document_id, document);
    let metadata = metadata_rows(document_id, &document.metadata)?;

    futures::try_join!(
        async {
            if contents.is_empty() {
                Ok(())
            } else {
                store.insert_contents(&contents).await
            }
        },
        async {
            if metadata.is_empty() {
                Ok(())
            } else {
                store.insert_metadata(&metadata).await
            }
        }
    )?;

    Ok(document_id)
}

/// One content row per non-empty markdown/html body
pub fn content_rows(document_id: i64, document: &Document) -> Vec<ContentRow> {
    [
        (ContentFormat::Markdown, &document.markdown),
        (ContentFormat::Html, &document.html),
    ]
    .into_iter()
    .filter_map(|(format, body)| {
        body.as_ref()
            .filter(|b| !b.is_empty())
            .map(|content| ContentRow {
                document_id,
                format,
                content: content.clone(),
            })
    })
    .collect()
}

/// One metadata row per key that is not a document column
///
/// String values are stored as-is, everything else JSON-encoded. A promoted
/// key whose value could not fill its column (a repeated meta tag arrives as
/// an array) is kept as a metadata row.
pub fn metadata_rows(document_id: i64, metadata: &DocumentMetadata) -> StoreResult<Vec<MetadataRow>> {
    let Value::Object(map) = serde_json::to_value(metadata)? else {
        return Ok(Vec::new());
    };

    let rows = map
        .into_iter()
        .filter(|(key, value)| !(PROMOTED_KEYS.contains(&key.as_str()) && is_scalar(value)))
        .map(|(key, value)| MetadataRow {
            document_id,
            key,
            value: match value {
                Value::String(s) => s,
                other => other.to_string(),
            },
        })
        .collect();

    Ok(rows)
}

fn is_scalar(value: &Value) -> bool {
    value.is_string() || value.is_number()
}
