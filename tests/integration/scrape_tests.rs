use crate::common::client_for;
use firestash::options::PageField;
use firestash::store::SqliteStore;
use firestash::{FirestashError, ScrapeFlow};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn scrape_body() -> serde_json::Value {
    json!({
        "success": true,
        "data": {
            "markdown": "# Docs",
            "html": "<h1>Docs</h1>",
            "rawHtml": "<html><h1>Docs</h1></html>",
            "metadata": {
                "title": "Docs",
                "description": "Documentation",
                "language": "en",
                "sourceURL": "https://docs.example.com/guide/",
                "pageStatusCode": 200
            }
        }
    })
}

#[tokio::test]
async fn test_scrape_with_defaults() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(body_json(json!({
            "url": "https://docs.example.com/guide/",
            "onlyMainContent": true,
            "formats": ["markdown", "html", "rawHtml"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(scrape_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut flow = ScrapeFlow::new(client_for(&server));
    let result = flow.submit("https://docs.example.com/guide/").await.unwrap();

    assert!(result.success);
    assert_eq!(result.data.metadata.language(), Some("en"));
    assert!(flow.result().is_some());
}

#[tokio::test]
async fn test_scrape_forwards_panel_updates() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(body_json(json!({
            "url": "https://docs.example.com/guide/",
            "onlyMainContent": false,
            "includeTags": ["article"],
            "formats": ["markdown", "html", "rawHtml"],
            "waitFor": 1000
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(scrape_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut flow = ScrapeFlow::new(client_for(&server));
    flow.update_page_options(vec![PageField::OnlyMainContent(false)]);
    flow.update_page_options(vec![
        "includeTags=article".parse::<PageField>().unwrap(),
        "waitFor=1000".parse::<PageField>().unwrap(),
    ]);

    flow.submit("https://docs.example.com/guide/").await.unwrap();
}

#[tokio::test]
async fn test_scrape_error_clears_previous_result() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(scrape_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"error": "Rate limit exceeded"})))
        .mount(&server)
        .await;

    let mut flow = ScrapeFlow::new(client_for(&server));
    flow.submit("https://docs.example.com/guide/").await.unwrap();

    let err = flow.submit("https://docs.example.com/guide/").await.unwrap_err();
    assert_eq!(err.to_string(), "Rate limit exceeded");
    assert_eq!(flow.error(), Some("Rate limit exceeded"));
    assert!(flow.result().is_none());
}

#[tokio::test]
async fn test_scrape_result_saved_and_exported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(scrape_body()))
        .mount(&server)
        .await;

    let mut flow = ScrapeFlow::new(client_for(&server));
    flow.submit("docs.example.com/guide/").await.unwrap();

    let store = SqliteStore::open_in_memory().unwrap();
    let report = flow.save(&store).await.unwrap();
    assert_eq!(report.stored(), 1);

    let stored = store
        .find_document("https://docs.example.com/guide/")
        .unwrap()
        .unwrap();
    assert_eq!(stored.status_code, Some(200));
    assert_eq!(stored.language.as_deref(), Some("en"));

    let dir = tempfile::tempdir().unwrap();
    let path = flow.download(dir.path()).unwrap().unwrap();
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("docs.example.com-guide-"));
}

#[tokio::test]
async fn test_scrape_export_failure_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(scrape_body()))
        .mount(&server)
        .await;

    let mut flow = ScrapeFlow::new(client_for(&server));
    flow.submit("https://docs.example.com/guide/").await.unwrap();

    // A regular file where the export directory should be
    let blocker = tempfile::NamedTempFile::new().unwrap();
    let err = flow.download(blocker.path()).unwrap_err();
    assert!(matches!(err, FirestashError::Output(_)));
    assert!(err.to_string().starts_with("Export failed: "));
}
