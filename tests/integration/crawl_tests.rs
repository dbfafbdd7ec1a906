use crate::common::{client_for, fast_polling, Sequence};
use firestash::api::ApiError;
use firestash::options::{CrawlField, PageField};
use firestash::store::SqliteStore;
use firestash::{CrawlFlow, FirestashError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_job_created(server: &MockServer, id: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/crawl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "id": id})))
        .expect(1)
        .mount(server)
        .await;
}

fn crawled_pages() -> serde_json::Value {
    json!([
        {
            "markdown": "# Home",
            "metadata": {
                "title": "Home",
                "description": "Landing page",
                "sourceURL": "https://www.example.com/",
                "statusCode": 200
            }
        },
        {
            "markdown": "# Blog",
            "html": "<h1>Blog</h1>",
            "metadata": {
                "title": "Blog",
                "sourceURL": "https://www.example.com/blog",
                "statusCode": 200,
                "ogLocale": "en_US"
            }
        }
    ])
}

#[tokio::test]
async fn test_crawl_polls_until_completed() {
    let server = MockServer::start().await;
    mount_job_created(&server, "job-42").await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-42"))
        .respond_with(Sequence::new(vec![
            json!({"status": "pending"}),
            json!({"status": "scraping"}),
            json!({"status": "completed", "data": crawled_pages()}),
        ]))
        .expect(3)
        .mount(&server)
        .await;

    let mut flow = CrawlFlow::new(client_for(&server), fast_polling(30));
    let documents = flow.submit("https://www.example.com").await.unwrap();

    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].metadata.title(), Some("Home"));
    assert_eq!(documents[1].metadata.title(), Some("Blog"));
    assert_eq!(flow.job_id(), Some("job-42"));
    assert!(flow.error().is_none());
}

#[tokio::test]
async fn test_crawl_sends_merged_options() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/crawl"))
        .and(body_partial_json(json!({
            "url": "https://example.com",
            "limit": 3,
            "ignoreSitemap": false,
            "allowBackwardLinks": false,
            "origin": "website",
            "scrapeOptions": {
                "formats": ["markdown", "html"],
                "onlyMainContent": true,
                "excludeTags": ["nav", "footer"]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "id": "j"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/j"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "completed", "data": []})))
        .mount(&server)
        .await;

    let mut flow = CrawlFlow::new(client_for(&server), fast_polling(30));
    flow.update_crawl_options(vec![CrawlField::Limit(Some(3))]);
    flow.update_crawl_options(vec![CrawlField::AllowBackwardLinks(false)]);
    flow.update_page_options(vec![
        PageField::IncludeHtml(true),
        PageField::ExcludeTags(vec!["nav".to_string(), "footer".to_string()]),
    ]);

    let documents = flow.submit("https://example.com").await.unwrap();
    assert!(documents.is_empty());
}

#[tokio::test]
async fn test_crawl_job_failure_is_reported() {
    let server = MockServer::start().await;
    mount_job_created(&server, "job-f").await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-f"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "failed", "error": "robots.txt disallows"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut flow = CrawlFlow::new(client_for(&server), fast_polling(30));
    let err = flow.submit("https://example.com").await.unwrap_err();

    assert!(matches!(err, FirestashError::Api(ApiError::JobFailed(_))));
    assert_eq!(err.to_string(), "Job failed: robots.txt disallows");
    assert_eq!(flow.error(), Some("Job failed: robots.txt disallows"));
    assert!(flow.results().is_empty());
}

#[tokio::test]
async fn test_crawl_times_out_after_attempt_budget() {
    let server = MockServer::start().await;
    mount_job_created(&server, "job-slow").await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-slow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "pending"})))
        .expect(4)
        .mount(&server)
        .await;

    let mut flow = CrawlFlow::new(client_for(&server), fast_polling(4));
    let err = flow.submit("https://example.com").await.unwrap_err();

    assert!(matches!(
        err,
        FirestashError::Api(ApiError::Timeout { attempts: 4 })
    ));
    assert!(flow.error().unwrap().contains("Timeout"));
}

#[tokio::test]
async fn test_crawl_status_http_error_stops_polling() {
    let server = MockServer::start().await;
    mount_job_created(&server, "job-e").await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-e"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let mut flow = CrawlFlow::new(client_for(&server), fast_polling(30));
    let err = flow.submit("https://example.com").await.unwrap_err();

    assert_eq!(err.to_string(), "HTTP error! status: 500");
}

#[tokio::test]
async fn test_crawl_results_can_be_saved_and_exported() {
    let server = MockServer::start().await;
    mount_job_created(&server, "job-s").await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-s"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "completed", "data": crawled_pages()})),
        )
        .mount(&server)
        .await;

    let mut flow = CrawlFlow::new(client_for(&server), fast_polling(30));
    flow.submit("https://www.example.com").await.unwrap();

    let store = SqliteStore::open_in_memory().unwrap();
    let report = flow.save(&store).await.unwrap();
    assert_eq!(report.len(), 2);
    assert_eq!(report.stored(), 2);

    let blog = store
        .find_document("https://www.example.com/blog")
        .unwrap()
        .unwrap();
    assert_eq!(blog.title.as_deref(), Some("Blog"));
    assert_eq!(store.get_contents(blog.id).unwrap().len(), 2);
    let metadata = store.get_metadata(blog.id).unwrap();
    assert_eq!(metadata.len(), 1);
    assert_eq!(metadata[0].key, "ogLocale");

    let dir = tempfile::tempdir().unwrap();
    let path = flow.download(dir.path()).unwrap().unwrap();
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("example.com-"));

    let exported: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(exported.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_repeated_meta_tags_do_not_lose_the_batch() {
    let server = MockServer::start().await;
    mount_job_created(&server, "job-m").await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-m"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "data": [
                {"markdown": "# One", "metadata": {"title": "One", "sourceURL": "https://a.test/1"}},
                {
                    "markdown": "# Two",
                    "metadata": {
                        "sourceURL": "https://a.test/2",
                        "description": ["first meta", "second meta"]
                    }
                }
            ]
        })))
        .mount(&server)
        .await;

    let mut flow = CrawlFlow::new(client_for(&server), fast_polling(3));
    let documents = flow.submit("https://a.test").await.unwrap();
    assert_eq!(documents.len(), 2);

    let store = SqliteStore::open_in_memory().unwrap();
    let report = flow.save(&store).await.unwrap();
    assert_eq!(report.stored(), 2);

    let second = store.find_document("https://a.test/2").unwrap().unwrap();
    assert_eq!(second.description, None);
    let metadata = store.get_metadata(second.id).unwrap();
    assert!(metadata
        .iter()
        .any(|row| row.key == "description" && row.value == r#"["first meta","second meta"]"#));
}

#[tokio::test]
async fn test_empty_flow_has_nothing_to_save_or_export() {
    let server = MockServer::start().await;
    let flow = CrawlFlow::new(client_for(&server), fast_polling(30));

    let store = SqliteStore::open_in_memory().unwrap();
    assert!(flow.save(&store).await.is_none());

    let dir = tempfile::tempdir().unwrap();
    assert!(flow.download(dir.path()).unwrap().is_none());
}

#[tokio::test]
async fn test_invalid_url_never_reaches_service() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut flow = CrawlFlow::new(client_for(&server), fast_polling(30));
    let err = flow.submit("   ").await.unwrap_err();

    assert!(matches!(err, FirestashError::InvalidUrl(_)));
    assert!(flow.error().is_some());
}
