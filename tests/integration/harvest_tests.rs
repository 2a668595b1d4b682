//! Integration tests for the harvester
//!
//! These tests use wiremock to create mock HTTP servers and run the
//! full listing and article traversals end-to-end against temp files.

use comment_harvester::config::{Config, CrawlerConfig, HttpConfig, OutputConfig, SiteConfig};
use comment_harvester::crawler::{Harvester, Phase};
use comment_harvester::output::read_article_index;
use comment_harvester::{ErrorKind, HarvestError};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with no pauses and no retries
fn create_test_config(base_url: &str, dir: &Path, page_end: u32) -> Config {
    Config {
        site: SiteConfig {
            base_url: base_url.to_string(),
            listing_path: "/news.php?page=".to_string(),
        },
        crawler: CrawlerConfig {
            page_start: 1,
            page_end,
            comment_threshold: 5,
            min_page_delay: 0,
            max_page_delay: 0,
            max_retries: 0,
            ..CrawlerConfig::default()
        },
        http: HttpConfig::default(),
        output: OutputConfig {
            progress_path: dir.join("progress.json").display().to_string(),
            article_index_path: dir.join("output/article_list.csv").display().to_string(),
            comments_path: dir.join("output/comment_list.csv").display().to_string(),
        },
    }
}

fn comment(author: &str, text: &str) -> String {
    format!(
        r#"<div class="commen_cont">
            <div class="comment_user">{}</div>
            <span class="comments-grade comments-grades-up">4</span>
            <span class="comments-grade comments-grades-down">1</span>
            <div class="comment_text">{}</div>
        </div>"#,
        author, text
    )
}

fn comment_link(id: u32, hint: u32) -> String {
    format!(
        r##"<a class="com" href="/bg/world/story.{}#comments">{}</a>"##,
        id, hint
    )
}

async fn mount_listing(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path("/news.php"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, page_path: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

fn checkpoint(dir: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(dir.join("progress.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

fn comment_rows(dir: &Path) -> Vec<String> {
    let path: PathBuf = dir.join("output/comment_list.csv");
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .skip(1)
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_end_to_end_single_page_article() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        1,
        format!("<body>{}{}</body>", comment_link(100, 3), comment_link(200, 7)),
    )
    .await;
    mount_page(
        &server,
        "/bg/world/story.200",
        200,
        format!(
            "<body>{}{}</body>",
            comment("Ivan, Petrov\n", "First!"),
            comment(
                "Maria",
                "Agreed. Сигнализирахте за неуместен коментар"
            )
        ),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 1);

    let mut harvester = Harvester::new(config.clone()).unwrap();
    let report = harvester.run(Phase::All).await.unwrap();

    // Only the article above the threshold is indexed
    let index = read_article_index(&dir.path().join("output/article_list.csv")).unwrap();
    assert_eq!(index.len(), 1);
    assert_eq!(index[0].id, "200");
    assert_eq!(index[0].url, "/bg/world/story.200#comments");

    // One listing page plus one article page
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
    assert_eq!(report.articles.map(|a| a.comments), Some(2));

    let rows = comment_rows(dir.path());
    assert_eq!(rows, vec![
        r#""Ivan","4","1","First!""#.to_string(),
        r#""Maria","4","1","Agreed.""#.to_string(),
    ]);

    let state = checkpoint(dir.path());
    assert_eq!(state["last_page"], 1);
    assert_eq!(state["article_ids"], serde_json::json!(["200"]));

    // Repeating the article phase fetches nothing
    let mut rerun = Harvester::new(config).unwrap();
    let report = rerun.run(Phase::Comments).await.unwrap();
    assert_eq!(report.articles.map(|a| a.skipped), Some(1));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
    assert_eq!(comment_rows(dir.path()).len(), 2);
}

#[tokio::test]
async fn test_full_rerun_only_revisits_last_listing_page() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, format!("<body>{}</body>", comment_link(200, 9))).await;
    mount_page(
        &server,
        "/bg/world/story.200",
        200,
        format!("<body>{}</body>", comment("Ivan", "hi")),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 1);

    Harvester::new(config.clone())
        .unwrap()
        .run(Phase::All)
        .await
        .unwrap();
    assert_eq!(server.received_requests().await.unwrap().len(), 2);

    let report = Harvester::new(config)
        .unwrap()
        .run(Phase::All)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[2].url.path(), "/news.php");
    assert_eq!(report.listing.map(|l| l.indexed), Some(0));
    assert_eq!(report.articles.map(|a| a.skipped), Some(1));
    assert_eq!(comment_rows(dir.path()).len(), 1);
}

#[tokio::test]
async fn test_resume_after_listing_phase() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, format!("<body>{}</body>", comment_link(11, 6))).await;
    mount_listing(&server, 2, "<body><p>Quiet day</p></body>".to_string()).await;
    mount_listing(&server, 3, format!("<body>{}</body>", comment_link(33, 12))).await;
    mount_page(
        &server,
        "/bg/world/story.11",
        200,
        format!("<body>{}</body>", comment("A", "one")),
    )
    .await;
    mount_page(
        &server,
        "/bg/world/story.33",
        200,
        format!("<body>{}</body>", comment("B", "two")),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 3);

    let report = Harvester::new(config.clone())
        .unwrap()
        .run(Phase::Listing)
        .await
        .unwrap();

    // The empty page still advances the cursor
    assert_eq!(report.listing.map(|l| l.pages), Some(3));
    assert_eq!(checkpoint(dir.path())["last_page"], 3);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);

    let report = Harvester::new(config)
        .unwrap()
        .run(Phase::Comments)
        .await
        .unwrap();

    assert_eq!(report.articles.map(|a| a.harvested), Some(2));
    assert_eq!(
        checkpoint(dir.path())["article_ids"],
        serde_json::json!(["11", "33"])
    );
    assert_eq!(comment_rows(dir.path()).len(), 2);
}

#[tokio::test]
async fn test_failed_comment_page_is_retried_from_page_one() {
    let server = MockServer::start().await;
    let pagination = r#"<div class="comments-pagging"><a>1</a><a>2</a><a>Next</a></div>"#;

    mount_listing(&server, 1, format!("<body>{}</body>", comment_link(500, 40))).await;
    mount_page(
        &server,
        "/bg/world/story.500",
        200,
        format!("<body>{}</body>", pagination),
    )
    .await;
    mount_page(
        &server,
        "/bg/world/story.500,1",
        200,
        format!("<body>{}</body>", comment("A", "page one")),
    )
    .await;
    mount_page(&server, "/bg/world/story.500,2", 500, String::new()).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 1);

    let result = Harvester::new(config.clone())
        .unwrap()
        .run(Phase::All)
        .await;

    match result {
        Err(error @ HarvestError::Fetch(_)) => {
            assert_eq!(error.kind(), ErrorKind::TransportFailure)
        }
        other => panic!("expected fetch failure, got {:?}", other),
    }
    assert_eq!(checkpoint(dir.path())["article_ids"], serde_json::json!([]));

    // The site recovers; the article is redone from its first page
    server.reset().await;
    mount_listing(&server, 1, format!("<body>{}</body>", comment_link(500, 40))).await;
    mount_page(
        &server,
        "/bg/world/story.500",
        200,
        format!("<body>{}</body>", pagination),
    )
    .await;
    mount_page(
        &server,
        "/bg/world/story.500,1",
        200,
        format!("<body>{}</body>", comment("A", "page one")),
    )
    .await;
    mount_page(
        &server,
        "/bg/world/story.500,2",
        200,
        format!("<body>{}</body>", comment("B", "page two")),
    )
    .await;

    let report = Harvester::new(config)
        .unwrap()
        .run(Phase::Comments)
        .await
        .unwrap();

    let paths: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(
        paths,
        vec![
            "/bg/world/story.500",
            "/bg/world/story.500,1",
            "/bg/world/story.500,2"
        ]
    );
    assert_eq!(report.articles.map(|a| a.pages), Some(2));
    assert_eq!(
        checkpoint(dir.path())["article_ids"],
        serde_json::json!(["500"])
    );

    // Page one was written by both runs
    assert_eq!(comment_rows(dir.path()).len(), 3);
}

#[tokio::test]
async fn test_threshold_boundary() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        1,
        format!(
            "<body>{}{}{}</body>",
            comment_link(1, 5),
            comment_link(2, 6),
            comment_link(3, 0)
        ),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 1);

    Harvester::new(config)
        .unwrap()
        .run(Phase::Listing)
        .await
        .unwrap();

    let ids: Vec<String> = read_article_index(&dir.path().join("output/article_list.csv"))
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec!["2"]);
}

#[tokio::test]
async fn test_malformed_listing_keeps_checkpoint() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, "<body></body>".to_string()).await;
    mount_listing(
        &server,
        2,
        r##"<body><a class="com" href="/a/b.9#comments">many</a></body>"##.to_string(),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 3);

    let error = Harvester::new(config)
        .unwrap()
        .run(Phase::Listing)
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::MalformedContent);
    assert_eq!(checkpoint(dir.path())["last_page"], 1);
}

#[tokio::test]
async fn test_fresh_start_resets_checkpoint() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, "<body></body>".to_string()).await;
    mount_listing(&server, 2, "<body></body>".to_string()).await;

    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("progress.json"),
        r#"{"last_page": 2, "article_ids": ["7"]}"#,
    )
    .unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 2);

    let mut harvester = Harvester::new(config).unwrap();
    assert_eq!(harvester.progress().listing_cursor(), 2);
    assert!(harvester.progress().is_article_processed("7"));

    harvester.reset_progress().unwrap();
    harvester.run(Phase::Listing).await.unwrap();

    assert_eq!(server.received_requests().await.unwrap().len(), 2);
    let state = checkpoint(dir.path());
    assert_eq!(state["last_page"], 2);
    assert_eq!(state["article_ids"], serde_json::json!([]));
}

#[tokio::test]
async fn test_corrupt_checkpoint_is_rejected() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("progress.json"), "{not json").unwrap();
    let config = create_test_config("http://127.0.0.1:1", dir.path(), 1);

    match Harvester::new(config) {
        Err(error) => assert_eq!(error.kind(), ErrorKind::PersistenceFailure),
        Ok(_) => panic!("corrupt checkpoint must not load"),
    }
}
