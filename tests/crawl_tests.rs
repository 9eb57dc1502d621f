//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end through the real HTTP fetcher.

use sitewalk::config::RunPolicy;
use sitewalk::crawler::{RunController, RunOutcome};
use sitewalk::output::{format_report, write_markdown_summary};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{}</body></html>", body),
        "text/html; charset=utf-8",
    )
}

/// Policy for crawling a mock server quickly
fn test_policy(seed: &str) -> RunPolicy {
    let mut policy = RunPolicy::for_seed(seed);
    policy.max_pages = 50;
    policy.request_delay_ms = 0;
    policy.backoff_base_ms = 1;
    policy.backoff_cap_ms = 10;
    policy.request_timeout_ms = 5_000;
    policy.run_timeout_secs = 30;
    policy
}

async fn mount_page(server: &MockServer, page: &str, body: &str, expected_fetches: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .expect(expected_fetches)
        .mount(server)
        .await;
}

/// Normalized key prefix for pages on the mock server
fn site_key(server: &MockServer) -> String {
    server.uri().trim_start_matches("http://").to_string()
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/a">A</a><a href="/b">B</a><a href="/a">A again</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/a", r#"<a href="/b">B</a><a href="/">Home</a>"#, 1).await;
    mount_page(&server, "/b", r#"<a href="/a?ref=b">A</a>"#, 1).await;

    let report = RunController::new(test_policy(&server.uri()))
        .unwrap()
        .run(std::future::pending())
        .await
        .unwrap();

    let site = site_key(&server);
    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(report.pages.len(), 3);
    assert_eq!(report.pages[&site], 2);
    assert_eq!(report.pages[&format!("{}/a", site)], 2);
    assert_eq!(report.pages[&format!("{}/b", site)], 2);
    assert_eq!(report.stats.total_requests, 3);
    assert_eq!(report.stats.failed_requests, 0);
    assert!(report.external_links.is_empty());
}

#[tokio::test]
async fn test_external_links_are_counted_not_fetched() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="https://external.example/page">Out</a>
           <a href="https://external.example/page">Out again</a>
           <a href="/inner">In</a>"#,
        1,
    )
    .await;
    mount_page(
        &server,
        "/inner",
        r#"<a href="https://external.example/page">Out</a>
           <a href="mailto:someone@example.com">Mail</a>"#,
        1,
    )
    .await;

    let report = RunController::new(test_policy(&server.uri()))
        .unwrap()
        .run(std::future::pending())
        .await
        .unwrap();

    assert_eq!(report.pages.len(), 2);
    assert_eq!(report.external_links.len(), 1);
    assert_eq!(report.external_links["https://external.example/page"], 2);
}

#[tokio::test]
async fn test_page_ceiling_limits_fetches() {
    let server = MockServer::start().await;

    let links: String = (0..20)
        .map(|i| format!(r#"<a href="/p{}">p</a>"#, i))
        .collect();

    Mock::given(method("GET"))
        .respond_with(html(&links))
        .expect(5)
        .mount(&server)
        .await;

    let mut policy = test_policy(&server.uri());
    policy.max_pages = 5;
    policy.max_concurrency = 3;

    let report = RunController::new(policy)
        .unwrap()
        .run(std::future::pending())
        .await
        .unwrap();

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(report.pages.len(), 5);
    assert_eq!(report.stats.total_requests, 5);
}

#[tokio::test]
async fn test_missing_page_counts_as_failure() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/missing">Gone</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let report = RunController::new(test_policy(&server.uri()))
        .unwrap()
        .run(std::future::pending())
        .await
        .unwrap();

    assert_eq!(report.stats.total_requests, 2);
    assert_eq!(report.stats.failed_requests, 1);
    assert_eq!(report.pages.len(), 2);
    assert_eq!(report.host_errors.get("127.0.0.1"), Some(&1));
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/flaky">Flaky</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/flaky", "<p>Back up</p>", 1).await;

    let report = RunController::new(test_policy(&server.uri()))
        .unwrap()
        .run(std::future::pending())
        .await
        .unwrap();

    assert_eq!(report.stats.total_requests, 2);
    assert_eq!(report.stats.failed_requests, 0);
    assert!(report.host_errors.is_empty());
}

#[tokio::test]
async fn test_non_html_page_is_rejected() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/data.json">Data</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let report = RunController::new(test_policy(&server.uri()))
        .unwrap()
        .run(std::future::pending())
        .await
        .unwrap();

    assert_eq!(report.stats.total_requests, 2);
    assert_eq!(report.stats.failed_requests, 1);
}

#[tokio::test]
async fn test_run_timeout_returns_partial_report() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/slow">Slow</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("<p>late</p>").set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let mut policy = test_policy(&server.uri());
    policy.run_timeout_secs = 1;
    policy.shutdown_grace_ms = 1_000;

    let report = RunController::new(policy)
        .unwrap()
        .run(std::future::pending())
        .await
        .unwrap();

    assert_eq!(report.outcome, RunOutcome::TimedOut);
    assert!(report.unwound);
    assert_eq!(report.pages.len(), 2);
    assert!(report.elapsed < Duration::from_secs(5));
}

#[tokio::test]
async fn test_report_and_summary_output() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/a">A</a>"#, 1).await;
    mount_page(&server, "/a", "<p>leaf</p>", 1).await;

    let report = RunController::new(test_policy(&server.uri()))
        .unwrap()
        .run(std::future::pending())
        .await
        .unwrap();

    let text = format_report(&report);
    assert!(text.contains(&format!("Found 1 internal links to {}/a", server.uri())));
    assert!(text.contains("Total HTTP requests: 2"));

    let dir = tempfile::TempDir::new().unwrap();
    let summary = dir.path().join("summary.md");
    write_markdown_summary(&report, &summary, None).unwrap();
    let written = std::fs::read_to_string(&summary).unwrap();
    assert!(written.contains("- **Outcome**: completed"));
}
