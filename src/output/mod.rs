//! Output module for crawl reports
//!
//! This module handles:
//! - Printing the text report (statistics, pages, external links)
//! - Writing a markdown summary of a run
//! - Exporting the link graph as Graphviz DOT

mod graph;
mod markdown;
mod report;

pub use graph::{format_dot_graph, write_dot_graph};
pub use markdown::{format_markdown_summary, write_markdown_summary};
pub use report::{format_report, print_report};

use crate::crawler::CrawlReport;
use url::Url;

/// Rebuilds a full page URL from a normalized key and a scheme
///
/// # Example
///
/// ```
/// use sitewalk::output::page_url;
///
/// assert_eq!(page_url("https", "example.com/docs"), "https://example.com/docs");
/// ```
pub fn page_url(scheme: &str, key: &str) -> String {
    format!("{}://{}", scheme, key)
}

/// Scheme of the report's seed URL, used to rebuild page URLs
pub fn seed_scheme(report: &CrawlReport) -> String {
    Url::parse(&report.seed_url)
        .map(|url| url.scheme().to_string())
        .unwrap_or_else(|_| "https".to_string())
}

/// Internal pages as full URLs, most linked first, ties by URL
pub fn ranked_pages(report: &CrawlReport) -> Vec<(String, u64)> {
    let scheme = seed_scheme(report);
    let pages = report
        .pages
        .iter()
        .map(|(key, count)| (page_url(&scheme, key), *count))
        .collect();
    rank(pages)
}

/// External links, most linked first, ties by URL
pub fn ranked_external_links(report: &CrawlReport) -> Vec<(String, u64)> {
    rank(
        report
            .external_links
            .iter()
            .map(|(url, count)| (url.clone(), *count))
            .collect(),
    )
}

/// Hosts with failures, most failures first
pub fn ranked_host_errors(report: &CrawlReport) -> Vec<(String, u64)> {
    rank(
        report
            .host_errors
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(host, count)| (host.clone(), *count))
            .collect(),
    )
}

fn rank(mut entries: Vec<(String, u64)>) -> Vec<(String, u64)> {
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

/// Counts map from literal pairs
#[cfg(test)]
pub(crate) fn counts(entries: &[(&str, u64)]) -> std::collections::HashMap<String, u64> {
    entries
        .iter()
        .map(|(key, count)| (key.to_string(), *count))
        .collect()
}

/// Report fixture shared by the output tests
#[cfg(test)]
pub(crate) fn sample_report() -> CrawlReport {
    use crate::crawler::RunOutcome;
    use crate::state::StatsSnapshot;
    use chrono::TimeZone;
    use std::time::Duration;

    CrawlReport {
        seed_url: "https://x.com/".to_string(),
        outcome: RunOutcome::Completed,
        started_at: chrono::Utc
            .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .unwrap(),
        elapsed: Duration::from_millis(1500),
        pages: counts(&[("x.com", 1), ("x.com/b", 2), ("x.com/a", 2), ("x.com/c", 5)]),
        external_links: counts(&[("https://y.org/", 1), ("https://z.net/p", 3)]),
        stats: StatsSnapshot {
            total_requests: 4,
            failed_requests: 1,
        },
        host_errors: counts(&[("x.com", 1)]),
        unwound: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranked_pages_order() {
        let ranked = ranked_pages(&sample_report());
        let urls: Vec<&str> = ranked.iter().map(|(url, _)| url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://x.com/c",
                "https://x.com/a",
                "https://x.com/b",
                "https://x.com"
            ]
        );
    }

    #[test]
    fn test_ranked_external_links_order() {
        let ranked = ranked_external_links(&sample_report());
        assert_eq!(
            ranked,
            vec![
                ("https://z.net/p".to_string(), 3),
                ("https://y.org/".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_seed_scheme_is_kept() {
        let mut report = sample_report();
        report.seed_url = "http://x.com/".to_string();
        assert_eq!(ranked_pages(&report)[0].0, "http://x.com/c");
    }

    #[test]
    fn test_host_errors_skip_zero_counts() {
        let mut report = sample_report();
        report.host_errors = counts(&[("a.com", 0), ("b.com", 4)]);
        assert_eq!(ranked_host_errors(&report), vec![("b.com".to_string(), 4)]);
    }
}
