//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of crawl results,
//! including run information, statistics, host errors, and link listings.

use crate::crawler::CrawlReport;
use crate::output::{ranked_external_links, ranked_host_errors, ranked_pages};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of `report` to `output_path`
///
/// # Arguments
///
/// * `report` - The finished crawl
/// * `output_path` - Path where the markdown file should be written
/// * `config_hash` - Hash of the config file the run was started from, if any
pub fn write_markdown_summary(
    report: &CrawlReport,
    output_path: &Path,
    config_hash: Option<&str>,
) -> std::io::Result<()> {
    let markdown = format_markdown_summary(report, config_hash);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl report as markdown
pub fn format_markdown_summary(report: &CrawlReport, config_hash: Option<&str>) -> String {
    let mut md = String::new();

    // Title
    md.push_str("# Sitewalk Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed URL**: {}\n", report.seed_url));
    md.push_str(&format!(
        "- **Started**: {}\n",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        report.elapsed.as_secs_f64()
    ));
    md.push_str(&format!("- **Outcome**: {}\n", report.outcome));
    if !report.unwound {
        md.push_str("- **Note**: some tasks were still running at shutdown\n");
    }
    if let Some(hash) = config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Overall statistics
    let stats = &report.stats;
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Total Requests**: {}\n", stats.total_requests));
    md.push_str(&format!(
        "- **Failed Requests**: {}\n",
        stats.failed_requests
    ));
    if let Some(rate) = stats.success_rate() {
        md.push_str(&format!("- **Success Rate**: {:.2}%\n", rate));
    }
    md.push_str(&format!("- **Unique Pages**: {}\n", report.pages.len()));
    md.push_str(&format!(
        "- **External Links**: {}\n\n",
        report.external_links.len()
    ));

    // Host errors
    let host_errors = ranked_host_errors(report);
    if !host_errors.is_empty() {
        md.push_str("## Errors by Host\n\n");
        md.push_str("| Host | Errors |\n");
        md.push_str("|------|--------|\n");

        for (host, count) in host_errors {
            md.push_str(&format!("| {} | {} |\n", host, count));
        }
        md.push('\n');
    }

    // Internal pages
    let pages = ranked_pages(report);
    if !pages.is_empty() {
        md.push_str("## Internal Pages\n\n");
        md.push_str("| URL | References |\n");
        md.push_str("|-----|------------|\n");

        for (url, count) in pages {
            md.push_str(&format!("| {} | {} |\n", url, count));
        }
        md.push('\n');
    }

    // External links
    let external = ranked_external_links(report);
    if !external.is_empty() {
        md.push_str("## External Links\n\n");
        md.push_str("| URL | References |\n");
        md.push_str("|-----|------------|\n");

        for (url, count) in external {
            md.push_str(&format!("| {} | {} |\n", url, count));
        }
        md.push('\n');
    }

    md
}
