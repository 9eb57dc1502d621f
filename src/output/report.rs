//! Plain-text crawl report printed at the end of a run

use crate::crawler::CrawlReport;
use crate::output::{ranked_external_links, ranked_host_errors, ranked_pages};
use std::fmt::Write;

/// Prints the statistics block followed by the page and link listings
pub fn print_report(report: &CrawlReport) {
    print!("{}", format_report(report));
}

/// Formats the full text report
///
/// Pages are listed with their URL rebuilt from the seed's scheme, most
/// linked first and ties broken alphabetically. External links follow in the
/// same order.
pub fn format_report(report: &CrawlReport) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = write_statistics(&mut out, report);
    let _ = write_listing(&mut out, report);

    out
}

fn write_statistics(out: &mut String, report: &CrawlReport) -> std::fmt::Result {
    let stats = &report.stats;

    writeln!(out)?;
    writeln!(out, "=============================")?;
    writeln!(out, "  CRAWLING STATISTICS")?;
    writeln!(out, "=============================")?;
    writeln!(out, "Run outcome: {}", report.outcome)?;
    writeln!(out, "Elapsed: {:.2}s", report.elapsed.as_secs_f64())?;
    writeln!(out, "Total HTTP requests: {}", stats.total_requests)?;
    writeln!(out, "Failed HTTP requests: {}", stats.failed_requests)?;

    if let Some(rate) = stats.success_rate() {
        writeln!(out, "Success rate: {:.1}%", rate)?;
    }

    writeln!(out, "Unique pages discovered: {}", report.pages.len())?;
    writeln!(out, "External links found: {}", report.external_links.len())?;

    let host_errors = ranked_host_errors(report);
    if !host_errors.is_empty() {
        writeln!(out)?;
        writeln!(out, "Error summary by host:")?;
        for (host, count) in host_errors {
            writeln!(out, "  {}: {} errors", host, count)?;
        }
    }

    Ok(())
}

fn write_listing(out: &mut String, report: &CrawlReport) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "=============================")?;
    writeln!(out, "  REPORT for {}", report.seed_url)?;
    writeln!(out, "=============================")?;

    for (url, count) in ranked_pages(report) {
        writeln!(out, "Found {} internal links to {}", count, url)?;
    }

    writeln!(out)?;
    writeln!(out, "-----------------------------")?;
    writeln!(out, "  EXTERNAL LINKS REPORT")?;
    writeln!(out, "-----------------------------")?;

    for (url, count) in ranked_external_links(report) {
        writeln!(out, "Found {} external links to {}", count, url)?;
    }

    Ok(())
}
