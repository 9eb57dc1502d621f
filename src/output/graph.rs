//! Link graph export in Graphviz DOT format
//!
//! The seed page is the hub. Every internal page and every external link
//! gets an edge from it, labelled and weighted by its discovery count.
//! Internal pages and external links are drawn in different colors.

use crate::crawler::CrawlReport;
use crate::output::{page_url, ranked_external_links, ranked_pages, seed_scheme};
use crate::url::normalize_url;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const INTERNAL_COLOR: &str = "#3399e6";
const EXTERNAL_COLOR: &str = "#e67333";

/// Writes the DOT graph of `report` to `output_path`
pub fn write_dot_graph(report: &CrawlReport, output_path: &Path) -> std::io::Result<()> {
    let dot = format_dot_graph(report);

    let mut file = File::create(output_path)?;
    file.write_all(dot.as_bytes())?;

    Ok(())
}

/// Formats the link graph of `report` as a DOT digraph
pub fn format_dot_graph(report: &CrawlReport) -> String {
    let hub = hub_url(report);
    let mut dot = String::new();

    dot.push_str("digraph crawl {\n");
    dot.push_str("  rankdir=LR;\n");
    dot.push_str("  node [shape=ellipse, style=filled, fontname=\"Helvetica\"];\n\n");

    dot.push_str(&format!(
        "  \"{}\" [fillcolor=\"{}\", shape=doublecircle];\n",
        escape(&hub),
        INTERNAL_COLOR
    ));

    for (url, count) in ranked_pages(report) {
        if url == hub {
            continue;
        }
        dot.push_str(&format!(
            "  \"{}\" [fillcolor=\"{}\"];\n",
            escape(&url),
            INTERNAL_COLOR
        ));
        dot.push_str(&edge(&hub, &url, count));
    }

    for (url, count) in ranked_external_links(report) {
        dot.push_str(&format!(
            "  \"{}\" [fillcolor=\"{}\", shape=box];\n",
            escape(&url),
            EXTERNAL_COLOR
        ));
        dot.push_str(&edge(&hub, &url, count));
    }

    dot.push_str("}\n");
    dot
}

/// The seed page in the same form as the rebuilt page URLs
fn hub_url(report: &CrawlReport) -> String {
    match normalize_url(&report.seed_url) {
        Ok(key) => page_url(&seed_scheme(report), &key),
        Err(_) => report.seed_url.clone(),
    }
}

fn edge(from: &str, to: &str, count: u64) -> String {
    format!(
        "  \"{}\" -> \"{}\" [label=\"{}\", weight={}];\n",
        escape(from),
        escape(to),
        count,
        count
    )
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
