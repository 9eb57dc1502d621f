//! Sitewalk main entry point
//!
//! This is the command-line interface for the Sitewalk site crawler.

use anyhow::Context;
use clap::Parser;
use sitewalk::config::{load_policy_with_hash, validate, RunPolicy};
use sitewalk::crawler::{shutdown_signal, RunController};
use sitewalk::output::{print_report, write_dot_graph, write_markdown_summary};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sitewalk: a bounded single-domain site crawler
///
/// Sitewalk crawls every page reachable from URL within its domain, counts
/// how often each page is linked, and reports links leaving the site.
#[derive(Parser, Debug)]
#[command(name = "sitewalk")]
#[command(version = "1.0.0")]
#[command(about = "A bounded single-domain site crawler", long_about = None)]
struct Cli {
    /// The website URL to crawl
    #[arg(value_name = "URL")]
    url: String,

    /// Maximum number of pages fetched at once [default: 10]
    #[arg(
        value_name = "MAX_CONCURRENCY",
        env = "CRAWLER_MAX_CONCURRENCY",
        value_parser = parse_positive
    )]
    max_concurrency: Option<usize>,

    /// Maximum number of distinct pages to crawl [default: 10]
    #[arg(value_name = "MAX_PAGES", value_parser = parse_positive)]
    max_pages: Option<usize>,

    /// Number of discovered links scheduled per batch [default: 5]
    #[arg(value_name = "BATCH_SIZE", value_parser = parse_positive)]
    batch_size: Option<usize>,

    /// Write a Graphviz DOT graph of the crawl
    #[arg(long)]
    graph: bool,

    /// Where to write the graph when --graph is set
    #[arg(long, value_name = "PATH", default_value = "graph.dot")]
    graph_path: PathBuf,

    /// Write a markdown summary of the crawl to PATH
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,

    /// Path to a TOML file with additional run settings
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Overall run timeout in seconds [default: 600]
    #[arg(long, value_name = "SECS", value_parser = parse_positive)]
    timeout: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (policy, config_hash) = build_policy(&cli)?;

    let controller = RunController::new(policy).context("Failed to start crawl")?;
    let report = controller
        .run(shutdown_signal())
        .await
        .context("Crawl failed")?;

    print_report(&report);

    if cli.graph {
        match write_dot_graph(&report, &cli.graph_path) {
            Ok(()) => tracing::info!("Graph written to {}", cli.graph_path.display()),
            Err(e) => tracing::error!(
                "Failed to write graph to {}: {}",
                cli.graph_path.display(),
                e
            ),
        }
    }

    if let Some(path) = &cli.summary {
        match write_markdown_summary(&report, path, config_hash.as_deref()) {
            Ok(()) => tracing::info!("Summary written to {}", path.display()),
            Err(e) => tracing::error!("Failed to write summary to {}: {}", path.display(), e),
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitewalk=info,warn"),
            1 => EnvFilter::new("sitewalk=debug,info"),
            2 => EnvFilter::new("sitewalk=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the run policy: defaults, then the config file, then CLI arguments
fn build_policy(cli: &Cli) -> anyhow::Result<(RunPolicy, Option<String>)> {
    let (mut policy, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (policy, hash) = load_policy_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (policy, Some(hash))
        }
        None => (RunPolicy::default(), None),
    };

    policy.seed_url = cli.url.clone();

    if let Some(max_concurrency) = cli.max_concurrency {
        policy.max_concurrency = max_concurrency;
    }
    if let Some(max_pages) = cli.max_pages {
        policy.max_pages = max_pages;
    }
    if let Some(batch_size) = cli.batch_size {
        policy.batch_size = batch_size;
    }
    if let Some(timeout) = cli.timeout {
        policy.run_timeout_secs = timeout as u64;
    }

    validate(&policy).context("Invalid arguments")?;

    Ok((policy, config_hash))
}

/// Parses a strictly positive integer argument
fn parse_positive(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be a positive integer".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{}' is not a positive integer", value)),
    }
}
