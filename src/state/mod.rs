//! Shared crawl state
//!
//! The only mutable state workers share. Every type here exposes narrow
//! check-and-register, increment and snapshot operations; the backing
//! containers are never handed out.

mod host_errors;
mod link_registry;
mod page_registry;
mod stats;

pub use host_errors::HostCircuitBreaker;
pub use link_registry::ExternalLinkRegistry;
pub use page_registry::{PageRegistry, Registration};
pub use stats::{CrawlStatistics, StatsSnapshot};
