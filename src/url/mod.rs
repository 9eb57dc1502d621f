//! URL handling module for Sitewalk
//!
//! This module provides the page deduplication key and the host checks
//! that decide whether a discovered link belongs to the crawled site.

mod domain;
mod normalize;

pub use domain::{extract_host, is_same_site};
pub use normalize::{normalize_parsed, normalize_url};
