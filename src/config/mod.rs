//! Configuration module for Sitewalk
//!
//! A [`RunPolicy`] carries every limit a crawl honours. It starts from
//! defaults, may be loaded from a TOML file, and is validated before a run.
//!
//! # Example
//!
//! ```no_run
//! use sitewalk::config::load_policy;
//! use std::path::Path;
//!
//! let policy = load_policy(Path::new("sitewalk.toml")).unwrap();
//! println!("Crawler will visit at most {} pages", policy.max_pages);
//! ```

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_policy, load_policy_with_hash};
pub use types::RunPolicy;
pub use validation::validate;
