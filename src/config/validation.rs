use crate::config::types::RunPolicy;
use crate::ConfigError;
use url::Url;

/// Validates the entire run policy
pub fn validate(policy: &RunPolicy) -> Result<(), ConfigError> {
    validate_seed(&policy.seed_url)?;
    validate_limits(policy)?;
    validate_timing(policy)?;
    Ok(())
}

/// The seed must be an absolute http(s) URL with a host
fn validate_seed(seed: &str) -> Result<(), ConfigError> {
    if seed.is_empty() {
        return Err(ConfigError::Validation(
            "seed_url cannot be empty".to_string(),
        ));
    }

    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use http or https",
            seed
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' has no host",
            seed
        )));
    }

    Ok(())
}

fn validate_limits(policy: &RunPolicy) -> Result<(), ConfigError> {
    for (name, value) in [
        ("max_concurrency", policy.max_concurrency),
        ("max_pages", policy.max_pages),
        ("batch_size", policy.batch_size),
        ("max_links_per_page", policy.max_links_per_page),
        ("max_body_bytes", policy.max_body_bytes),
    ] {
        if value == 0 {
            return Err(ConfigError::Validation(format!(
                "{} must be a positive integer",
                name
            )));
        }
    }

    // Semaphore permits are capped well below this
    if policy.max_concurrency > 10_000 {
        return Err(ConfigError::Validation(format!(
            "max_concurrency must be <= 10000, got {}",
            policy.max_concurrency
        )));
    }

    if policy.circuit_breaker_threshold == 0 {
        return Err(ConfigError::Validation(
            "circuit_breaker_threshold must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_timing(policy: &RunPolicy) -> Result<(), ConfigError> {
    if policy.request_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_ms must be > 0".to_string(),
        ));
    }

    if policy.run_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "run_timeout_secs must be > 0".to_string(),
        ));
    }

    if policy.backoff_base_ms > policy.backoff_cap_ms {
        return Err(ConfigError::Validation(format!(
            "backoff_base_ms ({}) cannot exceed backoff_cap_ms ({})",
            policy.backoff_base_ms, policy.backoff_cap_ms
        )));
    }

    Ok(())
}
