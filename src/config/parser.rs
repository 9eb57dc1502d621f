use crate::config::types::RunPolicy;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads a run policy from a TOML file
///
/// Keys that are absent keep their defaults. The policy is validated only
/// when the file names a seed URL, since the CLI may still supply one.
///
/// # Arguments
///
/// * `path` - Path to the TOML policy file
///
/// # Returns
///
/// * `Ok(RunPolicy)` - Successfully loaded policy
/// * `Err(ConfigError)` - Failed to read, parse or validate the file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sitewalk::config::load_policy;
///
/// let policy = load_policy(Path::new("sitewalk.toml")).unwrap();
/// println!("Max pages: {}", policy.max_pages);
/// ```
pub fn load_policy(path: &Path) -> Result<RunPolicy, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let policy: RunPolicy = toml::from_str(&content)?;

    if !policy.seed_url.is_empty() {
        validate(&policy)?;
    }

    Ok(policy)
}

/// Computes a SHA-256 hash of the policy file content
///
/// Printed in reports so two runs can be matched to the same settings.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a policy and returns it together with the file's hash
pub fn load_policy_with_hash(path: &Path) -> Result<(RunPolicy, String), ConfigError> {
    let policy = load_policy(path)?;
    let hash = compute_config_hash(path)?;
    Ok((policy, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_policy() {
        let file = create_temp_config(
            r#"
seed-url = "https://example.com/"
max-concurrency = 4
max-pages = 50
batch-size = 8
retry-ceiling = 2
"#,
        );
        let policy = load_policy(file.path()).unwrap();

        assert_eq!(policy.seed_url, "https://example.com/");
        assert_eq!(policy.max_concurrency, 4);
        assert_eq!(policy.max_pages, 50);
        assert_eq!(policy.batch_size, 8);
        assert_eq!(policy.retry_ceiling, 2);
    }

    #[test]
    fn test_load_policy_without_seed_skips_validation() {
        let file = create_temp_config("max-pages = 3\n");
        let policy = load_policy(file.path()).unwrap();
        assert_eq!(policy.max_pages, 3);
        assert!(policy.seed_url.is_empty());
    }

    #[test]
    fn test_load_policy_with_invalid_path() {
        let result = load_policy(Path::new("/nonexistent/sitewalk.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_policy_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_policy(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_policy_with_validation_error() {
        let file = create_temp_config(
            r#"
seed-url = "https://example.com/"
max-concurrency = 0
"#,
        );
        let result = load_policy(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_hash_is_stable_and_content_sensitive() {
        let file1 = create_temp_config("max-pages = 1\n");
        let file2 = create_temp_config("max-pages = 2\n");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        assert_eq!(hash1, compute_config_hash(file1.path()).unwrap());
        assert_eq!(hash1.len(), 64);
        assert_ne!(hash1, compute_config_hash(file2.path()).unwrap());
    }

    #[test]
    fn test_load_policy_with_hash() {
        let file = create_temp_config("seed-url = \"https://example.com/\"\n");
        let (policy, hash) = load_policy_with_hash(file.path()).unwrap();
        assert_eq!(policy.seed_url, "https://example.com/");
        assert_eq!(hash.len(), 64);
    }
}
