// src/config.rs

//! Configuration loading utilities.
//!
//! Combines the TOML file with environment overrides, which is how the
//! Lambda deployment is configured.

use std::path::Path;

use crate::models::Config;

/// Load configuration from a TOML file and apply environment overrides.
///
/// Falls back to defaults if the file cannot be loaded.
pub fn load_config(path: &Path) -> Config {
    let mut config = Config::load_or_default(path);
    apply_env_overrides(&mut config);
    config
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: &mut Config) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

/// Apply overrides from `lookup`; empty values are ignored.
pub fn apply_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = get("CATALOG_API_URL") {
        config.catalog.api_url = url;
    }
    if let Some(url) = get("CATALOG_DOWNLOAD_API_URL") {
        config.catalog.download_api_url = url;
    }
    if let Some(timeout) = get("CATALOG_TIMEOUT_SECS") {
        match timeout.trim().parse() {
            Ok(secs) => config.catalog.timeout_secs = secs,
            Err(e) => log::warn!("Ignoring CATALOG_TIMEOUT_SECS={timeout:?}: {e}"),
        }
    }

    if let Some(prefix) = get("STUB_PREFIX") {
        config.discovery.stub_prefix = Some(prefix);
    }
    if let Some(hosts) = get("STUB_EXEMPT_HOSTS") {
        config.discovery.stub_exempt_hosts = split_list(&hosts);
    }
    if let Some(ids) = get("HIDDEN_INSTITUTIONS") {
        config.discovery.hidden_institutions = split_list(&ids);
    }
    if let Some(ids) = get("HIDDEN_PROFILES") {
        config.discovery.hidden_profiles = split_list(&ids);
    }

    if let Some(bucket) = get("S3_BUCKET") {
        config.output.s3_bucket = Some(bucket);
    }
    if let Some(key) = get("S3_PATH") {
        config.output.s3_key = key;
    }
}

/// Split a comma separated list, dropping blanks.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn with_env(pairs: &[(&str, &str)]) -> Config {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut config = Config::default();
        apply_overrides(&mut config, |key| env.get(key).cloned());
        config
    }

    #[test]
    fn test_no_overrides_keeps_defaults() {
        let config = with_env(&[]);
        assert_eq!(config.catalog.timeout_secs, Config::default().catalog.timeout_secs);
        assert!(config.discovery.stub_prefix.is_none());
        assert!(config.output.s3_bucket.is_none());
    }

    #[test]
    fn test_overrides_applied() {
        let config = with_env(&[
            ("CATALOG_API_URL", "https://cat.example.org/API.php"),
            ("CATALOG_TIMEOUT_SECS", "45"),
            ("STUB_PREFIX", "https://stub.example.net/"),
            ("STUB_EXEMPT_HOSTS", "idp.example.org, .example.edu,,"),
            ("HIDDEN_PROFILES", "12,13"),
            ("S3_BUCKET", "discovery-bucket"),
            ("S3_PATH", "v2/discovery.json"),
        ]);

        assert_eq!(config.catalog.api_url, "https://cat.example.org/API.php");
        assert_eq!(config.catalog.timeout_secs, 45);
        assert_eq!(
            config.discovery.stub_prefix.as_deref(),
            Some("https://stub.example.net/")
        );
        assert_eq!(
            config.discovery.stub_exempt_hosts,
            vec!["idp.example.org", ".example.edu"]
        );
        assert_eq!(config.discovery.hidden_profiles, vec!["12", "13"]);
        assert_eq!(config.output.s3_bucket.as_deref(), Some("discovery-bucket"));
        assert_eq!(config.output.s3_key, "v2/discovery.json");
    }

    #[test]
    fn test_bad_number_ignored() {
        let config = with_env(&[("CATALOG_TIMEOUT_SECS", "soon")]);
        assert_eq!(config.catalog.timeout_secs, Config::default().catalog.timeout_secs);
    }

    #[test]
    fn test_empty_values_ignored() {
        let config = with_env(&[("S3_BUCKET", " "), ("STUB_PREFIX", "")]);
        assert!(config.output.s3_bucket.is_none());
        assert!(config.discovery.stub_prefix.is_none());
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = Config::load_or_default(tmp.path().join("missing.toml"));
        assert_eq!(config.output.file_path, "discovery.json");
    }
}
