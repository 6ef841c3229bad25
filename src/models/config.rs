//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream catalog API settings
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Feed generation rules
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Where the generated feed is written
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.catalog.user_agent.trim().is_empty() {
            return Err(AppError::validation("catalog.user_agent is empty"));
        }
        if self.catalog.timeout_secs == 0 {
            return Err(AppError::validation("catalog.timeout_secs must be > 0"));
        }
        Url::parse(&self.catalog.api_url)
            .map_err(|e| AppError::validation(format!("catalog.api_url is invalid: {e}")))?;
        Url::parse(&self.catalog.download_api_url).map_err(|e| {
            AppError::validation(format!("catalog.download_api_url is invalid: {e}"))
        })?;
        if self.discovery.sigil.trim().is_empty() {
            return Err(AppError::validation("discovery.sigil is empty"));
        }
        self.discovery.stub_prefix_url()?;
        Ok(())
    }
}

/// Upstream catalog API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Endpoint answering `listIdentityProvidersWithProfiles`
    #[serde(default = "defaults::api_url")]
    pub api_url: String,

    /// Endpoint that serves installer downloads for generic profiles
    #[serde(default = "defaults::download_api_url")]
    pub download_api_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl CatalogConfig {
    /// Full URL of the catalog listing request.
    pub fn listing_url(&self) -> String {
        format!(
            "{}?action=listIdentityProvidersWithProfiles",
            self.api_url
        )
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_url: defaults::api_url(),
            download_api_url: defaults::download_api_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Feed generation rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Root key of the discovery document
    #[serde(default = "defaults::sigil")]
    pub sigil: String,

    /// HTTPS prefix that replaces scheme and host of letswifi endpoints
    #[serde(default)]
    pub stub_prefix: Option<String>,

    /// Hosts that keep their own letswifi endpoint; a leading `.` matches subdomains
    #[serde(default)]
    pub stub_exempt_hosts: Vec<String>,

    /// Catalog entity ids that are never published
    #[serde(default)]
    pub hidden_institutions: Vec<String>,

    /// Catalog profile ids that are never published
    #[serde(default)]
    pub hidden_profiles: Vec<String>,
}

impl DiscoveryConfig {
    /// Parse the stub prefix, refusing anything that is not https.
    pub fn stub_prefix_url(&self) -> Result<Option<Url>> {
        let Some(prefix) = self.stub_prefix.as_deref() else {
            return Ok(None);
        };
        let url = Url::parse(prefix)
            .map_err(|e| AppError::config(format!("stub prefix {prefix:?} is not a URL: {e}")))?;
        if url.scheme() != "https" {
            return Err(AppError::config(format!(
                "stub prefix {prefix:?} must use https"
            )));
        }
        Ok(Some(url))
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            sigil: defaults::sigil(),
            stub_prefix: None,
            stub_exempt_hosts: Vec::new(),
            hidden_institutions: Vec::new(),
            hidden_profiles: Vec::new(),
        }
    }
}

/// Output location settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Local file written by the CLI
    #[serde(default = "defaults::file_path")]
    pub file_path: String,

    /// Bucket written by the Lambda
    #[serde(default)]
    pub s3_bucket: Option<String>,

    /// Object key inside `s3_bucket`
    #[serde(default = "defaults::s3_key")]
    pub s3_key: String,

    /// Cache-Control header sent with uploads
    #[serde(default = "defaults::cache_control")]
    pub cache_control: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_path: defaults::file_path(),
            s3_bucket: None,
            s3_key: defaults::s3_key(),
            cache_control: defaults::cache_control(),
        }
    }
}

mod defaults {
    // Catalog defaults
    pub fn api_url() -> String {
        "https://cat.eduroam.org/user/API.php".into()
    }
    pub fn download_api_url() -> String {
        "https://cat.eduroam.org/user/API.php".into()
    }
    pub fn user_agent() -> String {
        concat!("eduroam-discovery/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Discovery defaults
    pub fn sigil() -> String {
        "http://letswifi.app/discovery#v2".into()
    }

    // Output defaults
    pub fn file_path() -> String {
        "discovery.json".into()
    }
    pub fn s3_key() -> String {
        "discovery.json".into()
    }
    pub fn cache_control() -> String {
        "public, max-age=900, s-maxage=300, stale-while-revalidate=86400, stale-if-error=2592000"
            .into()
    }
}
