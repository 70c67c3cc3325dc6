//! Engine-level configuration for mirrordocs.
//!
//! User config lives at `~/.config/mirrordocs/config.toml`. CLI flags
//! override config file values, which override the defaults here.
//!
//! This only covers `CrawlerConfig` — engine-wide settings reusable across
//! crawls (concurrency, retry policy, rate limit, timeouts, user agent).
//! Per-crawl settings (seed, depth/page caps, path patterns) are
//! `CrawlTarget`, which lives in `mirrordocs-crawler` since it has no
//! sensible file-level default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CrawlError, Result};

const CONFIG_FILE_NAME: &str = "config.toml";
const CONFIG_DIR_NAME: &str = "mirrordocs";

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub crawler: CrawlerSettings,
}

/// `[crawler]` section — mirrors [`CrawlerConfig`] 1:1 for (de)serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerSettings {
    #[serde(default = "default_concurrency")]
    pub concurrent_requests: usize,
    #[serde(default = "default_processing_concurrency")]
    pub processing_concurrency: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,
    #[serde(default = "default_burst")]
    pub burst: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_crawl_timeout_secs")]
    pub crawl_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            concurrent_requests: default_concurrency(),
            processing_concurrency: default_processing_concurrency(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            requests_per_second: default_requests_per_second(),
            burst: default_burst(),
            request_timeout_secs: default_request_timeout_secs(),
            crawl_timeout_secs: default_crawl_timeout_secs(),
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
        }
    }
}

fn default_concurrency() -> usize {
    8
}
fn default_processing_concurrency() -> usize {
    4
}
fn default_max_retries() -> u32 {
    3
}
fn default_retry_base_delay_ms() -> u64 {
    500
}
fn default_requests_per_second() -> f64 {
    2.0
}
fn default_burst() -> u32 {
    1
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_crawl_timeout_secs() -> u64 {
    600
}
fn default_max_redirects() -> u32 {
    5
}
fn default_user_agent() -> String {
    concat!("mirrordocs/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Runtime, engine-level crawler configuration (`CrawlerConfig` in spec
/// terms — distinct from the per-crawl `CrawlTarget`).
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub concurrent_requests: usize,
    pub processing_concurrency: usize,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub requests_per_second: f64,
    pub burst: u32,
    pub request_timeout: Duration,
    pub crawl_timeout: Duration,
    pub user_agent: String,
    pub max_redirects: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self::from(&CrawlerSettings::default())
    }
}

impl From<&CrawlerSettings> for CrawlerConfig {
    fn from(s: &CrawlerSettings) -> Self {
        Self {
            concurrent_requests: s.concurrent_requests,
            processing_concurrency: s.processing_concurrency,
            max_retries: s.max_retries,
            retry_base_delay: Duration::from_millis(s.retry_base_delay_ms),
            requests_per_second: s.requests_per_second,
            burst: s.burst,
            request_timeout: Duration::from_secs(s.request_timeout_secs),
            crawl_timeout: Duration::from_secs(s.crawl_timeout_secs),
            user_agent: s.user_agent.clone(),
            max_redirects: s.max_redirects,
        }
    }
}

impl From<&AppConfig> for CrawlerConfig {
    fn from(config: &AppConfig) -> Self {
        Self::from(&config.crawler)
    }
}

/// Directory holding the config file (`~/.config/mirrordocs/`).
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir()
        .ok_or_else(|| CrawlError::config("could not determine config directory"))?;
    Ok(base.join(CONFIG_DIR_NAME))
}

/// Path to the config file itself.
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if absent.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;
    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }
    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| CrawlError::io(path, e))?;
    toml::from_str(&content)
        .map_err(|e| CrawlError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file. Returns
/// the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| CrawlError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| CrawlError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| CrawlError::io(&path, e))?;
    tracing::info!(?path, "created default config file");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("concurrent_requests"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.crawler.concurrent_requests, 8);
    }

    #[test]
    fn crawler_config_from_app_config() {
        let app = AppConfig::default();
        let crawler = CrawlerConfig::from(&app);
        assert_eq!(crawler.concurrent_requests, 8);
        assert_eq!(crawler.max_retries, 3);
        assert_eq!(crawler.retry_base_delay, Duration::from_millis(500));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[crawler]
concurrent_requests = 16
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.crawler.concurrent_requests, 16);
        assert_eq!(config.crawler.max_retries, 3);
    }
}
