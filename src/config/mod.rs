//! Configuration management for sitesearch
//!
//! Handles loading and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Sites to crawl, in order
    #[serde(default)]
    pub sites: Vec<SiteConfig>,

    /// Crawling configuration
    #[serde(default)]
    pub crawl: CrawlConfig,

    /// Morphology configuration
    #[serde(default)]
    pub morphology: MorphologyConfig,

    /// SQLite database file
    #[serde(default = "default_database_file")]
    pub database: PathBuf,
}

/// One configured site: a root URL plus a display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    pub url: String,
}

/// Crawling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Number of sites crawled concurrently
    #[serde(default = "default_crawl_workers")]
    pub workers: usize,

    /// Pages buffered before a bulk persistence write
    #[serde(default = "default_crawl_batch_size")]
    pub batch_size: usize,

    /// Request timeout in seconds
    #[serde(default = "default_crawl_timeout")]
    pub timeout_secs: u64,

    /// User agent string
    #[serde(default = "default_crawl_user_agent")]
    pub user_agent: String,

    /// Referrer header sent with each request
    #[serde(default = "default_crawl_referrer")]
    pub referrer: String,
}

/// Morphology configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MorphologyConfig {
    /// Tab-separated dictionary file: form, lemma, tags
    #[serde(default = "default_dictionary_file")]
    pub dictionary: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sites: Vec::new(),
            crawl: CrawlConfig::default(),
            morphology: MorphologyConfig::default(),
            database: default_database_file(),
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            workers: default_crawl_workers(),
            batch_size: default_crawl_batch_size(),
            timeout_secs: default_crawl_timeout(),
            user_agent: default_crawl_user_agent(),
            referrer: default_crawl_referrer(),
        }
    }
}

impl Default for MorphologyConfig {
    fn default() -> Self {
        Self {
            dictionary: default_dictionary_file(),
        }
    }
}

impl Config {
    /// Get the default config file path (~/.sitesearch/config.toml)
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sitesearch")
            .join("config.toml")
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Find the configured site owning `url`, if any
    pub fn site_for_url(&self, url: &str) -> Option<&SiteConfig> {
        self.sites.iter().find(|s| url.starts_with(&s.url))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.crawl.workers == 0 {
            return Err(Error::Config("crawl.workers must be positive".to_string()));
        }

        if self.crawl.batch_size == 0 {
            return Err(Error::Config(
                "crawl.batch_size must be positive".to_string(),
            ));
        }

        for site in &self.sites {
            url::Url::parse(&site.url)
                .map_err(|e| Error::Config(format!("Invalid site url {}: {}", site.url, e)))?;
        }

        Ok(())
    }
}
