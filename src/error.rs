//! Custom error types for sitesearch

use thiserror::Error;

/// Main error type for sitesearch operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("URL does not belong to any configured site: {0}")]
    SiteNotConfigured(String),

    #[error("Site not found: {0}")]
    SiteNotFound(String),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Crawl already running")]
    CrawlAlreadyRunning,

    #[error("Crawl not running")]
    CrawlNotRunning,

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

/// Result type alias for sitesearch
pub type Result<T> = std::result::Result<T, Error>;
