//! Default values for configuration

use std::path::PathBuf;

/// Default number of concurrent site crawl workers
pub fn default_crawl_workers() -> usize {
    5
}

/// Default number of pages buffered before a bulk persistence write
pub fn default_crawl_batch_size() -> usize {
    20
}

/// Default request timeout in seconds
pub fn default_crawl_timeout() -> u64 {
    30
}

/// Default user agent string
pub fn default_crawl_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/67.0.3396.99 Safari/537.36"
        .to_string()
}

/// Default referrer header
pub fn default_crawl_referrer() -> String {
    "https://www.google.com".to_string()
}

/// Default SQLite database file (~/.sitesearch/index.db)
pub fn default_database_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".sitesearch")
        .join("index.db")
}

/// Default morphological dictionary file (~/.sitesearch/morphology_ru.tsv)
pub fn default_dictionary_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".sitesearch")
        .join("morphology_ru.tsv")
}
