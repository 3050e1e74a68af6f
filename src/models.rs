//! Core entity records: sites, pages, lemmas, and index entries.
//!
//! Plain value structs referencing each other by i64 id; the persistence
//! layer owns join semantics, the core only does id-keyed lookups.

use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;

/// Lifecycle status of a site crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SiteStatus {
    Indexing,
    Indexed,
    Failed,
}

impl std::fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SiteStatus::Indexing => write!(f, "INDEXING"),
            SiteStatus::Indexed => write!(f, "INDEXED"),
            SiteStatus::Failed => write!(f, "FAILED"),
        }
    }
}

impl FromStr for SiteStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "INDEXING" => Ok(SiteStatus::Indexing),
            "INDEXED" => Ok(SiteStatus::Indexed),
            "FAILED" => Ok(SiteStatus::Failed),
            _ => Err(Error::Parse(format!("Unknown site status: {}", s))),
        }
    }
}

/// A crawled site
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Site {
    pub id: i64,
    pub url: String,
    pub name: String,
    pub status: String,
    pub status_time: String,
    pub last_error: Option<String>,
}

impl Site {
    pub fn new(url: String, name: String) -> Self {
        Self {
            id: 0,
            url,
            name,
            status: SiteStatus::Indexing.to_string(),
            status_time: Utc::now().to_rfc3339(),
            last_error: None,
        }
    }

    pub fn get_status(&self) -> Result<SiteStatus, Error> {
        self.status.parse()
    }

    pub fn set_status(&mut self, status: SiteStatus) {
        self.status = status.to_string();
        self.status_time = Utc::now().to_rfc3339();
    }

    pub fn status_time(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.status_time)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// A fetched page, unique per (site, path)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Page {
    pub id: i64,
    pub site_id: i64,
    pub path: String,
    pub code: i64,
    pub content: String,
}

impl Page {
    pub fn new(site_id: i64, path: String, code: i64, content: String) -> Self {
        Self {
            id: 0,
            site_id,
            path,
            code,
            content,
        }
    }
}

/// A dictionary form occurring on one or more pages of a site.
///
/// `frequency` counts distinct pages within the site that contain the lemma,
/// not total occurrences.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Lemma {
    pub id: i64,
    pub site_id: i64,
    pub lemma: String,
    pub frequency: i64,
}

/// One (page, lemma) posting; `rank` is the occurrence count of the lemma
/// within that page.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct IndexEntry {
    pub page_id: i64,
    pub lemma_id: i64,
    pub rank: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [SiteStatus::Indexing, SiteStatus::Indexed, SiteStatus::Failed] {
            let text = status.to_string();
            assert_eq!(text.parse::<SiteStatus>().unwrap(), status);
        }
        assert!("indexed".parse::<SiteStatus>().is_err());
    }

    #[test]
    fn test_site_status_transition() {
        let mut site = Site::new("https://example.ru".into(), "Example".into());
        assert_eq!(site.get_status().unwrap(), SiteStatus::Indexing);

        site.set_status(SiteStatus::Indexed);
        assert_eq!(site.get_status().unwrap(), SiteStatus::Indexed);
        assert!(site.status_time().is_some());
    }
}
