//! Persistence interface for the index
//!
//! The core only needs narrow, id-keyed operations; join semantics live in
//! the implementation. `SqliteStore` is the production implementation.

mod schema;
mod sqlite;

pub use schema::SCHEMA_SQL;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::models::{IndexEntry, Lemma, Page, Site};
use async_trait::async_trait;

/// Storage operations consumed by the crawler and index builder.
///
/// `save_*` methods insert when the record's id is 0 and update otherwise,
/// returning the record with its assigned id.
#[async_trait]
pub trait Store: Send + Sync {
    // Sites
    async fn save_site(&self, site: &Site) -> Result<Site>;
    async fn site_by_url(&self, url: &str) -> Result<Option<Site>>;
    async fn site_by_name(&self, name: &str) -> Result<Option<Site>>;
    async fn list_sites(&self) -> Result<Vec<Site>>;

    // Pages
    async fn save_page(&self, page: &Page) -> Result<Page>;
    /// Insert a batch of new pages in one transaction
    async fn save_pages(&self, pages: &[Page]) -> Result<Vec<Page>>;
    async fn page_by_path(&self, site_id: i64, path: &str) -> Result<Option<Page>>;
    async fn delete_page(&self, page_id: i64) -> Result<()>;

    // Lemmas
    async fn save_lemma(&self, lemma: &Lemma) -> Result<Lemma>;
    async fn lemma_by_text(&self, site_id: i64, text: &str) -> Result<Option<Lemma>>;
    async fn delete_lemma(&self, lemma_id: i64) -> Result<()>;

    // Index entries
    async fn save_index_entries(&self, entries: &[IndexEntry]) -> Result<()>;
    async fn entries_for_page(&self, page_id: i64) -> Result<Vec<IndexEntry>>;
    async fn delete_entries_for_page(&self, page_id: i64) -> Result<()>;

    // Bulk removal
    async fn delete_all_for_site(&self, site_id: i64) -> Result<()>;
    async fn delete_all(&self) -> Result<()>;
}
