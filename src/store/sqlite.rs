//! SQLite-backed store implementation

use super::{Store, SCHEMA_SQL};
use crate::error::Result;
use crate::models::{IndexEntry, Lemma, Page, Site};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// SQLite database handle
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to the database file, creating it (and its parent directory)
    /// when missing
    pub async fn connect(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        debug!("Connecting to SQLite database at {:?}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// In-memory database, used by tests
    pub async fn connect_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        // A single connection so every query sees the same memory database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Initialize the database schema
    pub async fn init_schema(&self) -> Result<()> {
        debug!("Initializing database schema");
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn save_site(&self, site: &Site) -> Result<Site> {
        let mut saved = site.clone();
        if site.id == 0 {
            let result = sqlx::query(
                r#"
                INSERT INTO site (url, name, status, status_time, last_error)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&site.url)
            .bind(&site.name)
            .bind(&site.status)
            .bind(&site.status_time)
            .bind(&site.last_error)
            .execute(&self.pool)
            .await?;
            saved.id = result.last_insert_rowid();
        } else {
            sqlx::query(
                r#"
                UPDATE site SET url = ?, name = ?, status = ?, status_time = ?, last_error = ?
                WHERE id = ?
                "#,
            )
            .bind(&site.url)
            .bind(&site.name)
            .bind(&site.status)
            .bind(&site.status_time)
            .bind(&site.last_error)
            .bind(site.id)
            .execute(&self.pool)
            .await?;
        }
        Ok(saved)
    }

    async fn site_by_url(&self, url: &str) -> Result<Option<Site>> {
        let site = sqlx::query_as::<_, Site>("SELECT * FROM site WHERE url = ?")
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(site)
    }

    async fn site_by_name(&self, name: &str) -> Result<Option<Site>> {
        let site = sqlx::query_as::<_, Site>("SELECT * FROM site WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(site)
    }

    async fn list_sites(&self) -> Result<Vec<Site>> {
        let sites = sqlx::query_as::<_, Site>("SELECT * FROM site ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(sites)
    }

    async fn save_page(&self, page: &Page) -> Result<Page> {
        let mut saved = page.clone();
        if page.id == 0 {
            let result = sqlx::query(
                r#"
                INSERT INTO page (site_id, path, code, content)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(page.site_id)
            .bind(&page.path)
            .bind(page.code)
            .bind(&page.content)
            .execute(&self.pool)
            .await?;
            saved.id = result.last_insert_rowid();
        } else {
            sqlx::query(
                r#"
                UPDATE page SET site_id = ?, path = ?, code = ?, content = ?
                WHERE id = ?
                "#,
            )
            .bind(page.site_id)
            .bind(&page.path)
            .bind(page.code)
            .bind(&page.content)
            .bind(page.id)
            .execute(&self.pool)
            .await?;
        }
        Ok(saved)
    }

    async fn save_pages(&self, pages: &[Page]) -> Result<Vec<Page>> {
        if pages.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(pages.len());
        for page in pages {
            let result = sqlx::query(
                r#"
                INSERT INTO page (site_id, path, code, content)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(page.site_id)
            .bind(&page.path)
            .bind(page.code)
            .bind(&page.content)
            .execute(&mut *tx)
            .await?;

            let mut page = page.clone();
            page.id = result.last_insert_rowid();
            saved.push(page);
        }
        tx.commit().await?;
        Ok(saved)
    }

    async fn page_by_path(&self, site_id: i64, path: &str) -> Result<Option<Page>> {
        let page = sqlx::query_as::<_, Page>("SELECT * FROM page WHERE site_id = ? AND path = ?")
            .bind(site_id)
            .bind(path)
            .fetch_optional(&self.pool)
            .await?;
        Ok(page)
    }

    async fn delete_page(&self, page_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM page WHERE id = ?")
            .bind(page_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_lemma(&self, lemma: &Lemma) -> Result<Lemma> {
        let mut saved = lemma.clone();
        if lemma.id == 0 {
            let result = sqlx::query(
                r#"
                INSERT INTO lemma (site_id, lemma, frequency)
                VALUES (?, ?, ?)
                "#,
            )
            .bind(lemma.site_id)
            .bind(&lemma.lemma)
            .bind(lemma.frequency)
            .execute(&self.pool)
            .await?;
            saved.id = result.last_insert_rowid();
        } else {
            sqlx::query("UPDATE lemma SET frequency = ? WHERE id = ?")
                .bind(lemma.frequency)
                .bind(lemma.id)
                .execute(&self.pool)
                .await?;
        }
        Ok(saved)
    }

    async fn lemma_by_text(&self, site_id: i64, text: &str) -> Result<Option<Lemma>> {
        let lemma =
            sqlx::query_as::<_, Lemma>("SELECT * FROM lemma WHERE site_id = ? AND lemma = ?")
                .bind(site_id)
                .bind(text)
                .fetch_optional(&self.pool)
                .await?;
        Ok(lemma)
    }

    async fn delete_lemma(&self, lemma_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM lemma WHERE id = ?")
            .bind(lemma_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_index_entries(&self, entries: &[IndexEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for entry in entries {
            sqlx::query(r#"INSERT INTO search_index (page_id, lemma_id, "rank") VALUES (?, ?, ?)"#)
                .bind(entry.page_id)
                .bind(entry.lemma_id)
                .bind(entry.rank)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn entries_for_page(&self, page_id: i64) -> Result<Vec<IndexEntry>> {
        let entries =
            sqlx::query_as::<_, IndexEntry>("SELECT * FROM search_index WHERE page_id = ?")
                .bind(page_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(entries)
    }

    async fn delete_entries_for_page(&self, page_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM search_index WHERE page_id = ?")
            .bind(page_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_all_for_site(&self, site_id: i64) -> Result<()> {
        info!("Deleting all index data for site {}", site_id);

        sqlx::query("DELETE FROM search_index WHERE page_id IN (SELECT id FROM page WHERE site_id = ?)")
            .bind(site_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM lemma WHERE site_id = ?")
            .bind(site_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM page WHERE site_id = ?")
            .bind(site_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM site WHERE id = ?")
            .bind(site_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        info!("Deleting all index data");

        for table in ["search_index", "lemma", "page", "site"] {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }
}
