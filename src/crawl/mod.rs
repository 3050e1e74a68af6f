//! Concurrent breadth-first site crawling
//!
//! This module provides:
//! - Per-site BFS with a visited set and FIFO queue
//! - Bounded fan-out across sites (each site's BFS stays sequential)
//! - Cooperative stop via atomic flags observed at loop boundaries
//! - Page batching between persistence writes
//! - Single-page re-index

mod fetch;
mod links;

pub use fetch::*;
pub use links::*;

use crate::config::{Config, SiteConfig};
use crate::error::{Error, Result};
use crate::index::IndexBuilder;
use crate::models::{Page, Site, SiteStatus};
use crate::morph::Morphology;
use crate::store::Store;
use futures::StreamExt;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};
use url::Url;

/// Reason recorded on a site stopped before completion
const STOPPED_BY_USER: &str = "Crawl stopped by user";

/// Multi-site crawl orchestrator.
///
/// One instance drives every configured site; the start/stop flags are the
/// only state shared across site tasks.
pub struct Crawler {
    store: Arc<dyn Store>,
    index: IndexBuilder,
    fetcher: Fetcher,
    sites: Vec<SiteConfig>,
    workers: usize,
    batch_size: usize,
    active: AtomicBool,
    stop_requested: AtomicBool,
}

impl Crawler {
    pub fn new(store: Arc<dyn Store>, morph: Arc<dyn Morphology>, config: &Config) -> Result<Self> {
        Ok(Self {
            index: IndexBuilder::new(store.clone(), morph),
            fetcher: Fetcher::new(&config.crawl)?,
            store,
            sites: config.sites.clone(),
            workers: config.crawl.workers,
            batch_size: config.crawl.batch_size,
            active: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
        })
    }

    /// Whether a crawl is currently running
    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Crawl every configured site, wiping the previous index first.
    ///
    /// Sites run concurrently up to the worker cap; the call returns once
    /// every site has reached a terminal status. Rejected when a crawl is
    /// already in flight.
    pub async fn start_crawl(&self) -> Result<()> {
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(Error::CrawlAlreadyRunning);
        }
        self.stop_requested.store(false, Ordering::SeqCst);

        info!("Starting crawl of {} sites", self.sites.len());

        let result = self.store.delete_all().await;
        if let Err(e) = result {
            self.active.store(false, Ordering::SeqCst);
            return Err(e);
        }

        futures::stream::iter(self.sites.clone())
            .for_each_concurrent(self.workers, |cfg| async move {
                self.crawl_site(&cfg).await;
            })
            .await;

        self.active.store(false, Ordering::SeqCst);
        info!("Crawl finished");
        Ok(())
    }

    /// Request a cooperative stop of the running crawl.
    ///
    /// Site tasks observe the flag at their next loop iteration; each ends
    /// FAILED with a "stopped by user" reason.
    pub fn stop_crawl(&self) -> Result<()> {
        if !self.active.load(Ordering::SeqCst) {
            return Err(Error::CrawlNotRunning);
        }
        info!("Stop requested");
        self.stop_requested.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Fetch and re-index a single page.
    ///
    /// The URL must belong to a configured site. Any existing page at the
    /// resolved path is removed from the index first (delete + recreate,
    /// never an in-place diff).
    pub async fn index_one(&self, url: &str) -> Result<Page> {
        if self.is_running() {
            return Err(Error::CrawlAlreadyRunning);
        }

        let cfg = self
            .sites
            .iter()
            .find(|s| url.starts_with(&s.url))
            .ok_or_else(|| Error::SiteNotConfigured(url.to_string()))?;

        let fetched = self.fetcher.fetch(url).await?;
        let path = relative_path(&fetched.final_url);

        let mut site = match self.store.site_by_url(&cfg.url).await? {
            Some(site) => site,
            None => {
                self.store
                    .save_site(&Site::new(cfg.url.clone(), cfg.name.clone()))
                    .await?
            }
        };

        if let Some(existing) = self.store.page_by_path(site.id, &path).await? {
            self.index.remove_page(&existing).await?;
        }

        let page = self
            .store
            .save_page(&Page::new(
                site.id,
                path,
                fetched.status_code as i64,
                fetched.body,
            ))
            .await?;
        self.index.index_page(&page).await?;

        site.set_status(SiteStatus::Indexed);
        self.store.save_site(&site).await?;

        info!("Re-indexed {} as page {}", url, page.id);
        Ok(page)
    }

    /// Crawl one site and record its terminal status; never propagates
    async fn crawl_site(&self, cfg: &SiteConfig) {
        let mut site = match self
            .store
            .save_site(&Site::new(cfg.url.clone(), cfg.name.clone()))
            .await
        {
            Ok(site) => site,
            Err(e) => {
                error!("Failed to create site row for {}: {}", cfg.url, e);
                return;
            }
        };

        match self.crawl_pages(&site).await {
            Ok(()) if self.stop_requested.load(Ordering::SeqCst) => {
                site.last_error = Some(STOPPED_BY_USER.to_string());
                site.set_status(SiteStatus::Failed);
            }
            Ok(()) => {
                site.set_status(SiteStatus::Indexed);
            }
            Err(e) => {
                warn!("Crawl of {} failed: {}", cfg.url, e);
                site.last_error = Some(e.to_string());
                site.set_status(SiteStatus::Failed);
            }
        }

        if let Err(e) = self.store.save_site(&site).await {
            error!("Failed to record status for {}: {}", cfg.url, e);
        }
    }

    /// Sequential BFS over one site's pages
    async fn crawl_pages(&self, site: &Site) -> Result<()> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        let mut batch: Vec<Page> = Vec::new();

        // Seed with the parsed form so links back to the root compare equal
        // to it (extracted links are Url-normalized too)
        let root = Url::parse(&site.url)?.to_string();
        visited.insert(root.clone());
        queue.push_back(root);

        while let Some(url) = queue.pop_front() {
            if self.stop_requested.load(Ordering::SeqCst) {
                // Buffered pages are dropped: no writes after the stop is observed
                info!("Stopping crawl of {} ({} urls left)", site.url, queue.len());
                return Ok(());
            }

            let fetched = match self.fetcher.fetch(&url).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    // Pages fetched before the failure are kept
                    self.flush(&mut batch).await?;
                    return Err(e);
                }
            };
            let path = relative_path(&fetched.final_url);

            for link in extract_links(&fetched.body, &fetched.final_url) {
                let link = link.to_string();
                // Mark visited at enqueue time so a link reached via several
                // pages is queued only once
                if visited.insert(link.clone()) {
                    queue.push_back(link);
                }
            }

            let already_stored = self.store.page_by_path(site.id, &path).await?.is_some()
                || batch.iter().any(|p| p.path == path);
            if !already_stored {
                batch.push(Page::new(
                    site.id,
                    path,
                    fetched.status_code as i64,
                    fetched.body,
                ));
                if batch.len() >= self.batch_size {
                    self.flush(&mut batch).await?;
                }
            }
        }

        self.flush(&mut batch).await?;
        info!("Finished crawling {} ({} urls seen)", site.url, visited.len());
        Ok(())
    }

    /// Persist the buffered pages in one write, then index them
    async fn flush(&self, batch: &mut Vec<Page>) -> Result<()> {
        let pages: Vec<Page> = batch.drain(..).collect();
        for page in &self.store.save_pages(&pages).await? {
            self.index.index_page(page).await?;
        }
        Ok(())
    }
}
