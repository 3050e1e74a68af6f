//! Inverted index build and merge logic
//!
//! Merges a page's lemma counts into the site-wide lemma catalog
//! (insert-or-increment) and records per-page rank entries. Page removal is
//! an explicit cascade: delete the postings, decrement lemma frequencies from
//! the still-readable content, then delete the page row.

use crate::error::Result;
use crate::lemma::LemmaExtractor;
use crate::models::{IndexEntry, Lemma, Page};
use crate::morph::Morphology;
use crate::store::Store;
use std::sync::Arc;
use tracing::debug;

/// Builds and unbuilds the per-site inverted index
pub struct IndexBuilder {
    store: Arc<dyn Store>,
    extractor: LemmaExtractor,
}

impl IndexBuilder {
    pub fn new(store: Arc<dyn Store>, morph: Arc<dyn Morphology>) -> Self {
        Self {
            store,
            extractor: LemmaExtractor::new(morph),
        }
    }

    /// Merge a freshly saved page into the index.
    ///
    /// Each lemma present on the page contributes +1 to its site-wide
    /// frequency; one posting with rank = occurrence count is written per
    /// (page, lemma) pair.
    pub async fn index_page(&self, page: &Page) -> Result<()> {
        let lemmas = self.extractor.extract(&page.content);
        debug!("Indexing page {} with {} lemmas", page.path, lemmas.len());

        let mut entries = Vec::with_capacity(lemmas.len());
        for (text, count) in &lemmas {
            let lemma = match self.store.lemma_by_text(page.site_id, text).await? {
                Some(mut existing) => {
                    existing.frequency += 1;
                    self.store.save_lemma(&existing).await?
                }
                None => {
                    self.store
                        .save_lemma(&Lemma {
                            id: 0,
                            site_id: page.site_id,
                            lemma: text.clone(),
                            frequency: 1,
                        })
                        .await?
                }
            };

            entries.push(IndexEntry {
                page_id: page.id,
                lemma_id: lemma.id,
                rank: *count as f32,
            });
        }

        self.store.save_index_entries(&entries).await
    }

    /// Remove a page from the index, then delete it.
    ///
    /// The lemma mapping is recomputed from the page's stored content, so
    /// this must run while the page row is still readable. Frequencies clamp
    /// at zero; a lemma left with no referencing pages is deleted outright.
    /// Postings go first: a lemma row can only be deleted once nothing in
    /// search_index references it.
    pub async fn remove_page(&self, page: &Page) -> Result<()> {
        let lemmas = self.extractor.extract(&page.content);
        debug!("Removing page {} with {} lemmas", page.path, lemmas.len());

        self.store.delete_entries_for_page(page.id).await?;

        for text in lemmas.keys() {
            if let Some(mut lemma) = self.store.lemma_by_text(page.site_id, text).await? {
                if lemma.frequency <= 1 {
                    self.store.delete_lemma(lemma.id).await?;
                } else {
                    lemma.frequency -= 1;
                    self.store.save_lemma(&lemma).await?;
                }
            }
        }

        self.store.delete_page(page.id).await
    }
}
