//! SQLite schema definition

/// SQL schema for the index database
pub const SCHEMA_SQL: &str = r#"
-- Sites: one row per configured site, carries crawl lifecycle status
CREATE TABLE IF NOT EXISTS site (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    status TEXT NOT NULL,
    status_time TEXT NOT NULL,
    last_error TEXT
);

-- Pages: fetched documents, path is site-relative
CREATE TABLE IF NOT EXISTS page (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    site_id INTEGER NOT NULL REFERENCES site(id),
    path TEXT NOT NULL,
    code INTEGER NOT NULL,
    content TEXT NOT NULL,
    UNIQUE(site_id, path)
);

-- Lemmas: frequency counts distinct pages containing the lemma per site
CREATE TABLE IF NOT EXISTS lemma (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    site_id INTEGER NOT NULL REFERENCES site(id),
    lemma TEXT NOT NULL,
    frequency INTEGER NOT NULL,
    UNIQUE(site_id, lemma)
);

-- Postings: rank is the occurrence count of the lemma within the page
CREATE TABLE IF NOT EXISTS search_index (
    page_id INTEGER NOT NULL REFERENCES page(id),
    lemma_id INTEGER NOT NULL REFERENCES lemma(id),
    "rank" REAL NOT NULL
);

-- Indexes for performance
CREATE INDEX IF NOT EXISTS idx_page_site ON page(site_id);
CREATE INDEX IF NOT EXISTS idx_lemma_site ON lemma(site_id);
CREATE INDEX IF NOT EXISTS idx_index_page ON search_index(page_id);
CREATE INDEX IF NOT EXISTS idx_index_lemma ON search_index(lemma_id);
"#;
