//! sitesearch: a small search-engine backend
//!
//! Crawls configured sites, extracts Russian lemmas from page content,
//! builds an inverted index of lemma postings, and produces highlighted
//! snippets for search queries.

pub mod config;
pub mod crawl;
pub mod error;
pub mod index;
pub mod lemma;
pub mod models;
pub mod morph;
pub mod snippet;
pub mod store;
