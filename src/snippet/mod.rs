//! Snippet generation for search queries
//!
//! Finds the best textual match of a query inside page content and returns a
//! bounded excerpt with the match wrapped in `<b>` markers. A literal,
//! case-sensitive match wins; otherwise each query word is stemmed and
//! searched case-insensitively, and the per-word excerpts are concatenated.

use crate::lemma::LemmaExtractor;
use crate::morph::Morphology;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::sync::Arc;

/// Separators recognized inside a query string
const QUERY_SEPARATORS: &str = "?|»«*,!.";

/// Snippet generator over stored page content
pub struct SnippetSearch {
    extractor: LemmaExtractor,
}

impl SnippetSearch {
    pub fn new(morph: Arc<dyn Morphology>) -> Self {
        Self {
            extractor: LemmaExtractor::new(morph),
        }
    }

    /// Produce a highlighted excerpt of `content` around `query`.
    ///
    /// Returns an empty string when neither the literal query nor any of its
    /// stemmed words occurs in the text. The literal search is case-sensitive
    /// while the stemmed fallback is not; the asymmetry is kept on purpose.
    pub fn snippet(&self, content: &str, query: &str) -> String {
        if query.trim().is_empty() {
            return String::new();
        }

        let text = plain_text(content);
        let chars: Vec<char> = text.chars().collect();

        if let Some(byte_start) = text.find(query) {
            let start = text[..byte_start].chars().count();
            let end = start + query.chars().count();
            return literal_excerpt(&chars, query, start, end);
        }

        let stemmer = Stemmer::create(Algorithm::Russian);
        let mut builder = String::new();

        for word in query_words(query) {
            if !self.extractor.word_check(&word) {
                continue;
            }

            let stem = stemmer.stem(&word);
            let pattern = format!(r"(?i){}[а-яё]*", regex::escape(&stem));
            let Ok(re) = Regex::new(&pattern) else {
                continue;
            };

            if let Some(m) = re.find(&text) {
                let start = text[..m.start()].chars().count();
                let end = start + m.as_str().chars().count();
                builder.push_str(&word_excerpt(&chars, m.as_str(), start, end));
                builder.push_str("...");
            }
        }

        builder
    }
}

/// Strip markup and collapse whitespace runs to single spaces
pub fn plain_text(content: &str) -> String {
    let text = html2text::from_read(content.as_bytes(), 80).unwrap_or_else(|_| content.to_string());
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a query into lowercase words on whitespace and punctuation
fn query_words(query: &str) -> Vec<String> {
    query
        .trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || QUERY_SEPARATORS.contains(c))
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}

/// Window for a literal match: back 60 chars to a word boundary (from the
/// text start when the match begins within the first 80 chars), forward 160
/// chars past the match end.
fn literal_excerpt(chars: &[char], query: &str, start: usize, end: usize) -> String {
    let begin = if start > 80 {
        word_boundary_before(chars, start - 60)
    } else {
        0
    };
    let stop = (end + 160).min(chars.len());

    let window: String = chars[begin..stop].iter().collect();
    window.replace(query, &format!("<b>{}</b>", query))
}

/// Window for a stemmed-word hit: back 15 chars to a word boundary (from the
/// text start when the hit begins within the first 35 chars), forward to 80
/// chars past the hit start.
fn word_excerpt(chars: &[char], matched: &str, start: usize, end: usize) -> String {
    let begin = if start > 35 {
        word_boundary_before(chars, start - 15)
    } else {
        0
    };
    let stop = (start + 80).min(chars.len()).max(end);

    let window: String = chars[begin..stop].iter().collect();
    window.replace(matched, &format!("<b>{}</b>", matched))
}

/// Index of the first character after the nearest space at or before `from`
fn word_boundary_before(chars: &[char], from: usize) -> usize {
    let from = from.min(chars.len().saturating_sub(1));
    chars[..=from]
        .iter()
        .rposition(|c| *c == ' ')
        .map(|i| i + 1)
        .unwrap_or(0)
}
