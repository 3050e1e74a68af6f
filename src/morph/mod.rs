//! Dictionary-based Russian morphology
//!
//! This module provides:
//! - The `Morphology` trait: normal (dictionary) forms and grammatical tags
//!   for a lowercase word
//! - `DictMorphology`: an implementation backed by a tab-separated dictionary
//!   file (form, lemma, tags; one interpretation per line)

use crate::error::Result;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::info;

/// One interpretation of a surface form
#[derive(Debug, Clone)]
struct WordEntry {
    lemma: String,
    tags: String,
}

/// Morphological analyzer contract.
///
/// Pure function of the input word; lowercase input expected. Unrecognized
/// words yield empty vectors, never an error.
pub trait Morphology: Send + Sync {
    /// Dictionary (normal) forms of a word, in dictionary order
    fn normal_forms(&self, word: &str) -> Vec<String>;

    /// Tag strings encoding part-of-speech and grammatical category,
    /// one per interpretation
    fn morph_info(&self, word: &str) -> Vec<String>;
}

/// Dictionary-backed morphology.
///
/// Dictionary format is one interpretation per line:
/// `форма<TAB>лемма<TAB>ТЕГИ` (e.g. `леопарда\tлеопард\tС мр, ед, рд`).
/// Blank lines and lines starting with `#` are skipped.
pub struct DictMorphology {
    entries: HashMap<String, Vec<WordEntry>>,
}

impl DictMorphology {
    /// Load a dictionary from a file path
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let dict = Self::from_reader(file)?;
        info!(
            "Loaded morphological dictionary from {:?} ({} forms)",
            path,
            dict.entries.len()
        );
        Ok(dict)
    }

    /// Load a dictionary from any reader
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let mut entries: HashMap<String, Vec<WordEntry>> = HashMap::new();

        for line in BufReader::new(reader).lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split('\t');
            let (form, lemma, tags) = match (fields.next(), fields.next(), fields.next()) {
                (Some(f), Some(l), Some(t)) => (f, l, t),
                _ => continue,
            };

            entries
                .entry(form.trim().to_lowercase())
                .or_default()
                .push(WordEntry {
                    lemma: lemma.trim().to_lowercase(),
                    tags: tags.trim().to_string(),
                });
        }

        Ok(Self { entries })
    }
}

impl Morphology for DictMorphology {
    fn normal_forms(&self, word: &str) -> Vec<String> {
        self.entries
            .get(word)
            .map(|interps| interps.iter().map(|e| e.lemma.clone()).collect())
            .unwrap_or_default()
    }

    fn morph_info(&self, word: &str) -> Vec<String> {
        self.entries
            .get(word)
            .map(|interps| {
                interps
                    .iter()
                    .map(|e| format!("{}|{}", e.lemma, e.tags))
                    .collect()
            })
            .unwrap_or_default()
    }
}
