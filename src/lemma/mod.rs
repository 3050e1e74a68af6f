//! Lemma extraction from raw text
//!
//! Tokenizes Cyrillic text, filters function words (prepositions,
//! conjunctions, interjections) through the morphology provider, and counts
//! occurrences of each dictionary form.

use crate::morph::Morphology;
use std::collections::HashMap;
use std::sync::Arc;

/// Tag markers of function words excluded from indexing
const PARTICLE_NAMES: [&str; 3] = ["МЕЖД", "ПРЕДЛ", "СОЮЗ"];

/// Tag suffixes rejected by [`LemmaExtractor::word_check`]; the snippet
/// fallback additionally drops particles (ЧАСТ)
const WORD_CHECK_SUFFIXES: [&str; 4] = ["ПРЕДЛ", "СОЮЗ", "ЧАСТ", "МЕЖД"];

/// Extracts lemma frequency mappings from document text
pub struct LemmaExtractor {
    morph: Arc<dyn Morphology>,
}

impl LemmaExtractor {
    pub fn new(morph: Arc<dyn Morphology>) -> Self {
        Self { morph }
    }

    /// Lowercase the text, blank out everything that is not a Cyrillic letter
    /// (а-я) or whitespace, and split into candidate tokens.
    pub fn russian_words(text: &str) -> Vec<String> {
        text.to_lowercase()
            .chars()
            .map(|c| {
                if matches!(c, 'а'..='я') || c.is_whitespace() {
                    c
                } else {
                    ' '
                }
            })
            .collect::<String>()
            .split_whitespace()
            .map(|w| w.to_string())
            .collect()
    }

    /// Map each recognizable non-function word of `text` to its occurrence
    /// count, keyed by the word's first normal form.
    pub fn extract(&self, text: &str) -> HashMap<String, i64> {
        let mut lemmas: HashMap<String, i64> = HashMap::new();

        for word in Self::russian_words(text) {
            let base_forms = self.morph.morph_info(&word);
            if self.any_base_belongs_to_particle(&base_forms) {
                continue;
            }

            let normal_forms = self.morph.normal_forms(&word);
            let Some(normal_word) = normal_forms.into_iter().next() else {
                continue;
            };

            *lemmas.entry(normal_word).or_insert(0) += 1;
        }

        lemmas
    }

    /// True if ANY interpretation of the word carries a function-word tag
    fn any_base_belongs_to_particle(&self, base_forms: &[String]) -> bool {
        base_forms.iter().any(|base| Self::has_particle_property(base))
    }

    fn has_particle_property(word_base: &str) -> bool {
        let upper = word_base.to_uppercase();
        PARTICLE_NAMES.iter().any(|p| upper.contains(p))
    }

    /// Filter used by the stemmed snippet fallback: the word must be entirely
    /// Cyrillic letters and its first interpretation must not end with a
    /// preposition, conjunction, particle, or interjection tag.
    ///
    /// Unlike [`extract`](Self::extract), only the first interpretation is
    /// consulted and the tag is suffix-matched; this asymmetry is inherited
    /// search behavior.
    pub fn word_check(&self, word: &str) -> bool {
        if word.is_empty() || !word.chars().all(|c| matches!(c, 'а'..='я' | 'ё' | 'А'..='Я' | 'Ё'))
        {
            return false;
        }

        let base_forms = self.morph.morph_info(word);
        let Some(first) = base_forms.first() else {
            // Unknown words are not function words; let the stemmer try them
            return true;
        };

        !WORD_CHECK_SUFFIXES.iter().any(|s| first.ends_with(s))
    }
}
