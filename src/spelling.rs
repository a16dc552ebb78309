//! Per-token dictionary spelling correction.
//!
//! Each whitespace-delimited token is routed to the primary (Cyrillic) or
//! secondary (Latin) dictionary by script. Known words are kept; unknown words
//! are replaced by the best single-token suggestion, or kept if there is none.
//! There is no cross-token context and the token count never changes.

use crate::config::DictionaryPaths;
use crate::error::PipelineError;
use crate::vocabulary::Vocabulary;
use std::sync::Arc;

/// Writing system used to pick a dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// Cyrillic
    Primary,
    /// Latin and everything else
    Secondary,
}

impl Script {
    pub fn of(token: &str) -> Self {
        if token.chars().any(is_primary_letter) {
            Script::Primary
        } else {
            Script::Secondary
        }
    }
}

fn is_primary_letter(c: char) -> bool {
    matches!(c, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё')
}

/// A spelling dictionary for one language
pub trait SpellDictionary: Send + Sync {
    /// Whether `word` is a recognized form
    fn check(&self, word: &str) -> bool;

    /// Ranked corrections for `word`, best first
    fn suggest(&self, word: &str) -> Vec<String>;
}

/// Hunspell-format dictionary (`.dic` + `.aff`), UTF-8 encoded
pub struct HunspellDictionary {
    inner: spellbook::Dictionary,
}

impl HunspellDictionary {
    pub fn load(paths: &DictionaryPaths) -> Result<Self, PipelineError> {
        let read = |path: &std::path::Path| {
            std::fs::read_to_string(path).map_err(|e| {
                PipelineError::InitializationError(format!(
                    "Failed to read dictionary file {:?} (must be UTF-8): {}",
                    path, e
                ))
            })
        };
        let aff = read(&paths.aff)?;
        let dic = read(&paths.dic)?;

        let inner = spellbook::Dictionary::new(&aff, &dic).map_err(|e| {
            PipelineError::InitializationError(format!(
                "Failed to parse dictionary {:?}: {}",
                paths.dic, e
            ))
        })?;

        tracing::info!("Loaded spelling dictionary {:?}", paths.dic);
        Ok(Self { inner })
    }
}

impl SpellDictionary for HunspellDictionary {
    fn check(&self, word: &str) -> bool {
        self.inner.check(word)
    }

    fn suggest(&self, word: &str) -> Vec<String> {
        let mut suggestions = Vec::new();
        self.inner.suggest(word, &mut suggestions);
        suggestions
    }
}

/// Script-aware corrector over two dictionaries
#[derive(Clone)]
pub struct SpellCorrector {
    primary: Arc<dyn SpellDictionary>,
    secondary: Arc<dyn SpellDictionary>,
    vocabulary: Arc<Vocabulary>,
}

impl SpellCorrector {
    pub fn new(
        primary: Arc<dyn SpellDictionary>,
        secondary: Arc<dyn SpellDictionary>,
        vocabulary: Arc<Vocabulary>,
    ) -> Self {
        Self {
            primary,
            secondary,
            vocabulary,
        }
    }

    /// Correct every token independently and rejoin with single spaces
    pub fn correct(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|token| self.correct_token(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn correct_token(&self, token: &str) -> String {
        if !token.chars().any(char::is_alphabetic) || self.vocabulary.contains(token) {
            return token.to_string();
        }

        let dictionary = match Script::of(token) {
            Script::Primary => &self.primary,
            Script::Secondary => &self.secondary,
        };

        if dictionary.check(token) {
            return token.to_string();
        }

        dictionary
            .suggest(token)
            .into_iter()
            .find(|s| !s.is_empty() && !s.contains(char::is_whitespace))
            .unwrap_or_else(|| token.to_string())
    }
}
