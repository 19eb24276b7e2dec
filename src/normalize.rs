//! Text normalization: token filtering, lowercasing, stopword removal,
//! stemming
//!
//! The same normalizer runs over every collection line at index-build time
//! and over the query string at query time; retrieval correctness depends on
//! that symmetry. Stopword membership and stemming are injected capabilities
//! so the pipeline can be tested with fakes.

use std::collections::HashSet;

use rust_stemmers::{Algorithm, Stemmer};
use stop_words::{get, LANGUAGE};

use crate::config::NormalizerConfig;
use crate::error::ScourError;
use crate::lexer::{tokenize, TokenKind};
use crate::Result;

/// Set-membership test for stopwords.
pub trait StopwordList {
    fn is_stopword(&self, word: &str) -> bool;
}

/// Canonicalizing transform applied to each surviving token.
pub trait Stem {
    fn stem(&self, word: &str) -> String;
}

/// English stopword list from the stop-words crate.
pub struct EnglishStopwords {
    words: HashSet<String>,
}

impl EnglishStopwords {
    pub fn new() -> Self {
        let words = get(LANGUAGE::English)
            .into_iter()
            .map(|s| s.to_lowercase())
            .collect();
        Self { words }
    }
}

impl Default for EnglishStopwords {
    fn default() -> Self {
        Self::new()
    }
}

impl StopwordList for EnglishStopwords {
    fn is_stopword(&self, word: &str) -> bool {
        self.words.contains(word)
    }
}

/// Empty stopword list, used when stopword removal is disabled.
pub struct NoStopwords;

impl StopwordList for NoStopwords {
    fn is_stopword(&self, _word: &str) -> bool {
        false
    }
}

/// Snowball stemmer from the rust-stemmers crate.
pub struct SnowballStemmer {
    inner: Stemmer,
}

impl SnowballStemmer {
    pub fn english() -> Self {
        Self {
            inner: Stemmer::create(Algorithm::English),
        }
    }
}

impl Stem for SnowballStemmer {
    fn stem(&self, word: &str) -> String {
        self.inner.stem(word).to_string()
    }
}

/// Pass-through stemmer, used when stemming is disabled.
pub struct IdentityStem;

impl Stem for IdentityStem {
    fn stem(&self, word: &str) -> String {
        word.to_string()
    }
}

/// Converts raw text into a line of space-joined canonical terms.
pub struct TextNormalizer {
    stopwords: Box<dyn StopwordList>,
    stemmer: Box<dyn Stem>,
    lowercase: bool,
}

impl TextNormalizer {
    /// Build a normalizer from configuration, with the production stopword
    /// list and stemmer.
    pub fn new(config: &NormalizerConfig) -> Self {
        let stopwords: Box<dyn StopwordList> = if config.remove_stopwords {
            Box::new(EnglishStopwords::new())
        } else {
            Box::new(NoStopwords)
        };
        let stemmer: Box<dyn Stem> = if config.stem {
            Box::new(SnowballStemmer::english())
        } else {
            Box::new(IdentityStem)
        };
        Self {
            stopwords,
            stemmer,
            lowercase: config.lowercase,
        }
    }

    /// Build a normalizer from explicit parts (fakes in tests).
    pub fn with_parts(stopwords: Box<dyn StopwordList>, stemmer: Box<dyn Stem>) -> Self {
        Self {
            stopwords,
            stemmer,
            lowercase: true,
        }
    }

    /// Normalize a line of text into space-joined terms.
    ///
    /// Structural lines (first token a Label) pass through verbatim,
    /// stripped, so the collection framing survives preprocessing. Returns
    /// an empty string when nothing survives filtering.
    pub fn normalize(&self, text: &str) -> Result<String> {
        let mut raw: Vec<String> = Vec::new();
        for token in tokenize(text) {
            match token.kind {
                TokenKind::Label => return Ok(text.trim().to_string()),
                TokenKind::Punctuation | TokenKind::Delimiter | TokenKind::Number => continue,
                TokenKind::ApostropheCarry => {
                    // The lexer rewrote this as "word 'tail"; split it back
                    // into its two constituent tokens.
                    raw.extend(token.text.split(' ').map(str::to_string));
                }
                _ => {
                    guard_numeric(&token.text)?;
                    raw.push(token.text);
                }
            }
        }

        let mut terms = Vec::with_capacity(raw.len());
        for token in raw {
            let lowered = if self.lowercase {
                token.to_lowercase()
            } else {
                token
            };
            if self.stopwords.is_stopword(&lowered) {
                continue;
            }
            terms.push(self.stemmer.stem(&lowered));
        }
        Ok(terms.join(" "))
    }
}

/// A purely numeric token here means the Number rule's boundary handling
/// broke; that is a contract violation, not an input problem.
fn guard_numeric(text: &str) -> Result<()> {
    if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        return Err(ScourError::UnfilteredNumber(text.to_string()));
    }
    Ok(())
}
