//! TF-IDF retrieval over the persisted dictionary and postings
//!
//! The engine is immutable once loaded. Queries are normalized with the same
//! pipeline the documents went through, weighted with `tf * log2(N/df)`, and
//! accumulated against each term's postings run; with normalization enabled
//! the result is cosine similarity.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::config::SearchConfig;
use crate::error::ScourError;
use crate::index::Posting;
use crate::normalize::TextNormalizer;
use crate::Result;

/// Dictionary record for one term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictionaryEntry {
    /// Number of distinct documents containing the term.
    pub document_frequency: u32,
    /// Start of the term's run in the postings list.
    pub postings_offset: usize,
}

/// Immutable query engine over a loaded index.
pub struct SearchEngine {
    num_docs: usize,
    dictionary: HashMap<String, DictionaryEntry>,
    postings: Vec<Posting>,
    normalizer: TextNormalizer,
    normalize_scores: bool,
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("num_docs", &self.num_docs)
            .field("dictionary", &self.dictionary)
            .field("postings", &self.postings)
            .field("normalize_scores", &self.normalize_scores)
            .finish_non_exhaustive()
    }
}

impl SearchEngine {
    /// Build an engine from dictionary entries in file order and the flat
    /// postings list. Offsets are a prefix sum over document frequencies;
    /// the document count is the number of distinct document indices in the
    /// postings.
    pub fn new(
        entries: Vec<(String, u32)>,
        postings: Vec<Posting>,
        normalizer: TextNormalizer,
        config: &SearchConfig,
    ) -> Result<Self> {
        let mut dictionary = HashMap::with_capacity(entries.len());
        let mut offset = 0usize;
        for (term, document_frequency) in entries {
            dictionary.insert(
                term,
                DictionaryEntry {
                    document_frequency,
                    postings_offset: offset,
                },
            );
            offset += document_frequency as usize;
        }
        if offset != postings.len() {
            return Err(ScourError::InconsistentIndex(format!(
                "dictionary document frequencies sum to {} but postings file has {} entries",
                offset,
                postings.len()
            )));
        }

        let distinct: HashSet<u32> = postings.iter().map(|p| p.doc_index).collect();
        let num_docs = distinct.len();
        if let Some(max) = postings.iter().map(|p| p.doc_index).max() {
            if max as usize + 1 != num_docs {
                return Err(ScourError::InconsistentIndex(format!(
                    "postings document indices are not dense: max {} over {} distinct",
                    max, num_docs
                )));
            }
        }

        Ok(Self {
            num_docs,
            dictionary,
            postings,
            normalizer,
            normalize_scores: config.normalize_scores,
        })
    }

    /// Load an engine from the dictionary and postings files.
    pub fn from_files(
        dictionary_path: &Path,
        postings_path: &Path,
        normalizer: TextNormalizer,
        config: &SearchConfig,
    ) -> Result<Self> {
        let entries = load_dictionary(dictionary_path)?;
        let postings = load_postings(postings_path)?;
        debug!(
            terms = entries.len(),
            postings = postings.len(),
            "index loaded"
        );
        Self::new(entries, postings, normalizer, config)
    }

    pub fn num_documents(&self) -> usize {
        self.num_docs
    }

    /// Score the query against every document in the collection.
    ///
    /// Returns all documents sorted by descending score; documents sharing
    /// no term with the query score exactly 0.0 and are retained. Query
    /// terms missing from the dictionary contribute nothing.
    pub fn retrieve(&self, query: &str) -> Result<Vec<(usize, f64)>> {
        let normalized = self.normalizer.normalize(query)?;
        let mut query_tf: HashMap<&str, u32> = HashMap::new();
        for term in normalized.split(' ').filter(|t| !t.is_empty()) {
            *query_tf.entry(term).or_insert(0) += 1;
        }

        let mut similarities = vec![0.0f64; self.num_docs];
        let mut doc_norms = vec![0.0f64; self.num_docs];
        let mut query_norm = 0.0f64;

        for (term, tf_q) in &query_tf {
            let entry = match self.dictionary.get(*term) {
                Some(entry) => entry,
                None => continue,
            };
            // idf is shared by the query weight and every document weight
            // for this term
            let idf = (self.num_docs as f64 / entry.document_frequency as f64).log2();
            let w_q = *tf_q as f64 * idf;
            query_norm += w_q * w_q;

            // Walk the term's postings run; it is sorted by ascending
            // document index, so this is the sparse half of a sorted-merge
            // against the dense 0..N document range.
            let start = entry.postings_offset;
            let end = start + entry.document_frequency as usize;
            for posting in &self.postings[start..end] {
                let w_d = posting.term_freq as f64 * idf;
                similarities[posting.doc_index as usize] += w_q * w_d;
                doc_norms[posting.doc_index as usize] += w_d * w_d;
            }
        }

        if self.normalize_scores {
            for (sim, norm) in similarities.iter_mut().zip(&doc_norms) {
                // untouched documents stay at zero; no division by zero
                if *sim > 0.0 {
                    *sim /= (query_norm * norm).sqrt();
                }
            }
        }

        let mut results: Vec<(usize, f64)> = similarities.into_iter().enumerate().collect();
        results.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(results)
    }
}

/// Parse the dictionary file into (term, document_frequency) pairs in file
/// order.
pub fn load_dictionary(path: &Path) -> Result<Vec<(String, u32)>> {
    let reader = BufReader::new(File::open(path)?);
    let mut entries = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split(' ');
        let term = fields.next().unwrap_or_default();
        let df = parse_count(path, i + 1, fields.next(), "document frequency")?;
        if fields.next().is_some() {
            return Err(malformed(path, i + 1, "expected 2 fields"));
        }
        if df == 0 {
            return Err(malformed(path, i + 1, "zero document frequency"));
        }
        entries.push((term.to_string(), df));
    }
    Ok(entries)
}

/// Parse the postings file into the flat postings list.
pub fn load_postings(path: &Path) -> Result<Vec<Posting>> {
    let reader = BufReader::new(File::open(path)?);
    let mut postings = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split(' ');
        let doc_index = parse_count(path, i + 1, fields.next(), "document index")?;
        let term_freq = parse_count(path, i + 1, fields.next(), "term frequency")?;
        if fields.next().is_some() {
            return Err(malformed(path, i + 1, "expected 2 fields"));
        }
        postings.push(Posting {
            doc_index,
            term_freq,
        });
    }
    Ok(postings)
}

fn parse_count(path: &Path, line: usize, field: Option<&str>, what: &str) -> Result<u32> {
    let raw = field.ok_or_else(|| malformed(path, line, &format!("missing {}", what)))?;
    raw.parse()
        .map_err(|_| malformed(path, line, &format!("non-integer {}: '{}'", what, raw)))
}

fn malformed(path: &Path, line: usize, reason: &str) -> ScourError {
    ScourError::MalformedIndexFile {
        file: path.display().to_string(),
        line,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{IdentityStem, NoStopwords, Stem, StopwordList};

    fn plain_normalizer() -> TextNormalizer {
        TextNormalizer::with_parts(Box::new(NoStopwords), Box::new(IdentityStem))
    }

    fn posting(doc_index: u32, term_freq: u32) -> Posting {
        Posting {
            doc_index,
            term_freq,
        }
    }

    /// apple in docs 0 (x1) and 1 (x2); zebra in doc 2 only.
    fn three_doc_engine(normalize_scores: bool) -> SearchEngine {
        SearchEngine::new(
            vec![("apple".to_string(), 2), ("zebra".to_string(), 1)],
            vec![posting(0, 1), posting(1, 2), posting(2, 1)],
            plain_normalizer(),
            &SearchConfig { normalize_scores },
        )
        .unwrap()
    }

    #[test]
    fn test_doc_count_from_postings() {
        assert_eq!(three_doc_engine(false).num_documents(), 3);
    }

    #[test]
    fn test_double_frequency_doubles_raw_score() {
        let engine = three_doc_engine(false);
        let results = engine.retrieve("apple").unwrap();
        let score_of = |doc: usize| {
            results
                .iter()
                .find(|(d, _)| *d == doc)
                .map(|(_, s)| *s)
                .unwrap()
        };
        assert!(score_of(0) > 0.0);
        assert!((score_of(1) - 2.0 * score_of(0)).abs() < 1e-12);
        assert_eq!(score_of(2), 0.0);
        // best match first
        assert_eq!(results[0].0, 1);
    }

    #[test]
    fn test_cosine_of_pure_match_is_one() {
        // doc 0 contains the queried term and nothing else
        let engine = SearchEngine::new(
            vec![("apple".to_string(), 1), ("other".to_string(), 1)],
            vec![posting(0, 3), posting(1, 1)],
            plain_normalizer(),
            &SearchConfig {
                normalize_scores: true,
            },
        )
        .unwrap();
        let results = engine.retrieve("apple").unwrap();
        assert_eq!(results[0].0, 0);
        assert!((results[0].1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_terms_ignored() {
        let engine = three_doc_engine(true);
        let with_noise = engine.retrieve("apple nonexistent").unwrap();
        // unknown term adds nothing to any document weight; the query norm
        // is also untouched because the term never enters the accumulation
        let without = engine.retrieve("apple").unwrap();
        assert_eq!(with_noise, without);
    }

    #[test]
    fn test_all_unknown_query_all_zero() {
        let engine = three_doc_engine(true);
        let results = engine.retrieve("nonexistent missing").unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|(_, s)| *s == 0.0));
        let mut indices: Vec<usize> = results.iter().map(|(d, _)| *d).collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_and_stopword_only_queries() {
        let engine = three_doc_engine(true);
        assert!(engine.retrieve("").unwrap().iter().all(|(_, s)| *s == 0.0));

        struct AllStop;
        impl StopwordList for AllStop {
            fn is_stopword(&self, _: &str) -> bool {
                true
            }
        }
        let engine = SearchEngine::new(
            vec![("apple".to_string(), 1)],
            vec![posting(0, 1)],
            TextNormalizer::with_parts(Box::new(AllStop), Box::new(IdentityStem)),
            &SearchConfig {
                normalize_scores: true,
            },
        )
        .unwrap();
        let results = engine.retrieve("apple apple").unwrap();
        assert!(results.iter().all(|(_, s)| *s == 0.0));
    }

    #[test]
    fn test_repeated_query_term_raises_query_tf() {
        let engine = three_doc_engine(false);
        let once = engine.retrieve("apple").unwrap();
        let twice = engine.retrieve("apple apple").unwrap();
        let score = |rs: &[(usize, f64)], doc: usize| {
            rs.iter().find(|(d, _)| *d == doc).map(|(_, s)| *s).unwrap()
        };
        // raw similarity scales linearly with query term frequency
        assert!((score(&twice, 1) - 2.0 * score(&once, 1)).abs() < 1e-12);
    }

    #[test]
    fn test_frequency_sum_mismatch_rejected() {
        let err = SearchEngine::new(
            vec![("apple".to_string(), 2)],
            vec![posting(0, 1)],
            plain_normalizer(),
            &SearchConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ScourError::InconsistentIndex(_)));
    }

    #[test]
    fn test_sparse_doc_indices_rejected() {
        let err = SearchEngine::new(
            vec![("apple".to_string(), 2)],
            vec![posting(0, 1), posting(2, 1)],
            plain_normalizer(),
            &SearchConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ScourError::InconsistentIndex(_)));
    }

    /// A custom stemmer must apply to the query exactly as it did to
    /// documents at index time.
    #[test]
    fn test_query_goes_through_stemming() {
        struct ChopS;
        impl Stem for ChopS {
            fn stem(&self, word: &str) -> String {
                word.strip_suffix('s').unwrap_or(word).to_string()
            }
        }
        let engine = SearchEngine::new(
            vec![("apple".to_string(), 1), ("pear".to_string(), 1)],
            vec![posting(0, 1), posting(1, 1)],
            TextNormalizer::with_parts(Box::new(NoStopwords), Box::new(ChopS)),
            &SearchConfig {
                normalize_scores: true,
            },
        )
        .unwrap();
        let results = engine.retrieve("apples").unwrap();
        assert_eq!(results[0].0, 0);
        assert!(results[0].1 > 0.0);
    }
}
