use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File locations for one built index and its source collection.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexPaths {
    /// Raw collection file ($DOC/$TITLE/$TEXT framed).
    pub documents: PathBuf,
    /// Normalized collection file produced by the preprocess pass.
    pub processed: PathBuf,
    /// Term -> document frequency, sorted alphabetically.
    pub dictionary: PathBuf,
    /// (doc_index, term_frequency) pairs grouped by term.
    pub postings: PathBuf,
    /// Per-document (id, title, text offset) directory.
    pub docids: PathBuf,
}

impl Default for IndexPaths {
    fn default() -> Self {
        Self {
            documents: PathBuf::from("documents.txt"),
            processed: PathBuf::from("documents.processed"),
            dictionary: PathBuf::from("dictionary.txt"),
            postings: PathBuf::from("postings.txt"),
            docids: PathBuf::from("docids.txt"),
        }
    }
}

impl IndexPaths {
    /// All five paths resolved relative to a base directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let defaults = Self::default();
        Self {
            documents: dir.join(defaults.documents),
            processed: dir.join(defaults.processed),
            dictionary: dir.join(defaults.dictionary),
            postings: dir.join(defaults.postings),
            docids: dir.join(defaults.docids),
        }
    }
}

/// Normalizer configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NormalizerConfig {
    pub lowercase: bool,
    pub remove_stopwords: bool,
    pub stem: bool,
    pub language: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            remove_stopwords: true,
            stem: true,
            language: "english".to_string(),
        }
    }
}

/// Query-time configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Divide similarities by sqrt(query_norm * doc_norm) (cosine).
    pub normalize_scores: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            normalize_scores: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let paths = IndexPaths::default();
        assert_eq!(paths.documents, PathBuf::from("documents.txt"));
        assert_eq!(paths.dictionary, PathBuf::from("dictionary.txt"));

        let norm = NormalizerConfig::default();
        assert!(norm.lowercase);
        assert!(norm.stem);

        assert!(SearchConfig::default().normalize_scores);
    }

    #[test]
    fn test_paths_in_dir() {
        let paths = IndexPaths::in_dir("/tmp/idx");
        assert_eq!(paths.postings, PathBuf::from("/tmp/idx/postings.txt"));
        assert_eq!(paths.docids, PathBuf::from("/tmp/idx/docids.txt"));
    }
}
