use thiserror::Error;

/// Main error type for Scour operations
#[derive(Error, Debug)]
pub enum ScourError {
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Document index out of range: {index} (collection has {count} documents)")]
    DocIndexOutOfRange { index: usize, count: usize },

    #[error("Malformed collection: {0}")]
    MalformedCollection(String),

    #[error("Malformed index file {file}, line {line}: {reason}")]
    MalformedIndexFile {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("Inconsistent index: {0}")]
    InconsistentIndex(String),

    #[error("Numeric token '{0}' reached term emission; lexer/normalizer contract broken")]
    UnfilteredNumber(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Scour operations
pub type Result<T> = std::result::Result<T, ScourError>;

impl ScourError {
    /// True for errors that indicate corrupt on-disk index state rather
    /// than a bad request, i.e. the index should be rebuilt.
    pub fn is_index_corruption(&self) -> bool {
        matches!(
            self,
            ScourError::MalformedIndexFile { .. }
                | ScourError::MalformedCollection(_)
                | ScourError::InconsistentIndex(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScourError::DocumentNotFound("LA123".to_string());
        assert_eq!(err.to_string(), "Document not found: LA123");

        let err = ScourError::MalformedIndexFile {
            file: "dictionary.txt".to_string(),
            line: 7,
            reason: "expected 2 fields".to_string(),
        };
        assert!(err.to_string().contains("line 7"));
    }

    #[test]
    fn test_index_corruption_classification() {
        assert!(ScourError::MalformedCollection("x".to_string()).is_index_corruption());
        assert!(!ScourError::DocumentNotFound("x".to_string()).is_index_corruption());
    }
}
