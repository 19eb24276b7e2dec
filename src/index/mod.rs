//! Inverted index construction
//!
//! Two independent passes over the collection: a term pass over the
//! preprocessed stream and a document pass over the raw stream. Both count
//! documents off the same `$DOC` markers, so their document indices line up;
//! [`build_index`] checks that explicitly after the fact.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use tracing::info;

use crate::config::IndexPaths;
use crate::error::ScourError;
use crate::Result;

pub mod doc_index;
pub mod term_index;
pub mod writer;

pub use doc_index::{index_docs, DocumentInfo};
pub use term_index::{index_terms, Posting, TermIndex};
pub use writer::{preprocess_collection, write_dictionary, write_docids, write_postings};

/// Replaces embedded title newlines in the line-oriented docids file.
pub const NEWLINE_PLACEHOLDER: &str = "__n__";

/// Counts reported after a successful index build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSummary {
    pub num_documents: usize,
    pub num_terms: usize,
    pub num_postings: usize,
}

/// Run both index passes and persist the dictionary, postings and document
/// directory files. Expects the preprocessed collection to exist already
/// (see [`preprocess_collection`]).
pub fn build_index(paths: &IndexPaths) -> Result<IndexSummary> {
    let processed = BufReader::new(File::open(&paths.processed)?);
    let term_index = index_terms(processed)?;

    let mut raw = BufReader::new(File::open(&paths.documents)?);
    let documents = index_docs(&mut raw)?;

    // Both passes derive document indices from the same ordered $DOC scan;
    // a mismatch means the two input files disagree.
    if term_index.num_documents() != documents.len() {
        return Err(ScourError::MalformedCollection(format!(
            "term pass saw {} documents but document pass saw {}",
            term_index.num_documents(),
            documents.len()
        )));
    }

    let mut out = BufWriter::new(File::create(&paths.dictionary)?);
    write_dictionary(&term_index, &mut out)?;
    out.flush()?;

    let mut out = BufWriter::new(File::create(&paths.postings)?);
    write_postings(&term_index, &mut out)?;
    out.flush()?;

    let mut out = BufWriter::new(File::create(&paths.docids)?);
    write_docids(&documents, &mut out)?;
    out.flush()?;

    let summary = IndexSummary {
        num_documents: documents.len(),
        num_terms: term_index.num_terms(),
        num_postings: term_index.num_postings(),
    };
    info!(
        documents = summary.num_documents,
        terms = summary.num_terms,
        postings = summary.num_postings,
        "index written"
    );
    Ok(summary)
}
