//! Term indexing pass: preprocessed lines -> dictionary + postings

use std::collections::BTreeMap;
use std::io::BufRead;

use crate::error::ScourError;
use crate::lexer::{DOC_MARKER, TEXT_MARKER, TITLE_MARKER};
use crate::Result;

/// One term occurrence record: which document and how many times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub doc_index: u32,
    pub term_freq: u32,
}

/// In-memory inverted index: term -> postings run.
///
/// Terms iterate in alphabetical order (BTreeMap), which fixes the persisted
/// dictionary and postings order. Within a run, postings are in ascending
/// document order because documents are scanned in index order.
#[derive(Debug, Default)]
pub struct TermIndex {
    terms: BTreeMap<String, Vec<Posting>>,
    num_documents: usize,
}

impl TermIndex {
    /// Iterate terms alphabetically with their postings runs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Posting])> {
        self.terms.iter().map(|(t, p)| (t.as_str(), p.as_slice()))
    }

    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        self.terms.get(term).map(|p| p.as_slice())
    }

    pub fn num_documents(&self) -> usize {
        self.num_documents
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn num_postings(&self) -> usize {
        self.terms.values().map(|p| p.len()).sum()
    }
}

/// Build a [`TermIndex`] from the preprocessed collection stream.
///
/// The document cursor advances on every `$DOC` line; `$TITLE` and `$TEXT`
/// lines carry no term content and are skipped. For each term on a content
/// line, either the tail posting (same document) is bumped or a fresh
/// `(doc_index, 1)` posting is appended.
pub fn index_terms<R: BufRead>(reader: R) -> Result<TermIndex> {
    let mut terms: BTreeMap<String, Vec<Posting>> = BTreeMap::new();
    let mut current_doc: Option<u32> = None;
    let mut num_documents: u32 = 0;

    for line in reader.lines() {
        let line = line?;
        if line.starts_with(DOC_MARKER) {
            current_doc = Some(num_documents);
            num_documents += 1;
            continue;
        }
        if line.starts_with(TITLE_MARKER) || line.starts_with(TEXT_MARKER) {
            continue;
        }
        let doc_index = current_doc.ok_or_else(|| {
            ScourError::MalformedCollection(
                "content line before any $DOC marker".to_string(),
            )
        })?;
        for term in line.trim().split(' ') {
            if term.is_empty() {
                continue;
            }
            let postings = terms.entry(term.to_string()).or_default();
            match postings.last_mut() {
                Some(last) if last.doc_index == doc_index => last.term_freq += 1,
                _ => postings.push(Posting {
                    doc_index,
                    term_freq: 1,
                }),
            }
        }
    }

    Ok(TermIndex {
        terms,
        num_documents: num_documents as usize,
    })
}
