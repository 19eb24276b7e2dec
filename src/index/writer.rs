//! Persistence projections for the built index
//!
//! Each writer is a pure projection of in-memory state onto the
//! line-oriented file formats; no computation happens at write time.

use std::io::{BufRead, Write};

use tracing::debug;

use crate::index::{DocumentInfo, TermIndex, NEWLINE_PLACEHOLDER};
use crate::normalize::TextNormalizer;
use crate::Result;

/// Write the dictionary file: one `<term> <document_frequency>` line per
/// term, alphabetical.
pub fn write_dictionary<W: Write>(index: &TermIndex, out: &mut W) -> Result<()> {
    for (term, postings) in index.iter() {
        writeln!(out, "{} {}", term, postings.len())?;
    }
    Ok(())
}

/// Write the postings file: one `<doc_index> <term_frequency>` line per
/// posting, grouped by term in dictionary order.
pub fn write_postings<W: Write>(index: &TermIndex, out: &mut W) -> Result<()> {
    for (_, postings) in index.iter() {
        for posting in postings {
            writeln!(out, "{} {}", posting.doc_index, posting.term_freq)?;
        }
    }
    Ok(())
}

/// Write the document directory: one `<id> <title> <offset>` line per
/// document. Titles are line-internal here, so embedded newlines are
/// replaced with the placeholder (reversed on read).
pub fn write_docids<W: Write>(documents: &[DocumentInfo], out: &mut W) -> Result<()> {
    for doc in documents {
        writeln!(
            out,
            "{} {} {}",
            doc.doc_id,
            doc.title.replace('\n', NEWLINE_PLACEHOLDER),
            doc.text_start_offset
        )?;
    }
    Ok(())
}

/// Normalize a raw collection stream into the preprocessed file: one line
/// per input line, label lines verbatim, lines whose normalization comes out
/// empty omitted entirely. Returns the number of input lines consumed.
pub fn preprocess_collection<R: BufRead, W: Write>(
    normalizer: &TextNormalizer,
    input: R,
    out: &mut W,
) -> Result<usize> {
    let mut line_num = 0usize;
    for line in input.lines() {
        let line = line?;
        let processed = normalizer.normalize(&line)?;
        if !processed.is_empty() {
            writeln!(out, "{}", processed)?;
        }
        line_num += 1;
        if line_num % 10_000 == 0 {
            debug!(lines = line_num, "preprocessed");
        }
    }
    Ok(line_num)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::index_terms;
    use crate::normalize::{IdentityStem, NoStopwords};
    use std::io::Cursor;

    fn sample_index() -> TermIndex {
        let processed = "$DOC X\n$TEXT\nb a a\n$DOC Y\n$TEXT\na\n";
        index_terms(Cursor::new(processed)).unwrap()
    }

    #[test]
    fn test_write_dictionary_sorted() {
        let mut buf = Vec::new();
        write_dictionary(&sample_index(), &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "a 2\nb 1\n");
    }

    #[test]
    fn test_write_postings_grouped() {
        let mut buf = Vec::new();
        write_postings(&sample_index(), &mut buf).unwrap();
        // term "a": (0,2) (1,1); term "b": (0,1)
        assert_eq!(String::from_utf8(buf).unwrap(), "0 2\n1 1\n0 1\n");
    }

    #[test]
    fn test_write_docids_replaces_newlines() {
        let docs = vec![DocumentInfo {
            doc_id: "A-1".to_string(),
            title: "Two\nLines".to_string(),
            text_start_offset: 37,
        }];
        let mut buf = Vec::new();
        write_docids(&docs, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "A-1 Two__n__Lines 37\n");
    }

    #[test]
    fn test_preprocess_skips_empty_lines() {
        let normalizer =
            TextNormalizer::with_parts(Box::new(NoStopwords), Box::new(IdentityStem));
        let input = "$DOC A-1\n$TEXT\nHello World!\n42 , .\n";
        let mut buf = Vec::new();
        let lines = preprocess_collection(&normalizer, Cursor::new(input), &mut buf).unwrap();
        assert_eq!(lines, 4);
        // the all-filtered line "42 , ." produces no output line at all
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "$DOC A-1\n$TEXT\nhello world\n"
        );
    }
}
