//! Document indexing pass: raw collection -> document directory

use std::io::BufRead;

use crate::error::ScourError;
use crate::lexer::{DOC_MARKER, TEXT_MARKER, TITLE_MARKER};
use crate::Result;

/// Directory entry for one document, in collection-scan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    /// Stable external id from the `$DOC` line.
    pub doc_id: String,
    /// Title text; may contain embedded newlines.
    pub title: String,
    /// Byte offset into the raw collection where the body starts
    /// (immediately after the `$TEXT` line).
    pub text_start_offset: u64,
}

/// Scan the raw collection and build the document directory.
///
/// The reader must be positioned at the start of the collection; offsets are
/// counted in bytes from there. A document record is finalized when its
/// `$TEXT` marker is reached, at which point the id, the accumulated title
/// (trailing newline removed) and the current stream position are known.
pub fn index_docs<R: BufRead>(reader: &mut R) -> Result<Vec<DocumentInfo>> {
    let mut index = Vec::new();
    let mut doc_id: Option<String> = None;
    let mut title = String::new();
    let mut building_title = false;
    let mut offset: u64 = 0;
    let mut line = String::new();

    loop {
        line.clear();
        let n = reader.read_line(&mut line)?;
        if n == 0 {
            break;
        }
        offset += n as u64;

        if line.starts_with(DOC_MARKER) {
            let id = line
                .trim()
                .split(' ')
                .nth(1)
                .ok_or_else(|| {
                    ScourError::MalformedCollection(format!(
                        "$DOC line without a document id at byte {}",
                        offset - n as u64
                    ))
                })?
                .to_string();
            doc_id = Some(id);
        } else if line.starts_with(TITLE_MARKER) {
            building_title = true;
        } else if line.starts_with(TEXT_MARKER) {
            let id = doc_id.clone().ok_or_else(|| {
                ScourError::MalformedCollection(
                    "$TEXT marker before any $DOC marker".to_string(),
                )
            })?;
            let finished = title.strip_suffix('\n').unwrap_or(&title).to_string();
            index.push(DocumentInfo {
                doc_id: id,
                title: finished,
                text_start_offset: offset,
            });
            building_title = false;
            title.clear();
        } else if building_title {
            title.push_str(&line);
        }
    }

    Ok(index)
}
