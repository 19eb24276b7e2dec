//! Document directory lookups and on-demand body retrieval
//!
//! The store owns an open handle on the raw collection file for the whole of
//! its lifetime; `fetch_text` seeks into it, so it takes `&mut self` and the
//! single-consumer discipline is enforced by the borrow checker.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use crate::error::ScourError;
use crate::index::{DocumentInfo, NEWLINE_PLACEHOLDER};
use crate::lexer::DOC_MARKER;
use crate::Result;

/// Resolves document indices to ids/titles and fetches full document text.
#[derive(Debug)]
pub struct DocumentStore {
    entries: Vec<DocumentInfo>,
    offset_by_id: HashMap<String, u64>,
    collection: BufReader<File>,
}

impl DocumentStore {
    /// Open a store from the docids file and the raw collection file.
    pub fn open(docids_path: &Path, documents_path: &Path) -> Result<Self> {
        let entries = load_docids(docids_path)?;
        let collection = BufReader::new(File::open(documents_path)?);
        Ok(Self::from_parts(entries, collection))
    }

    fn from_parts(entries: Vec<DocumentInfo>, collection: BufReader<File>) -> Self {
        let offset_by_id = entries
            .iter()
            .map(|e| (e.doc_id.clone(), e.text_start_offset))
            .collect();
        Self {
            entries,
            offset_by_id,
            collection,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the external id and title for a document index.
    pub fn resolve(&self, doc_index: usize) -> Result<(&str, &str)> {
        let entry = self
            .entries
            .get(doc_index)
            .ok_or(ScourError::DocIndexOutOfRange {
                index: doc_index,
                count: self.entries.len(),
            })?;
        Ok((&entry.doc_id, &entry.title))
    }

    /// Read the full body text of a document by external id: seek to its
    /// stored offset and read forward until the next `$DOC` line or EOF.
    pub fn fetch_text(&mut self, doc_id: &str) -> Result<String> {
        let offset = *self
            .offset_by_id
            .get(doc_id)
            .ok_or_else(|| ScourError::DocumentNotFound(doc_id.to_string()))?;
        self.collection.seek(SeekFrom::Start(offset))?;

        let mut text = String::new();
        let mut line = String::new();
        loop {
            line.clear();
            if self.collection.read_line(&mut line)? == 0 {
                break;
            }
            if line.starts_with(DOC_MARKER) {
                break;
            }
            text.push_str(&line);
        }
        Ok(text)
    }
}

/// Parse the docids file. Each line is `<id> <title> <offset>`; the title may
/// itself contain spaces, so it is everything between the first and last
/// fields, with the newline placeholder reversed.
pub fn load_docids(path: &Path) -> Result<Vec<DocumentInfo>> {
    let reader = BufReader::new(File::open(path)?);
    let mut entries = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(' ').collect();
        if fields.len() < 2 {
            return Err(malformed(path, i + 1, "expected at least 2 fields"));
        }
        let doc_id = fields[0].to_string();
        let offset_raw = fields[fields.len() - 1];
        let text_start_offset = offset_raw.parse().map_err(|_| {
            malformed(
                path,
                i + 1,
                &format!("non-integer offset: '{}'", offset_raw),
            )
        })?;
        let title = fields[1..fields.len() - 1]
            .join(" ")
            .replace(NEWLINE_PLACEHOLDER, "\n");
        entries.push(DocumentInfo {
            doc_id,
            title,
            text_start_offset,
        });
    }
    Ok(entries)
}

fn malformed(path: &Path, line: usize, reason: &str) -> ScourError {
    ScourError::MalformedIndexFile {
        file: path.display().to_string(),
        line,
        reason: reason.to_string(),
    }
}
