//! PDF extraction via lopdf.
//!
//! One record per page, unconditionally: a page whose text cannot be
//! extracted still produces a record with empty content, so page numbering
//! in an existing collection stays stable. (Presentations filter blank
//! slides; PDFs deliberately do not.)

use std::path::Path;

use anyhow::Result;
use lopdf::Document;
use tracing::debug;

use kbase_core::error::Error;
use kbase_core::types::{FileType, Record, RecordMeta};

pub fn extract(path: &Path) -> Result<Vec<Record>> {
    let doc = Document::load(path)
        .map_err(|e| Error::Extraction(format!("{}: {e}", path.display())))?;

    let mut records = Vec::new();
    for (&page_number, _) in doc.get_pages().iter() {
        let text = match doc.extract_text(&[page_number]) {
            Ok(text) => text,
            Err(e) => {
                debug!(page = page_number, "no text extracted: {e}");
                String::new()
            }
        };
        let mut metadata = RecordMeta::for_file(path, FileType::Pdf);
        metadata.page_number = Some(page_number);
        records.push(Record::new(text, metadata));
    }
    Ok(records)
}
