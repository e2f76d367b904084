//! Plain-text extraction: the whole file as one record.

use std::fs;
use std::path::Path;

use anyhow::Result;

use kbase_core::types::{FileType, Record, RecordMeta};

pub fn extract(path: &Path) -> Result<Vec<Record>> {
    // Strict UTF-8; a decode failure is an extraction failure for this file.
    let content = fs::read_to_string(path)?;
    Ok(vec![Record::new(content, RecordMeta::for_file(path, FileType::Txt))])
}
