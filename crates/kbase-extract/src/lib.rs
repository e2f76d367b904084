//! Per-format text extraction.
//!
//! Converts a file at a given path into zero or more [`Record`]s, dispatched
//! by extension through the closed [`FileType`] variant. Single-file
//! extraction returns explicit errors; the directory batch logs and skips
//! failed files so one corrupt document never aborts the rest.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, warn};
use walkdir::WalkDir;

use kbase_core::types::{FileType, Record};

mod docx;
mod pdf;
mod pptx;
mod text;

/// Extract a single file, dispatched by its extension.
///
/// Fails with [`kbase_core::error::Error::UnsupportedType`] for unknown
/// extensions (a configuration error, not a transient one) and with the
/// underlying parse/IO error for anything else.
pub fn extract_file(path: &Path) -> Result<Vec<Record>> {
    let file_type = FileType::from_path(path)?;
    debug!(path = %path.display(), file_type = file_type.as_str(), "extracting");
    match file_type {
        FileType::Docx => docx::extract(path),
        FileType::Pptx => pptx::extract(path),
        FileType::Pdf => pdf::extract(path),
        FileType::Txt => text::extract(path),
    }
}

/// Extract every supported file in the immediate entries of `dir`
/// (non-recursive). Partial success is the contract: a file that fails to
/// extract is logged at `warn` and contributes nothing.
pub fn extract_dir(dir: &Path) -> Result<Vec<Record>> {
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|p| FileType::from_path(p).is_ok())
        .collect();
    paths.sort();

    let mut records = Vec::new();
    for path in &paths {
        match extract_file(path) {
            Ok(extracted) => records.extend(extracted),
            Err(e) => warn!(path = %path.display(), "skipping file: {e:#}"),
        }
    }
    Ok(records)
}
