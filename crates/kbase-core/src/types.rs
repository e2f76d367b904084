//! Domain types flowing through the ingestion and retrieval pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The document formats the extractor understands, dispatched by file
/// extension. Anything else is rejected up front with
/// [`Error::UnsupportedType`] rather than falling through a default branch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Docx,
    Pptx,
    Pdf,
    Txt,
}

/// Accepted file extensions, used for dispatch and error messages.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["docx", "pptx", "pdf", "txt"];

impl FileType {
    /// Map an extension (without the dot, any case) to a variant.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "docx" => Some(Self::Docx),
            "pptx" => Some(Self::Pptx),
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }

    /// Classify a path by its extension, or fail naming the allowed set.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(ext).ok_or_else(|| {
            Error::UnsupportedType(format!(
                "Unsupported file type: .{}. Supported types: {}",
                ext,
                SUPPORTED_EXTENSIONS
                    .iter()
                    .map(|e| format!(".{e}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Pptx => "pptx",
            Self::Pdf => "pdf",
            Self::Txt => "txt",
        }
    }
}

/// Metadata attached to every record. Field names double as the wire-level
/// metadata keys for any serialized export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordMeta {
    pub source: String,
    pub file_type: FileType,
    pub file_path: String,
    /// 1-based, presentation slides only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slide_number: Option<u32>,
    /// 1-based, PDF pages only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    /// 0-based position within the chunks of one source record, set by the
    /// chunker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<u32>,
}

impl RecordMeta {
    /// Base metadata for a freshly extracted file.
    pub fn for_file(path: &Path, file_type: FileType) -> Self {
        Self {
            source: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            file_type,
            file_path: path.to_string_lossy().to_string(),
            slide_number: None,
            page_number: None,
            chunk_index: None,
        }
    }
}

/// A unit of text plus metadata. Transformation always produces new records;
/// content is never mutated in place and metadata is cloned, never aliased.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub content: String,
    pub metadata: RecordMeta,
}

impl Record {
    pub fn new(content: impl Into<String>, metadata: RecordMeta) -> Self {
        Self { content: content.into(), metadata }
    }
}

/// Best-effort snapshot of a persisted collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub collection_name: String,
    pub document_count: usize,
    pub embedding_model: String,
}

/// One hit in the query tool contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentHit {
    pub content: String,
    pub source: String,
    pub page: u32,
    pub score: f32,
}

/// Successful query tool response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub success: bool,
    pub query: String,
    pub results_count: usize,
    pub documents: Vec<DocumentHit>,
    pub note: String,
}

impl QueryResponse {
    pub fn from_hits(query: &str, documents: Vec<DocumentHit>) -> Self {
        Self {
            success: true,
            query: query.to_string(),
            results_count: documents.len(),
            documents,
            note: "Summarize based on the returned documents; avoid repeated \
                   searches if cross-references are present."
                .to_string(),
        }
    }
}

/// Successful info tool response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    pub success: bool,
    pub document_count: usize,
    pub vector_store_path: String,
    pub embedding_model: String,
    pub database: String,
    pub collection_name: String,
}

/// Failure shape shared by both tool contracts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolFailure {
    pub success: bool,
    pub error: String,
}

impl ToolFailure {
    pub fn new(error: impl std::fmt::Display) -> Self {
        Self { success: false, error: error.to_string() }
    }
}
