//! Boundary-preferring text splitting.
//!
//! Splits record content into bounded, overlapping segments: paragraph
//! breaks first, then line breaks, then whitespace, then arbitrary character
//! positions, so a chunk ends on the widest boundary that keeps it under the
//! size budget. Adjacent chunks share up to `chunk_overlap` characters of
//! boundary-aligned trailing context.

use std::collections::VecDeque;

use anyhow::Result;
use tracing::debug;

use kbase_core::error::Error;
use kbase_core::types::Record;

/// Process-wide default segment length, in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 500;
/// Process-wide default overlap, in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

/// Widest to narrowest. The empty separator means "split anywhere".
const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Recursive character splitter. Splitting a string is total; construction
/// is the only fallible step.
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 || chunk_overlap >= chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})"
            ))
            .into());
        }
        Ok(Self { chunk_size, chunk_overlap })
    }

    /// Split `text` into segments of at most `chunk_size` characters.
    /// Content that already fits (including empty content) comes back as a
    /// single unchanged segment.
    pub fn split(&self, text: &str) -> Vec<String> {
        if char_len(text) <= self.chunk_size {
            return vec![text.to_string()];
        }
        self.split_with(text, &SEPARATORS)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        // Pick the widest separator actually present; the empty separator is
        // the unconditional last resort.
        let (sep_idx, sep) = separators
            .iter()
            .enumerate()
            .find(|(_, s)| s.is_empty() || text.contains(**s))
            .map(|(i, s)| (i, *s))
            .unwrap_or((separators.len() - 1, ""));
        let narrower = &separators[sep_idx + 1..];

        let pieces: Vec<String> = if sep.is_empty() {
            text.chars().map(|c| c.to_string()).collect()
        } else {
            text.split(sep).map(str::to_string).collect()
        };

        let mut out = Vec::new();
        let mut fitting: Vec<String> = Vec::new();
        for piece in pieces {
            if char_len(&piece) <= self.chunk_size {
                fitting.push(piece);
            } else {
                if !fitting.is_empty() {
                    out.extend(self.merge(&fitting, sep));
                    fitting.clear();
                }
                if narrower.is_empty() {
                    out.push(piece);
                } else {
                    out.extend(self.split_with(&piece, narrower));
                }
            }
        }
        if !fitting.is_empty() {
            out.extend(self.merge(&fitting, sep));
        }
        out
    }

    /// Greedily pack already-fitting pieces into chunks, carrying a trailing
    /// window of at most `chunk_overlap` characters into the next chunk.
    fn merge(&self, pieces: &[String], sep: &str) -> Vec<String> {
        let sep_len = char_len(sep);
        let mut chunks = Vec::new();
        let mut window: VecDeque<&String> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let piece_len = char_len(piece);
            let joiner = if window.is_empty() { 0 } else { sep_len };
            if total + piece_len + joiner > self.chunk_size && !window.is_empty() {
                if let Some(chunk) = join_window(&window, sep) {
                    chunks.push(chunk);
                }
                // Shrink from the front until the retained tail fits the
                // overlap budget and leaves room for the incoming piece.
                while total > self.chunk_overlap
                    || (total + piece_len + if window.is_empty() { 0 } else { sep_len }
                        > self.chunk_size
                        && total > 0)
                {
                    let head = match window.pop_front() {
                        Some(h) => h,
                        None => break,
                    };
                    total -= char_len(head) + if window.is_empty() { 0 } else { sep_len };
                }
            }
            window.push_back(piece);
            total += piece_len + if window.len() > 1 { sep_len } else { 0 };
        }
        if let Some(chunk) = join_window(&window, sep) {
            chunks.push(chunk);
        }
        chunks
    }
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

fn join_window(window: &VecDeque<&String>, sep: &str) -> Option<String> {
    let joined = window
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(sep);
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Splits each input record into chunk records with inherited metadata and
/// a contiguous `chunk_index` per source record.
pub struct Chunker {
    splitter: TextSplitter,
}

impl Chunker {
    pub fn new() -> Self {
        Self { splitter: TextSplitter::default() }
    }

    pub fn with_limits(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        Ok(Self { splitter: TextSplitter::new(chunk_size, chunk_overlap)? })
    }

    pub fn chunk(&self, records: &[Record]) -> Vec<Record> {
        let mut out = Vec::new();
        for record in records {
            let pieces = self.splitter.split(&record.content);
            debug!(
                source = %record.metadata.source,
                chunks = pieces.len(),
                "chunked record"
            );
            for (idx, piece) in pieces.into_iter().enumerate() {
                let mut metadata = record.metadata.clone();
                metadata.chunk_index = Some(idx as u32);
                out.push(Record::new(piece, metadata));
            }
        }
        out
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new()
    }
}
