use std::path::Path;

use kbase_chunk::{Chunker, TextSplitter};
use kbase_core::types::{FileType, Record, RecordMeta};

fn meta() -> RecordMeta {
    RecordMeta::for_file(Path::new("/data/notes.txt"), FileType::Txt)
}

/// Distinct words so suffix/prefix matching in the overlap checks cannot
/// accidentally over-match.
fn word_soup(n: usize) -> String {
    (0..n).map(|i| format!("w{i:03}")).collect::<Vec<_>>().join(" ")
}

#[test]
fn overlap_must_be_smaller_than_size() {
    assert!(TextSplitter::new(100, 10).is_ok());
    assert!(TextSplitter::new(50, 50).is_err());
    assert!(TextSplitter::new(50, 60).is_err());
    assert!(TextSplitter::new(0, 0).is_err());
}

#[test]
fn short_content_is_a_single_unchanged_chunk() {
    let chunker = Chunker::with_limits(100, 20).expect("chunker");
    let source = Record::new("a short note", meta());
    let chunks = chunker.chunk(&[source.clone()]);

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].content, "a short note");
    assert_eq!(chunks[0].metadata.chunk_index, Some(0));
    assert_eq!(chunks[0].metadata.source, source.metadata.source);
}

#[test]
fn empty_content_is_a_single_chunk() {
    let chunker = Chunker::new();
    let chunks = chunker.chunk(&[Record::new("", meta())]);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].content, "");
    assert_eq!(chunks[0].metadata.chunk_index, Some(0));
}

#[test]
fn long_content_yields_contiguous_indices_and_bounded_chunks() {
    let chunk_size = 60;
    let chunker = Chunker::with_limits(chunk_size, 12).expect("chunker");
    let source = Record::new(word_soup(120), meta());
    let chunks = chunker.chunk(&[source.clone()]);

    assert!(chunks.len() > 1, "long content must split");
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.metadata.chunk_index, Some(i as u32));
        assert!(
            chunk.content.chars().count() <= chunk_size,
            "chunk {i} exceeds the size budget"
        );
        // Everything except chunk_index is inherited verbatim.
        let mut expected = source.metadata.clone();
        expected.chunk_index = chunk.metadata.chunk_index;
        assert_eq!(chunk.metadata, expected);
    }
}

#[test]
fn sibling_metadata_is_independent() {
    let chunker = Chunker::with_limits(40, 8).expect("chunker");
    let mut chunks = chunker.chunk(&[Record::new(word_soup(40), meta())]);
    assert!(chunks.len() > 1);

    chunks[0].metadata.source = "mutated".to_string();
    assert_eq!(chunks[1].metadata.source, "notes.txt");
}

/// Longest suffix of `prev` that is a prefix of `next`, in characters.
fn shared_overlap(prev: &str, next: &str) -> usize {
    let prev_chars: Vec<char> = prev.chars().collect();
    let next_chars: Vec<char> = next.chars().collect();
    let max = prev_chars.len().min(next_chars.len());
    (0..=max)
        .rev()
        .find(|&m| prev_chars[prev_chars.len() - m..] == next_chars[..m])
        .unwrap_or(0)
}

#[test]
fn adjacent_chunks_share_bounded_overlap() {
    let overlap = 12;
    let chunker = Chunker::with_limits(50, overlap).expect("chunker");
    let chunks = chunker.chunk(&[Record::new(word_soup(80), meta())]);
    assert!(chunks.len() > 2);

    let mut saw_overlap = false;
    for pair in chunks.windows(2) {
        let m = shared_overlap(&pair[0].content, &pair[1].content);
        assert!(m <= overlap, "overlap {m} exceeds the budget");
        if m > 0 {
            saw_overlap = true;
        }
    }
    assert!(saw_overlap, "word-sized pieces should carry overlap");
}

#[test]
fn paragraph_boundaries_are_preferred() {
    let chunker = Chunker::with_limits(40, 8).expect("chunker");
    let text = format!("{}\n\n{}", word_soup(5), word_soup(5));
    // Two paragraphs that each fit: the split lands on the paragraph break,
    // not mid-paragraph.
    let chunks = chunker.chunk(&[Record::new(text, meta())]);
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].content, word_soup(5));
    assert_eq!(chunks[1].content, word_soup(5));
}

#[test]
fn chunks_reconstruct_the_source_modulo_whitespace() {
    let chunker = Chunker::with_limits(70, 15).expect("chunker");
    let original = format!(
        "{}\n\n{}\n{}",
        word_soup(30),
        (30..55).map(|i| format!("w{i:03}")).collect::<Vec<_>>().join(" "),
        (55..80).map(|i| format!("w{i:03}")).collect::<Vec<_>>().join(" "),
    );
    let chunks = chunker.chunk(&[Record::new(original.clone(), meta())]);
    assert!(chunks.len() > 1);

    let mut rebuilt = chunks[0].content.clone();
    for chunk in &chunks[1..] {
        let m = shared_overlap(&rebuilt, &chunk.content);
        let remainder: String = chunk.content.chars().skip(m).collect();
        if m == 0 {
            rebuilt.push(' ');
        }
        rebuilt.push_str(&remainder);
    }

    let original_words: Vec<&str> = original.split_whitespace().collect();
    let rebuilt_words: Vec<&str> = rebuilt.split_whitespace().collect();
    assert_eq!(rebuilt_words, original_words);
}
