//! PowerPoint extraction via the OOXML zip container.
//!
//! Reads `ppt/slides/slideN.xml` parts in slide order and pulls the text
//! runs (`<a:t>`) out of each slide, one line per paragraph. One record per
//! slide with a `"Slide <n>:"` header; slides with no textual content
//! beyond the header are dropped.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::Result;
use quick_xml::events::Event;
use quick_xml::Reader;

use kbase_core::error::Error;
use kbase_core::types::{FileType, Record, RecordMeta};

pub fn extract(path: &Path) -> Result<Vec<Record>> {
    let file = fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| Error::Extraction(format!("{}: {e}", path.display())))?;

    let mut slide_names: Vec<String> = archive
        .file_names()
        .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
        .map(String::from)
        .collect();
    slide_names.sort_by_key(|name| slide_part_number(name));

    let mut records = Vec::new();
    for (idx, name) in slide_names.iter().enumerate() {
        let slide_number = (idx + 1) as u32;
        let mut xml = String::new();
        archive
            .by_name(name)
            .map_err(|e| Error::Extraction(format!("{}: {e}", path.display())))?
            .read_to_string(&mut xml)?;

        let body = slide_text(&xml);
        // Header-only slides carry no retrievable text.
        if body.trim().is_empty() {
            continue;
        }

        let mut metadata = RecordMeta::for_file(path, FileType::Pptx);
        metadata.slide_number = Some(slide_number);
        records.push(Record::new(format!("Slide {slide_number}:\n{body}"), metadata));
    }
    Ok(records)
}

fn slide_part_number(name: &str) -> u32 {
    name.trim_start_matches("ppt/slides/slide")
        .trim_end_matches(".xml")
        .parse()
        .unwrap_or(0)
}

/// Collect the text runs of one slide, one line per `<a:p>` paragraph.
fn slide_text(xml: &str) -> String {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_run = true;
                }
            }
            Ok(Event::Text(e)) => {
                if in_text_run {
                    if let Ok(text) = e.unescape() {
                        current.push_str(&text);
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => {
                    if !current.trim().is_empty() {
                        lines.push(current.trim().to_string());
                    }
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }
    if !current.trim().is_empty() {
        lines.push(current.trim().to_string());
    }
    lines.join("\n")
}
