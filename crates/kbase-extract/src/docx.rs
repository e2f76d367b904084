//! Word document extraction via docx-rs.
//!
//! One record for the whole file: paragraph texts in document order,
//! newline-joined, then every table cell appended newline-prefixed in
//! table/row/cell order.

use std::fs;
use std::path::Path;

use anyhow::Result;
use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, RunChild, TableCellContent, TableChild,
    TableRowChild,
};

use kbase_core::error::Error;
use kbase_core::types::{FileType, Record, RecordMeta};

pub fn extract(path: &Path) -> Result<Vec<Record>> {
    let bytes = fs::read(path)?;
    let docx = docx_rs::read_docx(&bytes)
        .map_err(|e| Error::Extraction(format!("{}: {e:?}", path.display())))?;

    let mut paragraphs = Vec::new();
    let mut tables = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(p) => paragraphs.push(paragraph_text(p)),
            DocumentChild::Table(t) => tables.push(t),
            _ => {}
        }
    }

    let mut buffer = paragraphs.join("\n");
    for table in tables {
        for row in &table.rows {
            let TableChild::TableRow(row) = row;
            for cell in &row.cells {
                let TableRowChild::TableCell(cell) = cell;
                buffer.push('\n');
                buffer.push_str(&cell_text(cell));
            }
        }
    }

    // A whole-file record even when the document is empty.
    Ok(vec![Record::new(buffer, RecordMeta::for_file(path, FileType::Docx))])
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let RunChild::Text(t) = run_child {
                    text.push_str(&t.text);
                }
            }
        }
    }
    text
}

fn cell_text(cell: &docx_rs::TableCell) -> String {
    let mut lines = Vec::new();
    for content in &cell.children {
        if let TableCellContent::Paragraph(p) = content {
            lines.push(paragraph_text(p));
        }
    }
    lines.join("\n")
}
