//! Source document parsers for Markdown, Jupyter notebooks, reStructuredText
//! and plain text
//!
//! # Error Handling Strategy
//!
//! This module follows a **graceful degradation** approach suitable for CLI tools:
//!
//! - **Markup never fails**: Markdown, reST and plain text are read leniently; anything
//!   that is not recognised as a heading is indexed as body text.
//!
//! - **Individual cell failures**: Malformed notebook cells are logged and skipped, so one
//!   bad cell does not drop the whole page from the index.
//!
//! - **Catastrophic failure detection**: A notebook that is not JSON, or where more than 50%
//!   of the cells fail to parse, is rejected. The index builder applies the same threshold
//!   one level up, across documents.
//!
//! - **Error propagation**: Uses `anyhow::Result` with the file path as context.

pub mod deserializers;
pub mod markdown;
pub mod notebook;
pub mod rst;

use std::fs::File;
use std::io::Read;

use anyhow::{Context, Result};

pub use markdown::parse_markdown;
pub use notebook::parse_notebook;
pub use rst::parse_rst;

use crate::models::{ParsedDocument, SourceDocument, SourceKind};
use crate::utils::validate_file_size;

/// Read and parse one source document according to its kind
pub fn parse_document(source: &SourceDocument) -> Result<ParsedDocument> {
    // Open file and validate size to avoid TOCTOU race condition
    let mut file = File::open(&source.path)
        .with_context(|| format!("Failed to open source file: {}", source.path.display()))?;
    validate_file_size(&file, &source.path)?;

    let mut text = String::new();
    file.read_to_string(&mut text)
        .with_context(|| format!("Failed to read source file: {}", source.path.display()))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let parsed = match source.kind {
        SourceKind::Markdown => parse_markdown(text),
        SourceKind::Notebook => parse_notebook(text)
            .with_context(|| format!("Failed to parse notebook: {}", source.path.display()))?,
        SourceKind::ReStructuredText => parse_rst(text),
        SourceKind::PlainText => parse_plain_text(text),
    };
    Ok(parsed)
}

/// Plain text has no structure: everything is body text
pub fn parse_plain_text(text: &str) -> ParsedDocument {
    let mut doc = ParsedDocument::new();
    doc.push_text(text.trim_end());
    doc
}
