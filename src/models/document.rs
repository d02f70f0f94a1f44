use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Source formats understood by the parsers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Markdown,
    Notebook,
    ReStructuredText,
    PlainText,
}

impl SourceKind {
    /// Map a file extension (without the dot) to a source kind
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "md" | "markdown" => Some(Self::Markdown),
            "ipynb" => Some(Self::Notebook),
            "rst" => Some(Self::ReStructuredText),
            "txt" => Some(Self::PlainText),
            _ => None,
        }
    }
}

/// A documentation source file found under the source root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Relative path without extension, `/`-separated (`content/03_basic_grasp`)
    pub docname: String,
    /// Relative path with extension (`content/03_basic_grasp.ipynb`)
    pub filename: String,
    pub path: PathBuf,
    pub kind: SourceKind,
}

/// Text extracted from a source document
///
/// `headings` holds the text of every section title; `body` holds all
/// searchable text, headings included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    pub title: Option<String>,
    pub headings: Vec<String>,
    pub body: String,
}

impl ParsedDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a section heading; the first one becomes the document title
    pub fn push_heading(&mut self, heading: &str) {
        let heading = heading.trim();
        if heading.is_empty() {
            return;
        }
        if self.title.is_none() {
            self.title = Some(heading.to_string());
        }
        self.headings.push(heading.to_string());
        self.push_text(heading);
    }

    pub fn push_text(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        if !self.body.is_empty() {
            self.body.push('\n');
        }
        self.body.push_str(text);
    }

    /// Append another parsed fragment (a notebook cell, for instance)
    pub fn extend(&mut self, other: ParsedDocument) {
        for heading in other.headings {
            if self.title.is_none() {
                self.title = Some(heading.clone());
            }
            self.headings.push(heading);
        }
        self.push_text(&other.body);
    }
}
