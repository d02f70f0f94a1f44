use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::deserializers::{deserialize_multiline_text, multiline_text};
use super::markdown::parse_markdown;
use crate::models::ParsedDocument;

#[derive(Debug, Deserialize)]
struct Notebook {
    #[serde(default)]
    cells: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    cell_type: String,
    #[serde(default, deserialize_with = "deserialize_multiline_text")]
    source: String,
    #[serde(default)]
    outputs: Vec<Output>,
}

#[derive(Debug, Deserialize)]
struct Output {
    output_type: String,
    #[serde(default, deserialize_with = "deserialize_multiline_text")]
    text: String,
    #[serde(default)]
    data: HashMap<String, Value>,
}

impl Output {
    /// Printed or plain-text output; images and HTML are not indexed
    fn searchable_text(&self) -> Option<String> {
        match self.output_type.as_str() {
            "stream" => Some(self.text.clone()),
            "execute_result" | "display_data" => {
                self.data.get("text/plain").and_then(|v| multiline_text(v).ok())
            }
            _ => None,
        }
    }
}

/// Extract headings and searchable text from a Jupyter notebook
///
/// Markdown cells go through the Markdown parser; code sources and their
/// stream / `text/plain` outputs are body text. Malformed cells are skipped
/// with a warning, but a notebook where more than half of the cells are
/// malformed is rejected.
pub fn parse_notebook(text: &str) -> Result<ParsedDocument> {
    let notebook: Notebook = serde_json::from_str(text).context("Invalid notebook JSON")?;

    let mut doc = ParsedDocument::new();
    let total_cells = notebook.cells.len();
    let mut skipped_count = 0;

    for (cell_num, value) in notebook.cells.into_iter().enumerate() {
        let cell: Cell = match serde_json::from_value(value) {
            Ok(cell) => cell,
            Err(e) => {
                warn!("Skipping malformed cell {}: {}", cell_num + 1, e);
                skipped_count += 1;
                continue;
            }
        };

        match cell.cell_type.as_str() {
            "markdown" => doc.extend(parse_markdown(&cell.source)),
            "code" => {
                doc.push_text(&cell.source);
                for output in &cell.outputs {
                    if let Some(text) = output.searchable_text() {
                        doc.push_text(&text);
                    }
                }
            }
            // raw cells carry no rendered text
            other => debug!("Ignoring {} cell {}", other, cell_num + 1),
        }
    }

    if total_cells > 0 {
        let failure_rate = (skipped_count as f64) / (total_cells as f64);
        if failure_rate > 0.5 {
            bail!(
                "Too many malformed cells: {} of {} cells failed ({:.1}%)",
                skipped_count,
                total_cells,
                failure_rate * 100.0
            );
        }
    }

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_and_code_cells() {
        let nb = r###"{
            "cells": [
                {"cell_type": "markdown", "metadata": {}, "source": ["# Tabu GRASP\n", "\n", "A tabu list."]},
                {"cell_type": "code", "metadata": {}, "source": "tabu_tenure = 7", "outputs": [
                    {"output_type": "stream", "name": "stdout", "text": ["best cost 42\n"]},
                    {"output_type": "execute_result", "data": {"text/plain": "7", "image/png": "iVBOR"}},
                    {"output_type": "error", "ename": "ValueError", "evalue": "x", "traceback": []}
                ]},
                {"cell_type": "markdown", "metadata": {}, "source": "## Results"}
            ],
            "metadata": {},
            "nbformat": 4,
            "nbformat_minor": 5
        }"###;

        let doc = parse_notebook(nb).unwrap();
        assert_eq!(doc.title.as_deref(), Some("Tabu GRASP"));
        assert_eq!(doc.headings, vec!["Tabu GRASP", "Results"]);
        assert!(doc.body.contains("tabu_tenure = 7"));
        assert!(doc.body.contains("best cost 42"));
        assert!(!doc.body.contains("iVBOR"));
        assert!(!doc.body.contains("ValueError"));
    }

    #[test]
    fn test_raw_cells_ignored() {
        let nb = r#"{"cells": [{"cell_type": "raw", "source": "secret"}]}"#;
        let doc = parse_notebook(nb).unwrap();
        assert!(doc.body.is_empty());
    }

    #[test]
    fn test_empty_notebook() {
        let doc = parse_notebook(r#"{"cells": []}"#).unwrap();
        assert!(doc.title.is_none());
        assert!(doc.body.is_empty());
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(parse_notebook("{not a notebook").is_err());
    }

    #[test]
    fn test_some_malformed_cells_tolerated() {
        let nb = r##"{"cells": [
            {"cell_type": "markdown", "source": "# Local Search"},
            {"cell_type": "markdown", "source": "2-opt moves"},
            {"source": "no type"}
        ]}"##;
        let doc = parse_notebook(nb).unwrap();
        assert_eq!(doc.title.as_deref(), Some("Local Search"));
    }

    #[test]
    fn test_mostly_malformed_cells_rejected() {
        let nb = r##"{"cells": [
            {"cell_type": "markdown", "source": "# Local Search"},
            {"source": "no type"},
            {"cell_type": "code", "source": 42}
        ]}"##;
        let err = parse_notebook(nb).unwrap_err();
        assert!(err.to_string().contains("Too many malformed cells"));
    }
}
