//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

/// Path of the search index shipped with the GRASP tutorial site
pub fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join("searchindex.js")
}

/// Builder for documentation source trees
pub struct SourceDirBuilder {
    temp_dir: TempDir,
}

impl SourceDirBuilder {
    /// Create a new builder with an empty source directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    /// Get the path to the source directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Add a file with the given relative path and content
    pub fn with_file(self, relative: &str, content: &str) -> Self {
        let path = self.temp_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        let mut file = fs::File::create(&path).expect("Failed to create source file");
        file.write_all(content.as_bytes()).expect("Failed to write source file");
        self
    }

    /// Add a Markdown page with a level-one heading
    pub fn with_markdown(self, relative: &str, title: &str, body: &str) -> Self {
        self.with_file(relative, &format!("# {}\n\n{}\n", title, body))
    }

    /// Add a Jupyter notebook
    pub fn with_notebook(self, relative: &str, notebook: &NotebookBuilder) -> Self {
        self.with_file(relative, &notebook.to_json())
    }

    /// Build and return the temp directory (consumes self)
    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for SourceDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `.ipynb` files (nbformat 4)
pub struct NotebookBuilder {
    cells: Vec<Value>,
}

impl NotebookBuilder {
    pub fn new() -> Self {
        Self { cells: Vec::new() }
    }

    /// Add a markdown cell, stored as an array of lines like Jupyter does
    pub fn markdown(mut self, source: &str) -> Self {
        let lines: Vec<String> = source.split_inclusive('\n').map(str::to_string).collect();
        self.cells.push(json!({"cell_type": "markdown", "metadata": {}, "source": lines}));
        self
    }

    /// Add a code cell without outputs
    pub fn code(mut self, source: &str) -> Self {
        self.cells.push(json!({
            "cell_type": "code",
            "execution_count": null,
            "metadata": {},
            "outputs": [],
            "source": source
        }));
        self
    }

    /// Add a code cell that printed `stdout`
    pub fn code_with_output(mut self, source: &str, stdout: &str) -> Self {
        self.cells.push(json!({
            "cell_type": "code",
            "execution_count": 1,
            "metadata": {},
            "outputs": [{"output_type": "stream", "name": "stdout", "text": [stdout]}],
            "source": source
        }));
        self
    }

    /// Add an arbitrary (possibly malformed) cell
    pub fn raw_cell(mut self, cell: Value) -> Self {
        self.cells.push(cell);
        self
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> String {
        json!({
            "cells": self.cells,
            "metadata": {"kernelspec": {"name": "python3", "display_name": "Python 3"}},
            "nbformat": 4,
            "nbformat_minor": 5
        })
        .to_string()
    }
}

impl Default for NotebookBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A small site laid out like the GRASP tutorial
///
/// | doc | docname | title |
/// |---|---|---|
/// | 0 | content/01_basic_grasp | Basic GRASP |
/// | 1 | content/02_tabu_grasp | Tabu GRASP |
/// | 2 | content/03_path_relinking | TSP Path Relinking |
/// | 3 | front_page | Introduction |
pub fn tutorial_site() -> SourceDirBuilder {
    SourceDirBuilder::new()
        .with_markdown(
            "front_page.md",
            "Introduction",
            "Tutorials on GRASP, tabu search and path relinking for the TSP.",
        )
        .with_notebook(
            "content/01_basic_grasp.ipynb",
            &NotebookBuilder::new()
                .markdown("# Basic GRASP\n\nA greedy randomized construction followed by local search.")
                .code_with_output("best = grasp(instance, iterations=100)", "best cost 7542\n"),
        )
        .with_notebook(
            "content/02_tabu_grasp.ipynb",
            &NotebookBuilder::new()
                .markdown("# Tabu GRASP\n\nThe local search keeps a tabu list of recent moves.")
                .code("tabu_tenure = 7"),
        )
        .with_notebook(
            "content/03_path_relinking.ipynb",
            &NotebookBuilder::new()
                .markdown("# TSP Path Relinking\n\nExplore paths between elite solutions.")
                .markdown("## Elite set\n\nKeep the best solutions found by GRASP."),
        )
}
