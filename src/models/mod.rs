//! Data models for documentation search.
//!
//! This module defines the data structures used throughout the crate:
//!
//! - [`ParsedDocument`] - Headings and body text extracted from one source file
//! - [`SourceDocument`] - A discovered source file with its docname
//! - [`SearchIndex`] - The frozen inverted index as stored in `searchindex.js`
//! - [`Posting`] - Document indices recorded for one term
//! - [`SearchResult`] - One ranked hit returned by a query
//!
//! The index models use serde so the JavaScript-literal codec in
//! `index_storage` can go through `serde_json::Value`.

pub mod document;
pub mod index;
pub mod search;

pub use document::{ParsedDocument, SourceDocument, SourceKind};
pub use index::{IndexIssue, Posting, SearchIndex};
pub use search::{SearchResult, TermPostings};
