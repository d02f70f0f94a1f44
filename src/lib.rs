//! Doc Search - Static full-text search indexes for documentation sites
//!
//! This library builds and queries the `searchindex.js` files that power the
//! client-side search box of a documentation site. It supports:
//!
//! - Parsing Markdown, Jupyter notebook, reStructuredText and plain text sources
//! - Building an inverted index of stemmed body and title terms
//! - Reading and writing the `Search.setIndex({...})` format, incrementally when
//!   only some sources changed
//! - Ranked lookups with title matches above body matches, result links and excerpts
//!
//! # Example
//!
//! ```no_run
//! use doc_search::{Searcher, build_index};
//! use std::path::PathBuf;
//!
//! let index = build_index(&PathBuf::from("docs"))?;
//! for result in Searcher::new(&index).search("path relinking") {
//!     println!("{} ({})", result.title, result.score);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod analysis;
pub mod cli;
pub mod index_storage;
pub mod indexer;
pub mod models;
pub mod parsers;
pub mod search;
pub mod utils;

// Re-export commonly used types
pub use index_storage::{load_index, save_index};
pub use indexer::builder::{build_index, build_index_with};
pub use models::{SearchIndex, SearchResult};
pub use search::Searcher;
pub use utils::paths::format_path_with_tilde;
