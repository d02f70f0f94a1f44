//! Index building for documentation sources
//!
//! # Error Handling Strategy
//!
//! The indexer combines graceful degradation with error rate tracking:
//!
//! - **Document-level failures**: Failed parses are logged but don't stop indexing.
//!   This allows partial index building when some pages are corrupted.
//!
//! - **Error rate tracking**: Tracks successful vs failed parses. Returns an error
//!   if >50% of documents fail, preventing acceptance of fundamentally broken sources.
//!
//! - **Resource limits**: Discovery stops with an error beyond 10 000 documents and
//!   the parsers reject files over 50MB.
//!
//! - **Parser integration**: Delegates cell-level error handling to the notebook
//!   parser, which applies its own failure rate check.

pub mod builder;
pub mod discovery;

pub use builder::{BuildOutcome, BuildStats, IndexBuilder, build_index, build_index_with};
pub use discovery::discover_documents;
