//! Index lookup: the search box side of the index.
//!
//! A query is parsed into stemmed terms ([`parse_query`]), evaluated against
//! a loaded [`SearchIndex`](crate::models::SearchIndex) by a [`Searcher`] and
//! returned as ranked [`SearchResult`](crate::models::SearchResult)s, title
//! matches first. Results can then be decorated with a link to the rendered
//! page ([`result_link`]) and an excerpt of the source ([`make_search_summary`]).
//!
//! Lookups never fail: unknown words and empty queries produce empty results.

pub mod engine;
pub mod links;
pub mod query;
pub mod scorer;
pub mod summary;

pub use engine::Searcher;
pub use links::{LinkOptions, result_link};
pub use query::{ParsedQuery, parse_query};
pub use scorer::Scorer;
pub use summary::{make_search_summary, summary_from_source};
