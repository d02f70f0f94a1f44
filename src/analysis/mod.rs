//! Text analysis shared by index construction and query parsing.
//!
//! Both sides of the search must agree on how text becomes terms, otherwise a
//! word indexed at build time can never be found at query time. The pipeline is:
//!
//! 1. [`split_words`] extracts `\w+` runs (letters, digits, underscore)
//! 2. words are lower-cased and reduced with the [`PorterStemmer`]
//! 3. [`SearchLanguage::word_filter`] drops stopwords and very short words
//!
//! When a stem is rejected by the filter but the raw word is not, the raw word
//! is kept, so stemming never removes a word from the index.

pub mod language;
pub mod splitter;
pub mod stemmer;

pub use language::{English, SearchLanguage};
pub use splitter::split_words;
pub use stemmer::PorterStemmer;
