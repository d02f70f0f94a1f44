//! Search box query parsing.
//!
//! # Syntax
//!
//! ```text
//! query := token (whitespace token)*
//! token := word+ | "-" word+
//! ```
//!
//! A token prefixed with `-` excludes every document containing its words.
//! Each word is lower-cased and stemmed the same way the index builder stems
//! body text, so `Relinking` finds documents indexed under `relink`.
//!
//! # Examples
//!
//! ```rust
//! # use doc_search::analysis::English;
//! # use doc_search::search::parse_query;
//! let query = parse_query("path relinking -tabu", &English::new());
//! assert_eq!(query.search_terms, vec!["path", "relink"]);
//! assert_eq!(query.excluded, vec!["tabu"]);
//! assert_eq!(query.highlight_terms, vec!["path", "relinking"]);
//! ```

use crate::analysis::SearchLanguage;

/// A query reduced to index terms
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Terms every result must contain (short ones are optional)
    pub search_terms: Vec<String>,
    /// Terms no result may contain
    pub excluded: Vec<String>,
    /// Lower-cased words as typed, for highlighting and summaries
    pub highlight_terms: Vec<String>,
}

impl ParsedQuery {
    pub fn is_empty(&self) -> bool {
        self.search_terms.is_empty()
    }
}

/// Parse a search box query
///
/// Stopwords and pure numbers are skipped. When stemming shortens a word of
/// three or more characters below three, the word is looked up as typed
/// instead. Duplicates are dropped.
pub fn parse_query<L: SearchLanguage + ?Sized>(query: &str, lang: &L) -> ParsedQuery {
    let mut parsed = ParsedQuery::default();

    for token in query.split_whitespace() {
        let (excluded, token) = match token.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, token),
        };

        for word in lang.split(token) {
            let lower = word.to_lowercase();
            if lang.is_stopword(&lower) || word.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }

            let stemmed = lang.stem(&lower);
            let term = if stemmed.chars().count() < 3 && word.chars().count() >= 3 {
                word
            } else {
                stemmed
            };

            if excluded {
                push_unique(&mut parsed.excluded, term);
            } else {
                push_unique(&mut parsed.search_terms, term);
                push_unique(&mut parsed.highlight_terms, lower);
            }
        }
    }

    parsed
}

fn push_unique(terms: &mut Vec<String>, term: String) {
    if !terms.contains(&term) {
        terms.push(term);
    }
}
