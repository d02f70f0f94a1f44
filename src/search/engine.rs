//! Query evaluation against a frozen index.
//!
//! # Scoring
//!
//! Every search word collects contributions from four sources:
//!
//! | source | points |
//! |---|---|
//! | exact body term | [`Scorer::term`] |
//! | exact title term | [`Scorer::title`] |
//! | body terms containing the word | [`Scorer::partial_term`] |
//! | title terms containing the word | [`Scorer::partial_title`] |
//!
//! Partial matches are only tried for words longer than two characters and
//! only in a map that has no exact entry for the word. A document keeps the
//! best contribution per word and its best word overall.
//!
//! # Matching
//!
//! A document is a result when it matches every search word, or every word
//! longer than two characters, and none of the excluded words.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::query::{ParsedQuery, parse_query};
use super::scorer::Scorer;
use crate::analysis::{English, SearchLanguage};
use crate::models::{Posting, SearchIndex, SearchResult, TermPostings};

/// Answers queries over one loaded index
#[derive(Debug)]
pub struct Searcher<'a, L: SearchLanguage = English> {
    index: &'a SearchIndex,
    lang: L,
    scorer: Scorer,
}

impl<'a> Searcher<'a, English> {
    pub fn new(index: &'a SearchIndex) -> Self {
        Self::with_language(index, English::new())
    }
}

impl<'a, L: SearchLanguage> Searcher<'a, L> {
    pub fn with_language(index: &'a SearchIndex, lang: L) -> Self {
        Self { index, lang, scorer: Scorer::default() }
    }

    pub fn with_scorer(mut self, scorer: Scorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn index(&self) -> &SearchIndex {
        self.index
    }

    pub fn parse(&self, query: &str) -> ParsedQuery {
        parse_query(query, &self.lang)
    }

    /// Rank the documents matching a search box query
    ///
    /// An empty query, or one made only of stopwords, yields no results.
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        self.search_parsed(&self.parse(query))
    }

    pub fn search_parsed(&self, query: &ParsedQuery) -> Vec<SearchResult> {
        let words = &query.search_terms;
        if words.is_empty() {
            return Vec::new();
        }

        // doc -> best score per search word
        let mut matches: BTreeMap<usize, Vec<Option<i32>>> = BTreeMap::new();
        for (position, word) in words.iter().enumerate() {
            for (posting, score) in self.contributions(word) {
                for &doc in posting.docs() {
                    if doc >= self.index.document_count() {
                        continue;
                    }
                    let slot = &mut matches.entry(doc).or_insert_with(|| vec![None; words.len()])
                        [position];
                    *slot = Some((*slot).map_or(score, |best| best.max(score)));
                }
            }
        }

        let long_words: Vec<usize> = words
            .iter()
            .enumerate()
            .filter(|(_, word)| word.chars().count() > 2)
            .map(|(position, _)| position)
            .collect();

        let mut results: Vec<SearchResult> = matches
            .into_iter()
            .filter(|(_, scores)| {
                scores.iter().all(Option::is_some)
                    || (!long_words.is_empty() && long_words.iter().all(|&p| scores[p].is_some()))
            })
            .filter(|(doc, _)| !self.is_excluded(*doc, &query.excluded))
            .filter_map(|(doc, scores)| {
                let score = scores.into_iter().flatten().max()?;
                Some(self.result(doc, score))
            })
            .collect();

        results.sort_by(compare_results);
        results
    }

    fn contributions(&self, word: &str) -> Vec<(&'a Posting, i32)> {
        let index = self.index;
        let mut found = Vec::new();

        if let Some(posting) = index.terms.get(word) {
            found.push((posting, self.scorer.term));
        }
        if let Some(posting) = index.titleterms.get(word) {
            found.push((posting, self.scorer.title));
        }

        if word.chars().count() > 2 {
            if !index.terms.contains_key(word) {
                found.extend(
                    index
                        .terms
                        .iter()
                        .filter(|(term, _)| term.contains(word))
                        .map(|(_, posting)| (posting, self.scorer.partial_term)),
                );
            }
            if !index.titleterms.contains_key(word) {
                found.extend(
                    index
                        .titleterms
                        .iter()
                        .filter(|(term, _)| term.contains(word))
                        .map(|(_, posting)| (posting, self.scorer.partial_title)),
                );
            }
        }

        found
    }

    fn is_excluded(&self, doc: usize, excluded: &[String]) -> bool {
        excluded.iter().any(|word| {
            self.index.terms.get(word).is_some_and(|p| p.contains(doc))
                || self.index.titleterms.get(word).is_some_and(|p| p.contains(doc))
        })
    }

    fn result(&self, doc: usize, score: i32) -> SearchResult {
        SearchResult {
            doc,
            docname: self.index.docnames[doc].clone(),
            filename: self.index.filename(doc).unwrap_or_default().to_string(),
            title: self.index.title(doc).unwrap_or_default().to_string(),
            score,
            link: None,
            summary: None,
        }
    }

    /// Raw postings for one word, normalized the way the builder normalizes it
    ///
    /// A word that is already an index key is looked up as-is, since stemming
    /// a stem does not always give it back. A word absent from both maps
    /// yields empty postings, not an error.
    pub fn lookup_term(&self, word: &str) -> TermPostings {
        let is_key =
            self.index.terms.contains_key(word) || self.index.titleterms.contains_key(word);
        let term = if is_key {
            word.to_string()
        } else {
            let stemmed = self.lang.stem(&word.to_lowercase());
            if !self.lang.word_filter(&stemmed) && self.lang.word_filter(word) {
                word.to_string()
            } else {
                stemmed
            }
        };

        let in_range = |posting: Option<&Posting>| -> Vec<usize> {
            let count = self.index.document_count();
            let mut docs: Vec<usize> = posting
                .map(|p| p.docs().iter().copied().filter(|&d| d < count).collect())
                .unwrap_or_default();
            docs.sort_unstable();
            docs.dedup();
            docs
        };

        TermPostings {
            body: in_range(self.index.terms.get(&term)),
            title: in_range(self.index.titleterms.get(&term)),
            term,
        }
    }
}

/// Score descending, then title ascending ignoring case, then docname
fn compare_results(a: &SearchResult, b: &SearchResult) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        .then_with(|| a.docname.cmp(&b.docname))
}
