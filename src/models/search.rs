use serde::{Deserialize, Serialize};

/// One ranked document returned by a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Position of the document in the index arrays
    pub doc: usize,
    pub docname: String,
    pub filename: String,
    pub title: String,
    pub score: i32,
    /// Link to the rendered page, filled in by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Text excerpt around the first match, when sources are available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Raw postings for a single index term
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermPostings {
    /// The form actually looked up: an existing key as given, otherwise the
    /// stem unless the stem was rejected
    pub term: String,
    pub body: Vec<usize>,
    pub title: Vec<usize>,
}

impl TermPostings {
    pub fn is_empty(&self) -> bool {
        self.body.is_empty() && self.title.is_empty()
    }

    /// Union of body and title documents, sorted
    pub fn documents(&self) -> Vec<usize> {
        let mut docs: Vec<usize> = self.body.iter().chain(&self.title).copied().collect();
        docs.sort_unstable();
        docs.dedup();
        docs
    }
}
