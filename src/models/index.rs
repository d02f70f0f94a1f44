use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key under `envversion` identifying indexes written by this crate
pub const ENV_VERSION_KEY: &str = "doc_search";

/// Bumped whenever the way terms are extracted changes; an index with a
/// different value cannot seed an incremental build
pub const ENV_VERSION: u64 = 1;

/// Document indices stored for one term
///
/// Serialized as a bare integer when exactly one document matches and as a
/// sorted array otherwise. Arrays may be empty after a prune.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Posting {
    Single(usize),
    Multiple(Vec<usize>),
}

impl Posting {
    /// Build from sorted, de-duplicated document indices
    pub fn from_sorted(docs: Vec<usize>) -> Self {
        if docs.len() == 1 { Posting::Single(docs[0]) } else { Posting::Multiple(docs) }
    }

    pub fn docs(&self) -> &[usize] {
        match self {
            Posting::Single(doc) => std::slice::from_ref(doc),
            Posting::Multiple(docs) => docs,
        }
    }

    pub fn contains(&self, doc: usize) -> bool {
        self.docs().contains(&doc)
    }

    pub fn len(&self) -> usize {
        self.docs().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs().is_empty()
    }
}

/// A frozen search index, the payload of `Search.setIndex(...)`
///
/// `docnames`, `filenames` and `titles` are parallel arrays sorted by docname;
/// postings refer to positions in them. The `objects*` maps describe API
/// objects and are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchIndex {
    pub docnames: Vec<String>,
    #[serde(default)]
    pub envversion: Map<String, Value>,
    #[serde(default)]
    pub filenames: Vec<String>,
    #[serde(default)]
    pub objects: Map<String, Value>,
    #[serde(default)]
    pub objnames: Map<String, Value>,
    #[serde(default)]
    pub objtypes: Map<String, Value>,
    #[serde(default)]
    pub terms: BTreeMap<String, Posting>,
    pub titles: Vec<String>,
    #[serde(default)]
    pub titleterms: BTreeMap<String, Posting>,
}

impl SearchIndex {
    /// The `envversion` map this crate writes
    pub fn current_env_version() -> Map<String, Value> {
        let mut env = Map::new();
        env.insert(ENV_VERSION_KEY.to_string(), Value::from(ENV_VERSION));
        env
    }

    pub fn document_count(&self) -> usize {
        self.docnames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docnames.is_empty()
    }

    pub fn title(&self, doc: usize) -> Option<&str> {
        self.titles.get(doc).map(String::as_str)
    }

    pub fn filename(&self, doc: usize) -> Option<&str> {
        self.filenames.get(doc).map(String::as_str)
    }

    pub fn doc_index(&self, docname: &str) -> Option<usize> {
        self.docnames.iter().position(|d| d == docname)
    }

    /// Problems that make the parallel document arrays unusable
    pub fn structural_issues(&self) -> Vec<IndexIssue> {
        let expected = self.docnames.len();
        let mut issues = Vec::new();
        if self.titles.len() != expected {
            issues.push(IndexIssue::LengthMismatch {
                field: "titles",
                expected,
                found: self.titles.len(),
            });
        }
        // Older generators omit filenames entirely
        if !self.filenames.is_empty() && self.filenames.len() != expected {
            issues.push(IndexIssue::LengthMismatch {
                field: "filenames",
                expected,
                found: self.filenames.len(),
            });
        }
        issues
    }

    /// Check every invariant and report all violations
    pub fn validate(&self) -> Vec<IndexIssue> {
        let mut issues = self.structural_issues();

        let mut seen = HashSet::new();
        for docname in &self.docnames {
            if !seen.insert(docname.as_str()) {
                issues.push(IndexIssue::DuplicateDocname(docname.clone()));
            }
        }

        for (map, postings) in [("terms", &self.terms), ("titleterms", &self.titleterms)] {
            for (term, posting) in postings {
                if posting.is_empty() {
                    issues.push(IndexIssue::EmptyPosting { map, term: term.clone() });
                }
                for &doc in posting.docs() {
                    if doc >= self.docnames.len() {
                        issues.push(IndexIssue::DocIndexOutOfRange {
                            map,
                            term: term.clone(),
                            doc,
                        });
                    }
                }
            }
        }

        issues
    }
}

/// An invariant violation found in a loaded index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexIssue {
    LengthMismatch { field: &'static str, expected: usize, found: usize },
    DuplicateDocname(String),
    EmptyPosting { map: &'static str, term: String },
    DocIndexOutOfRange { map: &'static str, term: String, doc: usize },
}

impl IndexIssue {
    /// Empty postings are left behind by pruning and are harmless
    pub fn is_warning(&self) -> bool {
        matches!(self, IndexIssue::EmptyPosting { .. })
    }
}

impl fmt::Display for IndexIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexIssue::LengthMismatch { field, expected, found } => {
                write!(f, "{} has {} entries but there are {} documents", field, found, expected)
            }
            IndexIssue::DuplicateDocname(name) => write!(f, "duplicate docname '{}'", name),
            IndexIssue::EmptyPosting { map, term } => {
                write!(f, "{} entry '{}' lists no documents", map, term)
            }
            IndexIssue::DocIndexOutOfRange { map, term, doc } => {
                write!(f, "{} entry '{}' refers to missing document {}", map, term, doc)
            }
        }
    }
}
