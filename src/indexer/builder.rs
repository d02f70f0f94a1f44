//! Index builder for documentation sources.
//!
//! # Error Handling Strategy
//!
//! This module follows a **graceful degradation** approach suitable for CLI tools:
//!
//! - **Document-level errors**: Unreadable or unparseable documents are logged as warnings
//!   and left out of the index, allowing partial index building
//! - **Failure thresholds**: The build fails if >50% of the parsed documents fail
//! - **Stale caches**: A previous index or build metadata that cannot be reused (other
//!   format version, other language, unreadable) triggers a full rebuild with a warning
//! - **Summary reporting**: Counts of reused, parsed and failed documents are logged at
//!   `info` level and returned in [`BuildStats`]
//!
//! # Term registration
//!
//! Words are split with [`SearchLanguage::split`], lower-cased and stemmed. A stem
//! that fails [`SearchLanguage::word_filter`] is replaced by the raw word when the
//! raw word passes, so `uses` (stem `us`) and `The` (stem `the`, a stopword) are
//! still indexed. Heading words go to `titleterms`; a document is not listed under
//! a body term it already has as a title term.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use anyhow::{Result, bail};
use rayon::prelude::*;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::analysis::{English, SearchLanguage};
use crate::index_storage::{BuildMetadata, SourceFileMetadata};
use crate::indexer::discovery::discover_documents;
use crate::models::{ParsedDocument, Posting, SearchIndex, SourceDocument};
use crate::parsers::parse_document;

/// Mutable index under construction, keyed by docname
///
/// Mirrors the life cycle of a Sphinx index: [`feed`](Self::feed) documents,
/// optionally [`load`](Self::load) a previous index and [`prune`](Self::prune)
/// it to the documents that are still valid, then [`freeze`](Self::freeze).
#[derive(Debug)]
pub struct IndexBuilder<L: SearchLanguage = English> {
    lang: L,
    titles: BTreeMap<String, String>,
    filenames: BTreeMap<String, String>,
    mapping: BTreeMap<String, BTreeSet<String>>,
    title_mapping: BTreeMap<String, BTreeSet<String>>,
    objects: Map<String, Value>,
    objnames: Map<String, Value>,
    objtypes: Map<String, Value>,
    stem_cache: HashMap<String, String>,
}

impl IndexBuilder<English> {
    pub fn new() -> Self {
        Self::with_language(English::new())
    }
}

impl Default for IndexBuilder<English> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: SearchLanguage> IndexBuilder<L> {
    pub fn with_language(lang: L) -> Self {
        Self {
            lang,
            titles: BTreeMap::new(),
            filenames: BTreeMap::new(),
            mapping: BTreeMap::new(),
            title_mapping: BTreeMap::new(),
            objects: Map::new(),
            objnames: Map::new(),
            objtypes: Map::new(),
            stem_cache: HashMap::new(),
        }
    }

    pub fn language(&self) -> &L {
        &self.lang
    }

    pub fn document_count(&self) -> usize {
        self.titles.len()
    }

    pub fn contains(&self, docname: &str) -> bool {
        self.titles.contains_key(docname)
    }

    fn stem(&mut self, word: &str) -> String {
        if let Some(stemmed) = self.stem_cache.get(word) {
            return stemmed.clone();
        }
        let stemmed = self.lang.stem(&word.to_lowercase());
        self.stem_cache.insert(word.to_string(), stemmed.clone());
        stemmed
    }

    /// Register a document's title, filename and words
    pub fn feed(&mut self, docname: &str, filename: &str, title: &str, parsed: &ParsedDocument) {
        self.titles.insert(docname.to_string(), title.to_string());
        self.filenames.insert(docname.to_string(), filename.to_string());

        for heading in &parsed.headings {
            for word in self.lang.split(heading) {
                let stemmed = self.stem(&word);
                let term = if self.lang.word_filter(&stemmed) {
                    stemmed
                } else if self.lang.word_filter(&word) {
                    word
                } else {
                    continue;
                };
                self.title_mapping.entry(term).or_default().insert(docname.to_string());
            }
        }

        for word in self.lang.split(&parsed.body) {
            let mut term = self.stem(&word);
            if !self.lang.word_filter(&term) && self.lang.word_filter(&word) {
                term = word;
            }
            if !self.lang.word_filter(&term) {
                continue;
            }
            let in_title = self.title_mapping.get(&term).is_some_and(|docs| docs.contains(docname));
            if !in_title {
                self.mapping.entry(term).or_default().insert(docname.to_string());
            }
        }
    }

    /// Drop every document not in `keep`
    ///
    /// Terms whose documents all disappear stay in the maps with an empty
    /// posting, like the postings found in existing index files.
    pub fn prune(&mut self, keep: &BTreeSet<String>) {
        self.titles.retain(|docname, _| keep.contains(docname));
        self.filenames.retain(|docname, _| keep.contains(docname));
        for docs in self.mapping.values_mut().chain(self.title_mapping.values_mut()) {
            docs.retain(|docname| keep.contains(docname));
        }
    }

    /// Produce the serializable index; documents are numbered in docname order
    pub fn freeze(&self) -> SearchIndex {
        let docnames: Vec<String> = self.titles.keys().cloned().collect();
        let positions: HashMap<&str, usize> =
            docnames.iter().enumerate().map(|(i, d)| (d.as_str(), i)).collect();

        SearchIndex {
            filenames: docnames
                .iter()
                .map(|d| self.filenames.get(d).cloned().unwrap_or_default())
                .collect(),
            titles: self.titles.values().cloned().collect(),
            terms: freeze_mapping(&self.mapping, &positions),
            titleterms: freeze_mapping(&self.title_mapping, &positions),
            objects: self.objects.clone(),
            objnames: self.objnames.clone(),
            objtypes: self.objtypes.clone(),
            envversion: SearchIndex::current_env_version(),
            docnames,
        }
    }

    /// Replace the builder state with the contents of a frozen index
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the builder untouched, if the index was
    /// written by another generator or format version (`envversion`), or if
    /// its document arrays disagree in length.
    pub fn load(&mut self, index: &SearchIndex) -> Result<()> {
        if index.envversion != SearchIndex::current_env_version() {
            bail!(
                "Index has an old format (envversion {})",
                Value::Object(index.envversion.clone())
            );
        }
        if let Some(issue) = index.structural_issues().first() {
            bail!("Index is malformed: {}", issue);
        }

        self.titles = index.docnames.iter().cloned().zip(index.titles.iter().cloned()).collect();
        self.filenames = index
            .docnames
            .iter()
            .enumerate()
            .map(|(i, d)| (d.clone(), index.filename(i).unwrap_or_default().to_string()))
            .collect();
        self.mapping = thaw_mapping(&index.terms, &index.docnames);
        self.title_mapping = thaw_mapping(&index.titleterms, &index.docnames);
        self.objects = index.objects.clone();
        self.objnames = index.objnames.clone();
        self.objtypes = index.objtypes.clone();

        debug!(documents = self.titles.len(), "loaded previous index into builder");
        Ok(())
    }
}

fn freeze_mapping(
    mapping: &BTreeMap<String, BTreeSet<String>>,
    positions: &HashMap<&str, usize>,
) -> BTreeMap<String, Posting> {
    let mut frozen = BTreeMap::new();
    for (term, docnames) in mapping {
        let mut docs: Vec<usize> =
            docnames.iter().filter_map(|d| positions.get(d.as_str()).copied()).collect();
        docs.sort_unstable();
        // Only a one-document set becomes a bare integer; a pruned set stays an array
        let posting = if docnames.len() == 1 {
            match docs.first() {
                Some(&doc) => Posting::Single(doc),
                None => continue,
            }
        } else {
            Posting::Multiple(docs)
        };
        frozen.insert(term.clone(), posting);
    }
    frozen
}

fn thaw_mapping(
    postings: &BTreeMap<String, Posting>,
    docnames: &[String],
) -> BTreeMap<String, BTreeSet<String>> {
    let mut mapping = BTreeMap::new();
    for (term, posting) in postings {
        let mut docs = BTreeSet::new();
        for &doc in posting.docs() {
            match docnames.get(doc) {
                Some(docname) => {
                    docs.insert(docname.clone());
                }
                None => warn!("Ignoring out-of-range document {} for term {}", doc, term),
            }
        }
        mapping.insert(term.clone(), docs);
    }
    mapping
}

/// Document counts for one build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Source documents found under the source directory
    pub discovered: usize,
    /// Unchanged documents taken from the previous index
    pub reused: usize,
    pub parsed: usize,
    pub failed: usize,
}

/// Result of [`build_index_with`]
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub index: SearchIndex,
    /// What to persist for the next incremental build
    pub metadata: BuildMetadata,
    pub stats: BuildStats,
}

/// Build a search index from every document under a source directory
///
/// # Errors
///
/// Returns an error if:
/// - The source directory is missing or holds more than 10 000 documents
/// - More than 50% of the documents fail to parse (systematic corruption)
///
/// Individual documents that fail to parse are logged as warnings and left
/// out of the index.
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use doc_search::build_index;
///
/// let index = build_index(&PathBuf::from("docs"))?;
/// println!("Indexed {} documents", index.document_count());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn build_index(source_dir: &Path) -> Result<SearchIndex> {
    Ok(build_index_with(source_dir, None)?.index)
}

/// Build a search index, reusing unchanged documents from a previous build
///
/// A document is reused when the previous metadata records the same
/// filename, size and modification time and the previous index contains it.
/// Changed and new documents are parsed (in parallel) and fed in docname
/// order. Documents that disappeared from the source tree are dropped; terms
/// only they contained keep an empty posting until the next full build.
pub fn build_index_with(
    source_dir: &Path,
    previous: Option<(&SearchIndex, &BuildMetadata)>,
) -> Result<BuildOutcome> {
    let documents = discover_documents(source_dir)?;
    let source_root = source_dir.canonicalize().unwrap_or_else(|_| source_dir.to_path_buf());
    let mut builder = IndexBuilder::new();
    let mut metadata = BuildMetadata::new(&source_root, builder.language().name());
    let mut stats = BuildStats { discovered: documents.len(), ..BuildStats::default() };

    let reusable = previous.and_then(|(index, previous_meta)| {
        if previous_meta.source_dir != source_root {
            info!(
                "Previous build indexed {}, doing a full build",
                previous_meta.source_dir.display()
            );
            return None;
        }
        if previous_meta.language != builder.language().name() {
            info!(
                "Previous build used language {}, doing a full build",
                previous_meta.language
            );
            return None;
        }
        match builder.load(index) {
            Ok(()) => Some(previous_meta),
            Err(e) => {
                warn!("Cannot reuse previous index, doing a full build: {:#}", e);
                None
            }
        }
    });

    let mut keep = BTreeSet::new();
    let mut to_parse = Vec::new();
    for doc in &documents {
        let recorded = reusable.and_then(|meta| meta.documents.get(&doc.docname));
        match recorded {
            Some(recorded)
                if recorded.filename == doc.filename
                    && builder.contains(&doc.docname)
                    && matches!(recorded.is_stale(&doc.path), Ok(false)) =>
            {
                keep.insert(doc.docname.clone());
                metadata.documents.insert(doc.docname.clone(), recorded.clone());
            }
            _ => to_parse.push(doc),
        }
    }
    builder.prune(&keep);
    stats.reused = keep.len();

    // Snapshot metadata before parsing so an edit during the build is seen next time
    let parsed: Vec<(&SourceDocument, Result<(SourceFileMetadata, ParsedDocument)>)> = to_parse
        .par_iter()
        .map(|&doc| {
            let result = SourceFileMetadata::from_path(&doc.path, &doc.filename)
                .and_then(|file_meta| Ok((file_meta, parse_document(doc)?)));
            (doc, result)
        })
        .collect();

    for (doc, result) in parsed {
        match result {
            Ok((file_meta, parsed)) => {
                let title = parsed.title.clone().unwrap_or_default();
                builder.feed(&doc.docname, &doc.filename, &title, &parsed);
                metadata.documents.insert(doc.docname.clone(), file_meta);
                stats.parsed += 1;
            }
            Err(e) => {
                warn!("Failed to parse {}: {:#}", doc.filename, e);
                stats.failed += 1;
            }
        }
    }

    // Check error rate and fail if >50% of documents failed
    let attempted = stats.parsed + stats.failed;
    if attempted > 0 {
        let failure_rate = stats.failed as f64 / attempted as f64;
        if failure_rate > 0.5 {
            bail!(
                "Index building failed: {}/{} documents failed to parse ({}% failure rate)",
                stats.failed,
                attempted,
                (failure_rate * 100.0) as u32
            );
        }
    }

    info!(
        documents = builder.document_count(),
        reused = stats.reused,
        parsed = stats.parsed,
        failed = stats.failed,
        "built search index"
    );

    Ok(BuildOutcome { index: builder.freeze(), metadata, stats })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn parsed(headings: &[&str], body: &str) -> ParsedDocument {
        let mut doc = ParsedDocument::new();
        for heading in headings {
            doc.push_heading(heading);
        }
        doc.push_text(body);
        doc
    }

    #[test]
    fn test_feed_splits_title_and_body_terms() {
        let mut builder = IndexBuilder::new();
        builder.feed(
            "tabu",
            "tabu.md",
            "Tabu GRASP",
            &parsed(&["Tabu GRASP"], "Tabu search uses a tabu list."),
        );
        let index = builder.freeze();

        assert_eq!(index.titles, vec!["Tabu GRASP"]);
        assert_eq!(index.titleterms.get("tabu"), Some(&Posting::Single(0)));
        assert_eq!(index.titleterms.get("grasp"), Some(&Posting::Single(0)));
        // Title words are not repeated in the body postings
        assert!(!index.terms.contains_key("tabu"));
        assert!(!index.terms.contains_key("grasp"));
        assert_eq!(index.terms.get("search"), Some(&Posting::Single(0)));
        assert_eq!(index.terms.get("list"), Some(&Posting::Single(0)));
        assert!(!index.terms.contains_key("a"));
    }

    #[test]
    fn test_feed_keeps_raw_word_when_stem_is_filtered() {
        let mut builder = IndexBuilder::new();
        builder.feed("intro", "intro.md", "", &parsed(&[], "The heuristic uses it"));
        let index = builder.freeze();

        // stem "us" is too short, stem "the" is a stopword; the raw words survive
        assert!(index.terms.contains_key("uses"));
        assert!(index.terms.contains_key("The"));
        assert!(!index.terms.contains_key("the"));
        assert!(!index.terms.contains_key("it"));
        assert!(index.terms.contains_key("heurist"));
    }

    #[test]
    fn test_freeze_sorts_docnames_and_uses_arrays() {
        let mut builder = IndexBuilder::new();
        builder.feed("content/b", "content/b.md", "B", &parsed(&[], "grasp"));
        builder.feed("content/a", "content/a.md", "A", &parsed(&[], "grasp tabu"));
        let index = builder.freeze();

        assert_eq!(index.docnames, vec!["content/a", "content/b"]);
        assert_eq!(index.filenames, vec!["content/a.md", "content/b.md"]);
        assert_eq!(index.titles, vec!["A", "B"]);
        assert_eq!(index.terms.get("grasp"), Some(&Posting::Multiple(vec![0, 1])));
        assert_eq!(index.terms.get("tabu"), Some(&Posting::Single(0)));
        assert_eq!(index.envversion, SearchIndex::current_env_version());
    }

    #[test]
    fn test_prune_leaves_empty_postings() {
        let mut builder = IndexBuilder::new();
        builder.feed("a", "a.md", "A", &parsed(&[], "single"));
        builder.feed("b", "b.md", "B", &parsed(&[], "grasp"));
        builder.prune(&BTreeSet::from(["b".to_string()]));
        let index = builder.freeze();

        assert_eq!(index.docnames, vec!["b"]);
        assert_eq!(index.terms.get("singl"), Some(&Posting::Multiple(vec![])));
        assert_eq!(index.terms.get("grasp"), Some(&Posting::Single(0)));
    }

    #[test]
    fn test_load_then_freeze_is_identity() {
        let mut builder = IndexBuilder::new();
        builder.feed("a", "a.md", "Local Search", &parsed(&["Local Search"], "two opt"));
        builder.feed("b", "b.ipynb", "", &parsed(&[], "search again"));
        let frozen = builder.freeze();

        let mut reloaded = IndexBuilder::new();
        reloaded.load(&frozen).unwrap();
        assert_eq!(reloaded.freeze(), frozen);
    }

    #[test]
    fn test_load_rejects_foreign_envversion() {
        let mut index = IndexBuilder::new().freeze();
        index.envversion = Map::new();
        index.envversion.insert("sphinx".into(), Value::from(56));

        let mut builder = IndexBuilder::new();
        builder.feed("keep", "keep.md", "Keep", &parsed(&[], "text"));
        let err = builder.load(&index).unwrap_err();
        assert!(err.to_string().contains("old format"));
        assert!(builder.contains("keep"));
    }

    #[test]
    fn test_build_index_from_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("intro.md"), "# Introduction\n\nGRASP tutorials.\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "tabu tenure\n").unwrap();

        let index = build_index(dir.path()).unwrap();
        assert_eq!(index.docnames, vec!["intro", "notes"]);
        assert_eq!(index.titles, vec!["Introduction", ""]);
        assert_eq!(index.titleterms.get("introduct"), Some(&Posting::Single(0)));
        assert_eq!(index.terms.get("grasp"), Some(&Posting::Single(0)));
        assert_eq!(index.terms.get("tabu"), Some(&Posting::Single(1)));
    }

    #[test]
    fn test_build_fails_when_most_documents_fail() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.ipynb"), "{broken").unwrap();
        fs::write(dir.path().join("b.ipynb"), "{broken").unwrap();
        fs::write(dir.path().join("c.md"), "# Fine\n").unwrap();

        let err = build_index(dir.path()).unwrap_err();
        assert!(err.to_string().contains("2/3 documents failed"));
    }

    #[test]
    fn test_build_tolerates_minority_failures() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.ipynb"), "{broken").unwrap();
        fs::write(dir.path().join("b.md"), "# B\n").unwrap();
        fs::write(dir.path().join("c.md"), "# C\n").unwrap();

        let outcome = build_index_with(dir.path(), None).unwrap();
        assert_eq!(outcome.index.docnames, vec!["b", "c"]);
        assert_eq!(outcome.stats, BuildStats { discovered: 3, reused: 0, parsed: 2, failed: 1 });
        assert!(!outcome.metadata.documents.contains_key("a"));
    }

    #[test]
    fn test_incremental_build_reuses_unchanged_documents() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), "# Alpha\n\ngrasp\n").unwrap();
        fs::write(dir.path().join("b.md"), "# Beta\n\ntabu\n").unwrap();
        let first = build_index_with(dir.path(), None).unwrap();

        fs::write(dir.path().join("b.md"), "# Beta\n\npath relinking, now longer\n").unwrap();
        fs::write(dir.path().join("c.md"), "# Gamma\n").unwrap();
        let second =
            build_index_with(dir.path(), Some((&first.index, &first.metadata))).unwrap();

        assert_eq!(second.stats.reused, 1);
        assert_eq!(second.stats.parsed, 2);
        assert_eq!(second.index.docnames, vec!["a", "b", "c"]);
        assert_eq!(second.index.titles, vec!["Alpha", "Beta", "Gamma"]);
        assert_eq!(second.index.terms.get("grasp"), Some(&Posting::Single(0)));
        assert_eq!(second.index.terms.get("relink"), Some(&Posting::Single(1)));
        // b no longer mentions tabu; the pruned term keeps an empty posting
        assert_eq!(second.index.terms.get("tabu"), Some(&Posting::Multiple(vec![])));
        assert!(!build_index(dir.path()).unwrap().terms.contains_key("tabu"));
    }

    #[test]
    fn test_incremental_build_drops_deleted_documents() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), "# Alpha\n\nsingle\n").unwrap();
        fs::write(dir.path().join("b.md"), "# Beta\n").unwrap();
        let first = build_index_with(dir.path(), None).unwrap();

        fs::remove_file(dir.path().join("a.md")).unwrap();
        let second =
            build_index_with(dir.path(), Some((&first.index, &first.metadata))).unwrap();

        assert_eq!(second.index.docnames, vec!["b"]);
        assert_eq!(second.index.terms.get("singl"), Some(&Posting::Multiple(vec![])));
        assert!(!second.metadata.documents.contains_key("a"));
    }

    #[test]
    fn test_incremental_build_ignores_foreign_index() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), "# Alpha\n").unwrap();
        let first = build_index_with(dir.path(), None).unwrap();

        let mut foreign = first.index.clone();
        foreign.envversion = Map::new();
        let second = build_index_with(dir.path(), Some((&foreign, &first.metadata))).unwrap();
        assert_eq!(second.stats.reused, 0);
        assert_eq!(second.stats.parsed, 1);
    }

    #[test]
    fn test_incremental_build_ignores_metadata_of_other_tree() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), "# Alpha\n").unwrap();
        let first = build_index_with(dir.path(), None).unwrap();
        assert_eq!(first.metadata.source_dir, dir.path().canonicalize().unwrap());

        let mut other = first.metadata.clone();
        other.source_dir = dir.path().join("elsewhere");
        let second = build_index_with(dir.path(), Some((&first.index, &other))).unwrap();
        assert_eq!(second.stats.reused, 0);
    }
}
