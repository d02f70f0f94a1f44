use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::index_storage::{
    BuildMetadata, get_cache_dir, load_index, load_metadata, save_index, save_metadata,
};
use crate::indexer::build_index_with;
use crate::models::SearchIndex;
use crate::search::{LinkOptions, Scorer, Searcher, result_link, summary_from_source};
use crate::utils::{format_path_with_tilde, sanitize_line};

const UNTITLED: &str = "<no title>";

#[derive(Parser)]
#[command(name = "doc-search")]
#[command(version)]
#[command(
    about = "Build and query static full-text search indexes for documentation sites",
    long_about = None
)]
pub struct Cli {
    /// Log more to stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args)]
pub struct IndexArgs {
    /// Index file to read
    #[arg(long, env = "DOC_SEARCH_INDEX", default_value = "searchindex.js")]
    pub index: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build searchindex.js from a documentation source tree
    Build {
        /// Directory holding .md, .ipynb, .rst and .txt sources
        source_dir: PathBuf,

        /// Where to write the index
        #[arg(short, long, env = "DOC_SEARCH_INDEX", default_value = "searchindex.js")]
        output: PathBuf,

        /// Ignore the previous index and re-parse every document
        #[arg(long)]
        full: bool,

        /// Directory for build metadata (default: platform cache directory)
        #[arg(long, env = "DOC_SEARCH_CACHE_DIR")]
        cache_dir: Option<PathBuf>,
    },

    /// Search the index; prefix a word with - to exclude it
    Search {
        /// Query words; options must come before them (use -- before a leading -word)
        #[arg(required = true, allow_hyphen_values = true, trailing_var_arg = true)]
        query: Vec<String>,

        #[command(flatten)]
        index: IndexArgs,

        /// Maximum number of results (0 for all)
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// JSON file overriding the scoring weights
        #[arg(long)]
        scorer: Option<PathBuf>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Source tree to read excerpts from
        #[arg(long)]
        source_dir: Option<PathBuf>,

        /// Prefix for result links
        #[arg(long, default_value = "")]
        url_root: String,

        /// Suffix appended to docnames in result links
        #[arg(long, default_value = ".html")]
        file_suffix: String,

        /// Link to directories (docname/) instead of files
        #[arg(long)]
        dirhtml: bool,
    },

    /// Show the raw postings for one word
    Lookup {
        word: String,

        #[command(flatten)]
        index: IndexArgs,

        /// Print postings as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show statistics about an index
    Stats {
        #[command(flatten)]
        index: IndexArgs,
    },

    /// Validate an index; exits non-zero when errors are found
    Check {
        #[command(flatten)]
        index: IndexArgs,
    },
}

/// Install the stderr log subscriber
///
/// `RUST_LOG` wins when set; otherwise `warn`, raised to `info` by `-v` and
/// `debug` by `-vv`.
pub fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed when embedded; keep it
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Build { source_dir, output, full, cache_dir }) => {
            build(&source_dir, &output, full, cache_dir)?;
        }
        Some(Commands::Search {
            query,
            index,
            limit,
            scorer,
            json,
            source_dir,
            url_root,
            file_suffix,
            dirhtml,
        }) => {
            let options = SearchOptions {
                limit,
                scorer,
                json,
                source_dir,
                links: LinkOptions { url_root, file_suffix, dirhtml },
            };
            search(&query.join(" "), &index.index, &options)?;
        }
        Some(Commands::Lookup { word, index, json }) => {
            lookup(&word, &index.index, json)?;
        }
        Some(Commands::Stats { index }) => {
            show_stats(&index.index)?;
        }
        Some(Commands::Check { index }) => {
            check(&index.index)?;
        }
        None => {
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn build(source_dir: &Path, output: &Path, full: bool, cache_dir: Option<PathBuf>) -> Result<()> {
    if !source_dir.is_dir() {
        bail!("Source directory not found: {}", source_dir.display());
    }
    let cache_dir = match cache_dir {
        Some(dir) => dir,
        None => get_cache_dir(source_dir)?,
    };

    let previous = if full { None } else { load_previous(output, &cache_dir) };
    let outcome =
        build_index_with(source_dir, previous.as_ref().map(|(index, meta)| (index, meta)))?;

    save_index(output, &outcome.index)?;
    // The index is already written; a missing cache only costs a full build next time
    let mut metadata = outcome.metadata;
    if let Err(e) =
        metadata.record_index(output).and_then(|()| save_metadata(&cache_dir, &metadata))
    {
        warn!("Failed to save build metadata: {:#}", e);
    }

    let stats = outcome.stats;
    println!(
        "Indexed {} documents ({} reused, {} parsed, {} failed)",
        outcome.index.document_count(),
        stats.reused,
        stats.parsed,
        stats.failed
    );
    println!("Wrote {}", format_path_with_tilde(output));
    Ok(())
}

/// Previous index and metadata for an incremental build, when both are usable
fn load_previous(output: &Path, cache_dir: &Path) -> Option<(SearchIndex, BuildMetadata)> {
    if !output.exists() {
        return None;
    }
    let metadata = match load_metadata(cache_dir) {
        Ok(Some(metadata)) => metadata,
        Ok(None) => {
            info!("No build metadata in {}, doing a full build", cache_dir.display());
            return None;
        }
        Err(e) => {
            warn!("Cannot read build metadata, doing a full build: {:#}", e);
            return None;
        }
    };
    if !metadata.describes_index(output) {
        info!(
            "Build metadata in {} belongs to another index file, doing a full build",
            cache_dir.display()
        );
        return None;
    }
    match load_index(output) {
        Ok(index) => Some((index, metadata)),
        Err(e) => {
            warn!("Cannot read previous index, doing a full build: {:#}", e);
            None
        }
    }
}

struct SearchOptions {
    limit: usize,
    scorer: Option<PathBuf>,
    json: bool,
    source_dir: Option<PathBuf>,
    links: LinkOptions,
}

fn search(query_text: &str, index_path: &Path, options: &SearchOptions) -> Result<()> {
    let index = load_index(index_path)?;
    let scorer = match &options.scorer {
        Some(path) => Scorer::from_file(path)?,
        None => Scorer::default(),
    };
    let searcher = Searcher::new(&index).with_scorer(scorer);

    let query = searcher.parse(query_text);
    let mut results = searcher.search_parsed(&query);
    let total = results.len();
    if options.limit > 0 {
        results.truncate(options.limit);
    }

    for result in &mut results {
        result.link = Some(result_link(&result.docname, &query.highlight_terms, &options.links));
        if let Some(source_dir) = &options.source_dir {
            match summary_from_source(source_dir, &result.filename, &query.highlight_terms) {
                Ok(summary) => result.summary = summary,
                Err(e) => warn!("No summary for {}: {:#}", result.docname, e),
            }
        }
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results for \"{}\"", sanitize_line(query_text));
        return Ok(());
    }

    println!("Found {} results for \"{}\"", total, sanitize_line(query_text));
    for (rank, result) in results.iter().enumerate() {
        println!();
        println!(
            "{:>3}. {} [{}] (score {})",
            rank + 1,
            display_title(&result.title),
            sanitize_line(&result.docname),
            result.score
        );
        if let Some(link) = &result.link {
            println!("     {}", sanitize_line(link));
        }
        if let Some(summary) = &result.summary {
            println!("     {}", sanitize_line(summary));
        }
    }
    if total > results.len() {
        println!();
        println!("({} more, raise --limit to see them)", total - results.len());
    }

    Ok(())
}

fn lookup(word: &str, index_path: &Path, json: bool) -> Result<()> {
    let index = load_index(index_path)?;
    let postings = Searcher::new(&index).lookup_term(word);

    if json {
        println!("{}", serde_json::to_string_pretty(&postings)?);
        return Ok(());
    }

    if postings.is_empty() {
        println!("No documents contain \"{}\"", sanitize_line(&postings.term));
        return Ok(());
    }

    println!("Term: {}", sanitize_line(&postings.term));
    for (label, docs) in [("Title matches", &postings.title), ("Body matches", &postings.body)] {
        println!("{} ({}):", label, docs.len());
        for &doc in docs {
            println!(
                "  [{}] {}  {}",
                doc,
                sanitize_line(&index.docnames[doc]),
                display_title(index.title(doc).unwrap_or_default())
            );
        }
    }
    Ok(())
}

fn show_stats(index_path: &Path) -> Result<()> {
    let index = load_index(index_path)?;
    let file_size = fs::metadata(index_path)
        .with_context(|| format!("Failed to read metadata: {}", index_path.display()))?
        .len();

    let postings = || index.terms.values().chain(index.titleterms.values());
    let total_postings: usize = postings().map(|p| p.len()).sum();
    let empty_postings = postings().filter(|p| p.is_empty()).count();
    let untitled = index.titles.iter().filter(|t| t.is_empty()).count();

    println!("Search Index Statistics");
    println!("=======================");
    println!("Documents: {}", index.document_count());
    println!("  Untitled: {}", untitled);
    println!("Body terms: {}", index.terms.len());
    println!("Title terms: {}", index.titleterms.len());
    println!("Postings: {} ({} empty)", total_postings, empty_postings);
    println!();
    println!("Index file: {} ({} bytes)", format_path_with_tilde(index_path), file_size);
    println!("Generator: {}", Value::Object(index.envversion.clone()));

    Ok(())
}

fn check(index_path: &Path) -> Result<()> {
    let index = load_index(index_path)?;
    let issues = index.validate();

    for issue in &issues {
        let level = if issue.is_warning() { "warning" } else { "error" };
        println!("{}: {}", level, issue);
    }

    let errors = issues.iter().filter(|issue| !issue.is_warning()).count();
    if errors > 0 {
        bail!("{} error(s) found in {}", errors, index_path.display());
    }

    println!(
        "OK: {} documents, {} terms, {} title terms ({} warnings)",
        index.document_count(),
        index.terms.len(),
        index.titleterms.len(),
        issues.len()
    );
    Ok(())
}

fn display_title(title: &str) -> String {
    if title.is_empty() { UNTITLED.to_string() } else { sanitize_line(title) }
}
