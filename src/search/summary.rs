use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::indexer::discovery::is_excluded_name;
use crate::models::{SourceDocument, SourceKind};
use crate::parsers::parse_document;
use crate::utils::document_names;

/// Characters kept before the keyword
const CONTEXT_BEFORE: usize = 120;
const EXCERPT_LENGTH: usize = 240;

/// Cut an excerpt around the last keyword (in `keywords` order) found in `text`
///
/// The excerpt starts up to 120 characters before the keyword and is at most
/// 240 characters long; `...` marks text cut at either end. Matching ignores
/// case. Returns `None` when no keyword occurs.
///
/// # Examples
///
/// ```
/// use doc_search::search::make_search_summary;
///
/// let summary = make_search_summary("Tabu search keeps a tabu list.", &["list".to_string()]);
/// assert_eq!(summary.as_deref(), Some("Tabu search keeps a tabu list."));
/// ```
pub fn make_search_summary(text: &str, keywords: &[String]) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let lower: Vec<char> = chars.iter().map(|&c| fold_case(c)).collect();

    let mut found = None;
    for keyword in keywords {
        let needle: Vec<char> = keyword.chars().map(fold_case).collect();
        if let Some(position) = find(&lower, &needle) {
            found = Some(position);
        }
    }

    let start = found?.saturating_sub(CONTEXT_BEFORE);
    let end = (start + EXCERPT_LENGTH).min(chars.len());
    let excerpt: String = chars[start..end].iter().collect();

    let mut summary = String::new();
    if start > 0 {
        summary.push_str("...");
    }
    summary.push_str(excerpt.trim());
    if end < chars.len() {
        summary.push_str("...");
    }
    Some(summary)
}

/// Lower-case one character without changing the character count
fn fold_case(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn find(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Summary for an indexed document, read from its source file
///
/// `filename` comes from the index and is resolved under `source_dir`; it must
/// be a relative path without `..` components. Only files the builder would
/// index are read: hidden or build-output components and symlinks anywhere
/// along the path are refused.
///
/// # Errors
///
/// Returns an error if the filename is unsafe, has an unsupported extension,
/// or the source cannot be read or parsed.
pub fn summary_from_source(
    source_dir: &Path,
    filename: &str,
    keywords: &[String],
) -> Result<Option<String>> {
    let relative = Path::new(filename);
    let (docname, filename) = document_names(relative)
        .with_context(|| format!("Refusing to read source for {}", filename))?;
    let Some(kind) =
        relative.extension().and_then(|e| e.to_str()).and_then(SourceKind::from_extension)
    else {
        bail!("Unsupported source file: {}", filename);
    };

    let path = checked_source_path(source_dir, relative)?;
    let source = SourceDocument { docname, path, filename, kind };
    let parsed = parse_document(&source)?;
    Ok(make_search_summary(&parsed.body, keywords))
}

/// Resolve `relative` under `source_dir` one component at a time
fn checked_source_path(source_dir: &Path, relative: &Path) -> Result<PathBuf> {
    let names: Vec<_> = relative.iter().collect();
    let mut path = source_dir.to_path_buf();
    for (i, name) in names.iter().enumerate() {
        let is_dir = i + 1 < names.len();
        if is_excluded_name(&name.to_string_lossy(), is_dir) {
            bail!("Refusing to read excluded source path: {}", relative.display());
        }
        path.push(name);

        let metadata = fs::symlink_metadata(&path)
            .with_context(|| format!("Failed to read source file: {}", path.display()))?;
        if metadata.file_type().is_symlink() {
            bail!("Refusing to follow symlink: {}", path.display());
        }
        if !is_dir && !metadata.is_file() {
            bail!("Not a regular file: {}", path.display());
        }
    }
    Ok(path)
}
