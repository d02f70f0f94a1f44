//! Index and metadata persistence with atomic writes

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::error::IndexFormatError;
use super::jsdump;
use super::metadata::{BuildMetadata, METADATA_VERSION};
use crate::models::SearchIndex;

const METADATA_FILENAME: &str = "build-metadata.json";
const INDEX_PREFIX: &str = "Search.setIndex(";
const INDEX_SUFFIX: &str = ")";

/// Decode the contents of a `searchindex.js` file
///
/// Accepts the `Search.setIndex({...})` wrapper (with an optional trailing
/// semicolon) or a bare object literal.
pub fn decode_index(text: &str) -> Result<SearchIndex, IndexFormatError> {
    let trimmed = text.trim();
    let payload = if let Some(rest) = trimmed.strip_prefix(INDEX_PREFIX) {
        let rest = rest.trim_end().trim_end_matches(';').trim_end();
        rest.strip_suffix(INDEX_SUFFIX).ok_or(IndexFormatError::MissingWrapper)?
    } else if trimmed.starts_with('{') {
        trimmed
    } else {
        return Err(IndexFormatError::MissingWrapper);
    };

    let value = jsdump::loads(payload)?;
    Ok(serde_json::from_value(value)?)
}

/// Encode an index as `Search.setIndex({...})`
pub fn encode_index(index: &SearchIndex) -> Result<String, IndexFormatError> {
    let value = serde_json::to_value(index)?;
    Ok(format!("{}{}{}", INDEX_PREFIX, jsdump::dumps(&value), INDEX_SUFFIX))
}

/// Load an index file
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not in the index format,
/// or its document arrays disagree in length. Lesser problems (empty or
/// dangling postings) are left for [`SearchIndex::validate`] to report.
pub fn load_index(path: &Path) -> Result<SearchIndex> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read index file: {}", path.display()))?;
    let index = decode_index(&text)
        .with_context(|| format!("Failed to parse index file: {}", path.display()))?;

    let issues = index.structural_issues();
    if let Some(issue) = issues.first() {
        bail!("Malformed index {}: {}", path.display(), issue);
    }

    debug!(
        path = %path.display(),
        documents = index.document_count(),
        terms = index.terms.len(),
        "loaded search index"
    );
    Ok(index)
}

/// Save an index atomically (temp file + rename)
pub fn save_index(path: &Path, index: &SearchIndex) -> Result<()> {
    let text = encode_index(index).context("Failed to serialize index")?;
    write_atomic(path, text.as_bytes())
}

/// Compute a short hash of the canonical source path for cache isolation
fn compute_path_hash(path: &Path) -> Result<String> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    // Canonicalize to handle symlinks and relative paths consistently
    let canonical = path.canonicalize().context("Failed to canonicalize path")?;

    let mut hasher = DefaultHasher::new();
    canonical.hash(&mut hasher);
    let hash = hasher.finish();

    Ok(format!("{:016x}", hash)[..12].to_string())
}

/// Get the platform cache directory for a specific source tree
///
/// - macOS: `~/Library/Caches/doc-search/<hash>/`
/// - Linux: `~/.cache/doc-search/<hash>/`
/// - Windows: `%LOCALAPPDATA%\doc-search\<hash>\`
pub fn get_cache_dir(source_dir: &Path) -> Result<PathBuf> {
    let cache_base = dirs::cache_dir().context("Failed to get platform cache directory")?;
    let path_hash = compute_path_hash(source_dir)?;
    Ok(cache_base.join("doc-search").join(path_hash))
}

/// Load build metadata from a cache directory
///
/// Returns None when the metadata is missing, unreadable or from another
/// schema version; the caller should fall back to a full build.
pub fn load_metadata(cache_dir: &Path) -> Result<Option<BuildMetadata>> {
    let metadata_path = cache_dir.join(METADATA_FILENAME);
    if !metadata_path.exists() {
        return Ok(None);
    }

    let metadata_json =
        fs::read_to_string(&metadata_path).context("Failed to read metadata file")?;
    let metadata: BuildMetadata = match serde_json::from_str(&metadata_json) {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!("Ignoring corrupt build metadata {}: {}", metadata_path.display(), e);
            return Ok(None);
        }
    };

    if metadata.version != METADATA_VERSION {
        warn!(
            "Build metadata version mismatch (expected {}, found {}), rebuilding index",
            METADATA_VERSION, metadata.version
        );
        return Ok(None);
    }

    Ok(Some(metadata))
}

/// Save build metadata atomically
pub fn save_metadata(cache_dir: &Path, metadata: &BuildMetadata) -> Result<()> {
    let json = serde_json::to_string_pretty(metadata).context("Failed to serialize metadata")?;
    write_atomic(&cache_dir.join(METADATA_FILENAME), json.as_bytes())
}

/// Write `contents` to `path` through a uniquely named temp file in the same directory
///
/// The temp file is removed if anything fails before the final rename, so
/// concurrent writers never share a scratch file and failures leave no debris.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !parent.exists() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    if path.file_name().is_none() {
        bail!("Not a file path: {}", path.display());
    }

    let mut temp = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
    temp.write_all(contents)
        .with_context(|| format!("Failed to write temp file: {}", temp.path().display()))?;
    temp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}
